//! Timed powerups
//!
//! Each kind has an active flag and a remaining duration. Picking up a kind
//! that is already running restarts its timer; timers never stack.

use serde::Serialize;

use crate::tuning::PowerupDurations;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PowerupKind {
    /// Chillies are worth double
    DoubleScore,
    /// Game speed multiplied while active
    SpeedBoost,
    /// Pulls nearby collectibles in and widens the pickup radius for powerups
    Magnet,
    /// Absorbs one obstacle hit (only spawned when the shield rule is on)
    Shield,
}

impl PowerupKind {
    pub const ALL: [PowerupKind; 4] = [
        PowerupKind::DoubleScore,
        PowerupKind::SpeedBoost,
        PowerupKind::Magnet,
        PowerupKind::Shield,
    ];

    #[inline]
    fn index(self) -> usize {
        match self {
            PowerupKind::DoubleScore => 0,
            PowerupKind::SpeedBoost => 1,
            PowerupKind::Magnet => 2,
            PowerupKind::Shield => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PowerupKind::DoubleScore => "2x Chillies",
            PowerupKind::SpeedBoost => "Speed Boost",
            PowerupKind::Magnet => "Magnet",
            PowerupKind::Shield => "Shield",
        }
    }

    pub(crate) fn duration_field(self) -> &'static str {
        match self {
            PowerupKind::DoubleScore => "powerup_durations.double_score",
            PowerupKind::SpeedBoost => "powerup_durations.speed_boost",
            PowerupKind::Magnet => "powerup_durations.magnet",
            PowerupKind::Shield => "powerup_durations.shield",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct PowerupState {
    active: bool,
    remaining_ms: f32,
}

/// Active powerup as shown by the HUD
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ActivePowerup {
    pub kind: PowerupKind,
    pub remaining_ms: f32,
    /// Remaining share of the full duration, for progress bars
    pub remaining_fraction: f32,
}

/// Active/remaining state for every powerup kind
#[derive(Debug, Clone)]
pub struct PowerupTracker {
    durations: PowerupDurations,
    states: [PowerupState; PowerupKind::ALL.len()],
}

impl PowerupTracker {
    pub fn new(durations: PowerupDurations) -> Self {
        Self {
            durations,
            states: Default::default(),
        }
    }

    /// Deactivate everything
    pub fn reset(&mut self) {
        self.states = Default::default();
    }

    /// Start (or restart) a powerup at its full duration
    pub fn activate(&mut self, kind: PowerupKind) {
        let state = &mut self.states[kind.index()];
        state.active = true;
        state.remaining_ms = self.durations.get(kind);
        log::debug!("Powerup {} active for {} ms", kind.name(), state.remaining_ms);
    }

    /// End a powerup immediately (shield absorbing a hit)
    pub fn consume(&mut self, kind: PowerupKind) {
        self.states[kind.index()] = PowerupState::default();
    }

    /// Count down active timers
    pub fn update(&mut self, dt: f32) {
        if !(dt > 0.0) {
            return;
        }
        for (kind, state) in PowerupKind::ALL.iter().zip(self.states.iter_mut()) {
            if !state.active {
                continue;
            }
            state.remaining_ms -= dt;
            if state.remaining_ms <= 0.0 {
                *state = PowerupState::default();
                log::debug!("Powerup {} expired", kind.name());
            }
        }
    }

    #[inline]
    pub fn is_active(&self, kind: PowerupKind) -> bool {
        self.states[kind.index()].active
    }

    pub fn remaining_ms(&self, kind: PowerupKind) -> f32 {
        self.states[kind.index()].remaining_ms
    }

    /// Active powerups in declaration order
    pub fn snapshot_active(&self) -> Vec<ActivePowerup> {
        PowerupKind::ALL
            .iter()
            .zip(self.states.iter())
            .filter(|(_, s)| s.active)
            .map(|(&kind, s)| ActivePowerup {
                kind,
                remaining_ms: s.remaining_ms,
                remaining_fraction: (s.remaining_ms / self.durations.get(kind)).clamp(0.0, 1.0),
            })
            .collect()
    }
}
