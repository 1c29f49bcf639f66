//! Shared simulation types
//!
//! Lane indices, entity kinds, phases and the interaction events that flow
//! from collision evaluation into the session.

use rand::Rng;
use serde::Serialize;

use super::powerup::PowerupKind;
use crate::consts::LANE_COUNT;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GamePhase {
    /// Waiting for the start signal
    Start,
    /// Active gameplay
    Playing,
    /// Run ended, final score held for display
    GameOver,
}

/// One of the three road lanes (always in `0..LANE_COUNT`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Lane(u8);

impl Lane {
    pub const LEFT: Lane = Lane(0);
    pub const CENTER: Lane = Lane(1);
    pub const RIGHT: Lane = Lane(2);
    pub const ALL: [Lane; LANE_COUNT] = [Lane::LEFT, Lane::CENTER, Lane::RIGHT];

    /// Lane for an index, `None` if out of range
    pub fn new(index: usize) -> Option<Self> {
        (index < LANE_COUNT).then_some(Lane(index as u8))
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Neighbouring lane to the left, `None` at the edge
    pub fn left(self) -> Option<Self> {
        self.0.checked_sub(1).map(Lane)
    }

    /// Neighbouring lane to the right, `None` at the edge
    pub fn right(self) -> Option<Self> {
        Lane::new(self.index() + 1)
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Lane(rng.random_range(0..LANE_COUNT as u8))
    }
}

/// Obstacle appearance (gameplay-identical)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ObstacleKind {
    Crate,
    Grass,
    Flower,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 3] = [ObstacleKind::Crate, ObstacleKind::Grass, ObstacleKind::Flower];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// What a collectible gives when picked up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CollectibleKind {
    /// Primary currency, worth score
    Chilli,
    /// Activates a timed powerup
    Powerup(PowerupKind),
}

impl CollectibleKind {
    #[inline]
    pub fn is_currency(self) -> bool {
        matches!(self, CollectibleKind::Chilli)
    }
}

/// Outcome of one tick's collision evaluation, consumed once by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InteractionEvent {
    /// Unprotected obstacle collision (costs a life)
    ObstacleHit,
    /// Obstacle collision absorbed by an active shield
    ShieldedHit,
    /// Collectible picked up
    Collected(CollectibleKind),
}
