//! Data-driven game balance
//!
//! Every number the simulation reads lives in [`Tuning`]. Defaults come from
//! [`crate::consts`]; a JSON file can override any subset of fields. A tuning
//! is validated once when a session is created and never mutated afterwards.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::PowerupKind;

/// Rejected tuning values
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f32 },
    #[error("{field} must lie in [0, 1] (got {value})")]
    OutOfUnitRange { field: &'static str, value: f32 },
    #[error("{field} range is inverted ({min} > {max})")]
    InvertedRange {
        field: &'static str,
        min: f32,
        max: f32,
    },
    #[error("max speed {max} is below initial speed {initial}")]
    SpeedBelowInitial { initial: f32, max: f32 },
    #[error("lane offsets must be strictly increasing: {0:?}")]
    LaneOffsets([f32; LANE_COUNT]),
    #[error("perspective scale must grow from top {top} to bottom {bottom}")]
    ScaleCurve { top: f32, bottom: f32 },
    #[error("initial obstacle count {initial} exceeds pool size {pool}")]
    PoolTooSmall { initial: usize, pool: usize },
    #[error("max lives must be at least 1")]
    NoLives,
    #[error("invalid tuning json: {0}")]
    Json(#[from] serde_json::Error),
}

/// A `[min, max]` range sampled for spawn timers and gaps (ms or world units)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnRange {
    pub min: f32,
    pub max: f32,
}

impl SpawnRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    fn validate(&self, field: &'static str) -> Result<(), TuningError> {
        positive(field, self.min)?;
        if self.min > self.max {
            return Err(TuningError::InvertedRange {
                field,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Perspective curve parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerspectiveTuning {
    /// Scale at depth 0 (far end of the visible road)
    pub scale_top: f32,
    /// Scale at the track height (closest to the camera)
    pub scale_bottom: f32,
    /// Curve exponent; above 1 widens faster near the camera
    pub exponent: f32,
}

impl Default for PerspectiveTuning {
    fn default() -> Self {
        Self {
            scale_top: LANE_SCALE_TOP,
            scale_bottom: LANE_SCALE_BOTTOM,
            exponent: LANE_SCALE_EXP,
        }
    }
}

/// Base collision radii at unit scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionRadii {
    pub player: f32,
    /// Player pickup radius for powerup collectibles while the magnet is on
    pub magnet_player: f32,
    pub obstacle: f32,
    pub collectible: f32,
}

impl Default for CollisionRadii {
    fn default() -> Self {
        Self {
            player: 25.0,
            magnet_player: 40.0,
            obstacle: 30.0,
            collectible: 20.0,
        }
    }
}

/// Duration (ms) of each powerup kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerupDurations {
    pub double_score: f32,
    pub speed_boost: f32,
    pub magnet: f32,
    pub shield: f32,
}

impl Default for PowerupDurations {
    fn default() -> Self {
        Self {
            double_score: POWERUP_DURATION,
            speed_boost: POWERUP_DURATION,
            magnet: POWERUP_DURATION,
            shield: POWERUP_DURATION,
        }
    }
}

impl PowerupDurations {
    pub fn get(&self, kind: PowerupKind) -> f32 {
        match kind {
            PowerupKind::DoubleScore => self.double_score,
            PowerupKind::SpeedBoost => self.speed_boost,
            PowerupKind::Magnet => self.magnet,
            PowerupKind::Shield => self.shield,
        }
    }
}

/// Complete game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Track ===
    pub track_width: f32,
    pub track_height: f32,
    pub lane_offsets: [f32; LANE_COUNT],
    pub perspective: PerspectiveTuning,

    // === Speed ===
    pub initial_speed: f32,
    pub max_speed: f32,
    /// Time (ms) to ramp from initial to max speed
    pub speed_ramp_ms: f32,
    pub speed_boost_factor: f32,

    // === Player ===
    pub player_depth: f32,
    pub jump_height: f32,
    pub jump_duration_ms: f32,
    pub animation_interval_ms: f32,
    /// Fraction of the lane gap closed per reference frame
    pub lane_smoothing: f32,
    pub max_lives: u8,

    // === Scoring and powerups ===
    pub chilli_score: u64,
    pub powerup_durations: PowerupDurations,
    /// Enables the shield powerup (absorbs one hit instead of costing a life)
    pub shield_enabled: bool,
    /// Chance that a spawned collectible is a powerup rather than a chilli
    pub powerup_chance: f32,
    pub magnet_range: f32,
    /// Fraction of the remaining distance pulled per reference frame
    pub magnet_pull: f32,

    // === Obstacles ===
    pub obstacle_pool_size: usize,
    pub initial_obstacles: usize,
    /// Recycle span contributed by each pool slot
    pub obstacle_slot_length: f32,
    pub obstacle_spawn_depth: f32,
    /// Gap between consecutive obstacles in the initial layout
    pub obstacle_gap: SpawnRange,
    /// Countdown (ms) between activations of parked pool slots
    pub obstacle_interval: SpawnRange,
    pub obstacle_despawn_depth: f32,

    // === Collectibles ===
    pub collectible_interval: SpawnRange,
    pub collectible_spawn_depth: f32,
    pub collectible_despawn_depth: f32,

    // === Effects and collisions ===
    pub effect_lifespan_ms: f32,
    pub radii: CollisionRadii,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            track_width: GAME_BASE_WIDTH,
            track_height: GAME_BASE_HEIGHT,
            lane_offsets: LANE_OFFSETS,
            perspective: PerspectiveTuning::default(),

            initial_speed: INITIAL_GAME_SPEED,
            max_speed: MAX_GAME_SPEED,
            speed_ramp_ms: SPEED_RAMP_DURATION,
            speed_boost_factor: SPEED_BOOST_FACTOR,

            player_depth: PLAYER_TOP_Y,
            jump_height: JUMP_HEIGHT,
            jump_duration_ms: JUMP_DURATION,
            animation_interval_ms: PLAYER_ANIMATION_INTERVAL,
            lane_smoothing: 0.2,
            max_lives: MAX_LIVES,

            chilli_score: CHILLI_SCORE,
            powerup_durations: PowerupDurations::default(),
            shield_enabled: false,
            powerup_chance: 0.2,
            magnet_range: 300.0,
            magnet_pull: 0.1,

            obstacle_pool_size: OBSTACLE_POOL_SIZE,
            initial_obstacles: INITIAL_OBSTACLES,
            obstacle_slot_length: OBSTACLE_SLOT_LENGTH,
            obstacle_spawn_depth: GAME_BASE_HEIGHT + 200.0,
            obstacle_gap: SpawnRange::new(300.0, 700.0),
            obstacle_interval: SpawnRange::new(4_000.0, 9_000.0),
            obstacle_despawn_depth: -100.0,

            collectible_interval: SpawnRange::new(300.0, 800.0),
            collectible_spawn_depth: GAME_BASE_HEIGHT + 100.0,
            collectible_despawn_depth: -50.0,

            effect_lifespan_ms: 300.0,
            radii: CollisionRadii::default(),
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Total distance an obstacle is pushed forward when recycled
    pub fn obstacle_track_span(&self) -> f32 {
        self.obstacle_pool_size as f32 * self.obstacle_slot_length
    }

    /// Powerup kinds that can appear on the road
    pub fn spawnable_powerups(&self) -> &'static [PowerupKind] {
        if self.shield_enabled {
            &PowerupKind::ALL
        } else {
            &PowerupKind::ALL[..3]
        }
    }

    /// Reject anything that would produce undefined spatial behavior
    pub fn validate(&self) -> Result<(), TuningError> {
        positive("track_width", self.track_width)?;
        positive("track_height", self.track_height)?;
        if !self.lane_offsets.windows(2).all(|w| w[0] < w[1]) {
            return Err(TuningError::LaneOffsets(self.lane_offsets));
        }

        let p = &self.perspective;
        positive("perspective.scale_top", p.scale_top)?;
        positive("perspective.exponent", p.exponent)?;
        if !(p.scale_bottom > p.scale_top) {
            return Err(TuningError::ScaleCurve {
                top: p.scale_top,
                bottom: p.scale_bottom,
            });
        }

        positive("initial_speed", self.initial_speed)?;
        positive("speed_ramp_ms", self.speed_ramp_ms)?;
        positive("speed_boost_factor", self.speed_boost_factor)?;
        if self.max_speed < self.initial_speed {
            return Err(TuningError::SpeedBelowInitial {
                initial: self.initial_speed,
                max: self.max_speed,
            });
        }

        positive("player_depth", self.player_depth)?;
        positive("jump_height", self.jump_height)?;
        positive("jump_duration_ms", self.jump_duration_ms)?;
        positive("animation_interval_ms", self.animation_interval_ms)?;
        fraction("lane_smoothing", self.lane_smoothing)?;
        positive("lane_smoothing", self.lane_smoothing)?;
        if self.max_lives == 0 {
            return Err(TuningError::NoLives);
        }

        for kind in PowerupKind::ALL {
            positive(kind.duration_field(), self.powerup_durations.get(kind))?;
        }
        fraction("powerup_chance", self.powerup_chance)?;
        positive("magnet_range", self.magnet_range)?;
        fraction("magnet_pull", self.magnet_pull)?;
        positive("magnet_pull", self.magnet_pull)?;

        if self.obstacle_pool_size == 0 {
            return Err(TuningError::NonPositive {
                field: "obstacle_pool_size",
                value: 0.0,
            });
        }
        if self.initial_obstacles > self.obstacle_pool_size {
            return Err(TuningError::PoolTooSmall {
                initial: self.initial_obstacles,
                pool: self.obstacle_pool_size,
            });
        }
        positive("obstacle_slot_length", self.obstacle_slot_length)?;
        self.obstacle_gap.validate("obstacle_gap")?;
        self.obstacle_interval.validate("obstacle_interval")?;
        self.collectible_interval.validate("collectible_interval")?;

        positive("effect_lifespan_ms", self.effect_lifespan_ms)?;
        let r = &self.radii;
        positive("radii.player", r.player)?;
        positive("radii.magnet_player", r.magnet_player)?;
        positive("radii.obstacle", r.obstacle)?;
        positive("radii.collectible", r.collectible)?;

        Ok(())
    }
}

/// NaN fails this check too
fn positive(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(TuningError::NonPositive { field, value })
    }
}

fn fraction(field: &'static str, value: f32) -> Result<(), TuningError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(TuningError::OutOfUnitRange { field, value })
    }
}
