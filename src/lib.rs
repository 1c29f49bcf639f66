//! Chilli Dash - A three-lane perspective endless runner
//!
//! Core modules:
//! - `sim`: Simulation core (perspective, entities, collisions, session)
//! - `platform`: Intent queue and collaborator sinks (audio, display)
//! - `tuning`: Data-driven game balance
//! - `audio`: Web Audio sound effects (wasm only)

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod platform;
pub mod sim;
pub mod tuning;

pub use platform::{AudioSink, Intent, IntentQueue, SoundEvent, classify_swipe};
pub use tuning::{Tuning, TuningError};

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// Logical playfield dimensions
    pub const GAME_BASE_WIDTH: f32 = 540.0;
    pub const GAME_BASE_HEIGHT: f32 = 960.0;

    /// Number of lanes on the road
    pub const LANE_COUNT: usize = 3;
    /// Lane offsets from track center at unit scale
    pub const LANE_OFFSETS: [f32; LANE_COUNT] = [-120.0, 0.0, 120.0];

    /// Speed ramp (world units per second, ramp in ms)
    pub const INITIAL_GAME_SPEED: f32 = 280.0;
    pub const MAX_GAME_SPEED: f32 = 550.0;
    pub const SPEED_RAMP_DURATION: f32 = 60_000.0;
    /// Speed multiplier while the speed boost is active
    pub const SPEED_BOOST_FACTOR: f32 = 1.5;

    /// Player anchor depth (near the top of the track)
    pub const PLAYER_TOP_Y: f32 = 180.0;
    pub const JUMP_HEIGHT: f32 = 110.0;
    pub const JUMP_DURATION: f32 = 450.0;
    /// Run animation frame swap interval (ms)
    pub const PLAYER_ANIMATION_INTERVAL: f32 = 150.0;

    pub const MAX_LIVES: u8 = 5;
    pub const CHILLI_SCORE: u64 = 100;
    pub const POWERUP_DURATION: f32 = 8_000.0;

    /// Perspective curve
    pub const LANE_SCALE_TOP: f32 = 0.5;
    pub const LANE_SCALE_BOTTOM: f32 = 1.5;
    pub const LANE_SCALE_EXP: f32 = 1.2;

    /// Obstacle pool
    pub const OBSTACLE_POOL_SIZE: usize = 12;
    pub const INITIAL_OBSTACLES: usize = 10;
    /// Per-slot share of the recycle span
    pub const OBSTACLE_SLOT_LENGTH: f32 = 550.0;

    /// Frame delta cap (ms) so a backgrounded tab doesn't teleport entities
    pub const MAX_FRAME_DT: f32 = 100.0;
    /// Reference frame for per-frame smoothing factors (60 Hz)
    pub const REFERENCE_FRAME_MS: f32 = 1000.0 / 60.0;
}
