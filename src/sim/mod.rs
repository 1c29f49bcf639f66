//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - Time only enters through frame timestamps
//! - Seeded RNG only
//! - Stable iteration order (by slot / spawn order)
//! - No rendering or platform dependencies beyond the intent and sound seams

pub mod autopilot;
pub mod clock;
pub mod collision;
pub mod entity;
pub mod perspective;
pub mod player;
pub mod powerup;
pub mod session;
pub mod state;

pub use autopilot::Autopilot;
pub use clock::{ClockStep, SimulationClock};
pub use collision::{Circle, CollisionEngine};
pub use entity::{Collectible, Effect, EntityPool, MagnetPull, Obstacle};
pub use perspective::Perspective;
pub use player::{AnimationFrame, Player};
pub use powerup::{ActivePowerup, PowerupKind, PowerupTracker};
pub use session::{FrameSnapshot, GameSession};
pub use state::{CollectibleKind, GamePhase, InteractionEvent, Lane, ObstacleKind};
