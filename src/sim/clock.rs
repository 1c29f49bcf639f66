//! Speed ramp and frame timing
//!
//! Converts frame timestamps (ms) into a clamped frame delta, the current
//! game speed, and the distance the world scrolls this frame.

use crate::consts::MAX_FRAME_DT;
use crate::tuning::Tuning;

/// Timing for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockStep {
    /// Frame delta in ms (positive, capped)
    pub dt: f32,
    /// Game speed in world units per second
    pub speed: f32,
    /// Distance entities travel this frame
    pub world_delta: f32,
}

/// Session clock
#[derive(Debug, Clone)]
pub struct SimulationClock {
    initial_speed: f32,
    max_speed: f32,
    ramp_ms: f32,
    boost_factor: f32,
    start_ms: f64,
    last_ms: f64,
    speed: f32,
}

impl SimulationClock {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            initial_speed: tuning.initial_speed,
            max_speed: tuning.max_speed,
            ramp_ms: tuning.speed_ramp_ms,
            boost_factor: tuning.speed_boost_factor,
            start_ms: 0.0,
            last_ms: 0.0,
            speed: tuning.initial_speed,
        }
    }

    /// Restart the ramp at `now_ms`
    pub fn reset(&mut self, now_ms: f64) {
        self.start_ms = now_ms;
        self.last_ms = now_ms;
        self.speed = self.initial_speed;
    }

    /// Ramped speed after `elapsed_ms`, without boosts
    pub fn ramp_speed(&self, elapsed_ms: f64) -> f32 {
        let progress = (elapsed_ms / self.ramp_ms as f64).clamp(0.0, 1.0) as f32;
        if progress >= 1.0 {
            return self.max_speed;
        }
        self.initial_speed + (self.max_speed - self.initial_speed) * progress
    }

    /// Advance to `now_ms`. Returns `None` for a zero, negative or non-finite
    /// delta; such frames must not integrate anything.
    pub fn advance(&mut self, now_ms: f64, boosted: bool) -> Option<ClockStep> {
        let raw_dt = now_ms - self.last_ms;
        if !raw_dt.is_finite() || raw_dt <= 0.0 {
            return None;
        }
        self.last_ms = now_ms;

        let dt = (raw_dt as f32).min(MAX_FRAME_DT);
        let mut speed = self.ramp_speed(now_ms - self.start_ms);
        if boosted {
            speed *= self.boost_factor;
        }
        self.speed = speed;

        Some(ClockStep {
            dt,
            speed,
            world_delta: speed / 1000.0 * dt,
        })
    }

    /// Speed applied on the most recent frame
    pub fn speed(&self) -> f32 {
        self.speed
    }
}
