//! The runner
//!
//! The player sits at a fixed depth near the top of the road. Lane changes are
//! instant in logic and smoothed on screen; jumps follow a half-sine arc and
//! make the player immune to obstacles while airborne.

use glam::Vec2;
use serde::Serialize;

use super::perspective::Perspective;
use super::state::Lane;
use crate::consts::REFERENCE_FRAME_MS;
use crate::tuning::Tuning;

/// Two-frame run cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AnimationFrame {
    #[default]
    First,
    Second,
}

impl AnimationFrame {
    fn toggled(self) -> Self {
        match self {
            AnimationFrame::First => AnimationFrame::Second,
            AnimationFrame::Second => AnimationFrame::First,
        }
    }
}

/// The player character
#[derive(Debug, Clone, Serialize)]
pub struct Player {
    pub lane: Lane,
    /// Fixed anchor depth
    pub depth: f32,
    /// Smoothed toward the lane center
    pub screen_x: f32,
    pub jumping: bool,
    pub jump_elapsed: f32,
    /// Height above the road (derived from the jump arc)
    pub y_offset: f32,
    pub frame: AnimationFrame,
    #[serde(skip)]
    frame_timer: f32,
    #[serde(skip)]
    jump_height: f32,
    #[serde(skip)]
    jump_duration: f32,
    #[serde(skip)]
    frame_interval: f32,
    #[serde(skip)]
    smoothing: f32,
}

impl Player {
    pub fn new(tuning: &Tuning, perspective: &Perspective) -> Self {
        let lane = Lane::CENTER;
        Self {
            lane,
            depth: tuning.player_depth,
            screen_x: perspective.lane_center_x(lane, tuning.player_depth),
            jumping: false,
            jump_elapsed: 0.0,
            y_offset: 0.0,
            frame: AnimationFrame::First,
            frame_timer: 0.0,
            jump_height: tuning.jump_height,
            jump_duration: tuning.jump_duration_ms,
            frame_interval: tuning.animation_interval_ms,
            smoothing: tuning.lane_smoothing,
        }
    }

    /// Back to the center lane, grounded
    pub fn reset(&mut self, perspective: &Perspective) {
        self.lane = Lane::CENTER;
        self.screen_x = perspective.lane_center_x(self.lane, self.depth);
        self.jumping = false;
        self.jump_elapsed = 0.0;
        self.y_offset = 0.0;
        self.frame = AnimationFrame::First;
        self.frame_timer = 0.0;
    }

    /// Returns true if the lane actually changed
    pub fn move_left(&mut self) -> bool {
        match self.lane.left() {
            Some(lane) => {
                self.lane = lane;
                true
            }
            None => false,
        }
    }

    /// Returns true if the lane actually changed
    pub fn move_right(&mut self) -> bool {
        match self.lane.right() {
            Some(lane) => {
                self.lane = lane;
                true
            }
            None => false,
        }
    }

    /// Start a jump unless already airborne
    pub fn jump(&mut self) -> bool {
        if self.jumping {
            return false;
        }
        self.jumping = true;
        self.jump_elapsed = 0.0;
        true
    }

    pub fn update(&mut self, dt: f32, perspective: &Perspective) {
        if !(dt > 0.0) {
            return;
        }

        // Same easing as a fixed per-frame lerp at 60 Hz, independent of dt
        let target_x = perspective.lane_center_x(self.lane, self.depth);
        let blend = 1.0 - (1.0 - self.smoothing).powf(dt / REFERENCE_FRAME_MS);
        self.screen_x += (target_x - self.screen_x) * blend;

        if self.jumping {
            // Hold the first frame for a consistent jump pose
            self.frame = AnimationFrame::First;
            self.frame_timer = 0.0;

            self.jump_elapsed += dt;
            if self.jump_elapsed >= self.jump_duration {
                self.jumping = false;
                self.jump_elapsed = 0.0;
                self.y_offset = 0.0;
            } else {
                let phase = self.jump_elapsed / self.jump_duration;
                self.y_offset = self.jump_height * (phase * std::f32::consts::PI).sin();
            }
        } else {
            self.frame_timer += dt;
            if self.frame_timer > self.frame_interval {
                self.frame_timer = 0.0;
                self.frame = self.frame.toggled();
            }
        }
    }

    /// Visual depth including jump height (screen y)
    #[inline]
    pub fn visual_depth(&self) -> f32 {
        self.depth - self.y_offset
    }

    /// Screen position used for collisions and magnet pull
    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.screen_x, self.visual_depth())
    }
}
