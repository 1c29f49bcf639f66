//! Perspective projection for the road
//!
//! Depth runs from 0 (far end, top of the screen) to the track height (near
//! the camera, bottom of the screen). Scale follows a power curve so lane
//! spacing widens faster as things approach the camera.

use glam::Vec2;

use super::state::Lane;
use crate::consts::LANE_COUNT;
use crate::tuning::Tuning;

/// Maps (lane, depth) to screen x and scale. Pure and cheap.
#[derive(Debug, Clone, PartialEq)]
pub struct Perspective {
    center_x: f32,
    track_height: f32,
    lane_offsets: [f32; LANE_COUNT],
    scale_top: f32,
    scale_bottom: f32,
    exponent: f32,
}

impl Perspective {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            center_x: tuning.track_width / 2.0,
            track_height: tuning.track_height,
            lane_offsets: tuning.lane_offsets,
            scale_top: tuning.perspective.scale_top,
            scale_bottom: tuning.perspective.scale_bottom,
            exponent: tuning.perspective.exponent,
        }
    }

    /// Lane spacing multiplier at a depth
    pub fn lane_scale_at(&self, depth: f32) -> f32 {
        // Clamp before powf: a negative base with a fractional exponent is NaN
        let t = (depth / self.track_height).clamp(0.0, 1.0);
        let t = if t.is_nan() { 0.0 } else { t };
        let k = t.powf(self.exponent);
        self.scale_top + (self.scale_bottom - self.scale_top) * k
    }

    /// Screen x of a lane's center line at a depth
    #[inline]
    pub fn lane_center_x(&self, lane: Lane, depth: f32) -> f32 {
        self.center_x + self.lane_offsets[lane.index()] * self.lane_scale_at(depth)
    }

    /// Sprite and collision scale at a depth (same curve as lane spacing)
    #[inline]
    pub fn size_scale_at(&self, depth: f32) -> f32 {
        self.lane_scale_at(depth)
    }

    /// Screen position of a lane-bound point
    #[inline]
    pub fn project(&self, lane: Lane, depth: f32) -> Vec2 {
        Vec2::new(self.lane_center_x(lane, depth), depth)
    }
}
