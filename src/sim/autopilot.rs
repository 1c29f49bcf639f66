//! Demo autopilot
//!
//! Plays the game from a frame snapshot: dodge the nearest obstacle in the
//! current lane, jump when there is nowhere to go, and drift toward
//! collectibles while the road is clear. Used by the headless native run and
//! the browser demo toggle.

use super::entity::Obstacle;
use super::perspective::Perspective;
use super::session::FrameSnapshot;
use super::state::{GamePhase, Lane};
use crate::platform::Intent;
use crate::tuning::{CollisionRadii, Tuning};

/// Seconds of travel ahead that count as danger in the current lane
const DODGE_HORIZON_S: f32 = 0.9;
/// Jump once contact is this close (seconds of travel)
const JUMP_HORIZON_S: f32 = 0.12;

#[derive(Debug, Clone)]
pub struct Autopilot {
    perspective: Perspective,
    radii: CollisionRadii,
}

impl Autopilot {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            perspective: Perspective::new(tuning),
            radii: tuning.radii,
        }
    }

    /// At most one intent per frame
    pub fn decide(&self, snapshot: &FrameSnapshot) -> Option<Intent> {
        match snapshot.phase {
            GamePhase::Start => return Some(Intent::Start),
            GamePhase::GameOver => return None,
            GamePhase::Playing => {}
        }

        let player = &snapshot.player;
        if player.jumping {
            return None;
        }

        let speed_per_s = snapshot.speed.max(1.0);
        let contact = (self.radii.player + self.radii.obstacle)
            * self.perspective.size_scale_at(player.depth);
        let dodge_range = speed_per_s * DODGE_HORIZON_S + contact;
        let jump_range = speed_per_s * JUMP_HORIZON_S + contact;

        let clearance = |lane: Lane| nearest_ahead(&snapshot.obstacles, lane, player.depth);
        let current = clearance(player.lane);

        if current < dodge_range {
            // Most open neighbour, if it beats staying put
            let best = [player.lane.left(), player.lane.right()]
                .into_iter()
                .flatten()
                .map(|lane| (lane, clearance(lane)))
                .filter(|(_, room)| *room > current && *room > jump_range)
                .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

            if let Some((lane, _)) = best {
                return Some(step_toward(player.lane, lane));
            }
            if current < jump_range {
                return Some(Intent::Jump);
            }
            return None;
        }

        // Road is clear: go grab the nearest collectible in a safe lane
        snapshot
            .collectibles
            .iter()
            .filter(|c| c.depth >= player.depth && c.depth - player.depth < dodge_range * 2.0)
            .filter(|c| c.lane != player.lane && clearance(c.lane) >= dodge_range)
            .min_by(|a, b| {
                a.depth
                    .partial_cmp(&b.depth)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|c| step_toward(player.lane, c.lane))
    }
}

/// Distance to the closest active obstacle ahead in `lane`
fn nearest_ahead(obstacles: &[Obstacle], lane: Lane, anchor: f32) -> f32 {
    obstacles
        .iter()
        .filter(|o| o.active && o.lane == lane && o.depth >= anchor)
        .map(|o| o.depth - anchor)
        .fold(f32::INFINITY, f32::min)
}

fn step_toward(from: Lane, to: Lane) -> Intent {
    if to.index() < from.index() {
        Intent::MoveLeft
    } else {
        Intent::MoveRight
    }
}
