//! Perspective-corrected proximity tests
//!
//! Everything is a circle in screen space whose radius is a base radius times
//! the perspective scale at its depth, so the hit area shrinks with the sprite
//! as it recedes. The player circle sits at the player's visual depth (raised
//! by the jump arc).
//!
//! Entities are tested at the point of their last move closest to the player,
//! so a long frame cannot carry them through the player unnoticed.

use glam::Vec2;

use super::entity::{Collectible, EntityPool, Obstacle};
use super::perspective::Perspective;
use super::player::Player;
use super::powerup::PowerupTracker;
use super::state::InteractionEvent;
use crate::tuning::CollisionRadii;

/// A screen-space circle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    /// Touching counts as overlapping
    #[inline]
    pub fn overlaps(&self, other: &Circle) -> bool {
        let reach = self.radius + other.radius;
        self.center.distance_squared(other.center) <= reach * reach
    }
}

/// Decides which entities the player touches this frame
#[derive(Debug, Clone)]
pub struct CollisionEngine {
    radii: CollisionRadii,
}

impl CollisionEngine {
    pub fn new(radii: CollisionRadii) -> Self {
        Self { radii }
    }

    fn player_circle(&self, player: &Player, base: f32, perspective: &Perspective) -> Circle {
        let visual = player.visual_depth();
        Circle {
            center: player.position(),
            radius: base * perspective.size_scale_at(visual),
        }
    }

    /// Obstacles are skipped while airborne and once their whole last move
    /// lies behind the player's anchor depth.
    pub fn hits_obstacle(&self, player: &Player, obs: &Obstacle, perspective: &Perspective) -> bool {
        if !obs.active || player.jumping {
            return false;
        }
        let Some(depth) = closest_depth(obs.prev_depth, obs.depth, player.depth, player.depth) else {
            return false;
        };
        let obstacle = Circle {
            center: perspective.project(obs.lane, depth),
            radius: self.radii.obstacle * perspective.size_scale_at(depth),
        };
        self.player_circle(player, self.radii.player, perspective)
            .overlaps(&obstacle)
    }

    /// Collectibles stay collectible mid-jump, so they are gated on the
    /// raised visual depth rather than the anchor. With the magnet on, the
    /// player reaches further for powerups (not chillies).
    pub fn reaches_collectible(
        &self,
        player: &Player,
        item: &Collectible,
        magnet_active: bool,
        perspective: &Perspective,
    ) -> bool {
        let visual = player.visual_depth();
        let Some(depth) = closest_depth(item.prev_depth, item.depth, visual, visual) else {
            return false;
        };
        let base = if magnet_active && !item.kind.is_currency() {
            self.radii.magnet_player
        } else {
            self.radii.player
        };
        let collectible = Circle {
            center: perspective.project(item.lane, depth) + Vec2::new(item.lateral, 0.0),
            radius: self.radii.collectible * perspective.size_scale_at(depth),
        };
        self.player_circle(player, base, perspective)
            .overlaps(&collectible)
    }

    /// Run this frame's spatial test against the pool
    pub fn evaluate(
        &self,
        player: &Player,
        pool: &mut EntityPool,
        powerups: &PowerupTracker,
        perspective: &Perspective,
    ) -> Vec<InteractionEvent> {
        pool.check_collisions(self, player, powerups, perspective)
    }
}

/// Depth on the move `prev..=now` closest to `target`, considering only the
/// part at or beyond `near_limit`. `None` when the whole move is behind it.
fn closest_depth(prev: f32, now: f32, near_limit: f32, target: f32) -> Option<f32> {
    let far = prev.max(now);
    if !(far >= near_limit) {
        return None;
    }
    let near = prev.min(now).max(near_limit);
    Some(target.clamp(near, far))
}
