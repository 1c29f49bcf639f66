//! Obstacles, collectibles and burst effects
//!
//! Obstacles live in a fixed-size pool allocated once per session. Slots are
//! either parked or active; active obstacles are recycled by wrapping their
//! depth forward by the total track span when they scroll past the near
//! threshold, so the pool never allocates during play. Collectibles and
//! effects are created on demand and dropped when they leave the road or fade.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::collision::CollisionEngine;
use super::perspective::Perspective;
use super::player::Player;
use super::powerup::{PowerupKind, PowerupTracker};
use super::state::{CollectibleKind, InteractionEvent, Lane, ObstacleKind};
use crate::consts::REFERENCE_FRAME_MS;
use crate::tuning::{SpawnRange, Tuning};

/// A pooled obstacle slot
#[derive(Debug, Clone, Serialize)]
pub struct Obstacle {
    /// Slot index (stable for the life of the session)
    pub id: u32,
    pub kind: ObstacleKind,
    pub lane: Lane,
    pub depth: f32,
    /// Depth before the last advance (collisions sweep the move between)
    #[serde(skip)]
    pub prev_depth: f32,
    pub screen_x: f32,
    pub scale: f32,
    /// Parked slots are not simulated, rendered or collided
    pub active: bool,
}

impl Obstacle {
    fn parked(id: u32) -> Self {
        Self {
            id,
            kind: ObstacleKind::Crate,
            lane: Lane::CENTER,
            depth: 0.0,
            prev_depth: 0.0,
            screen_x: 0.0,
            scale: 0.0,
            active: false,
        }
    }

    fn derive(&mut self, perspective: &Perspective) {
        self.screen_x = perspective.lane_center_x(self.lane, self.depth);
        self.scale = perspective.size_scale_at(self.depth);
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.screen_x, self.depth)
    }
}

/// A pickup on the road
#[derive(Debug, Clone, Serialize)]
pub struct Collectible {
    pub id: u32,
    pub kind: CollectibleKind,
    pub lane: Lane,
    pub depth: f32,
    #[serde(skip)]
    pub prev_depth: f32,
    /// Horizontal offset from the lane center accumulated by magnet pull
    pub lateral: f32,
    pub screen_x: f32,
    pub scale: f32,
}

impl Collectible {
    fn derive(&mut self, perspective: &Perspective) {
        self.screen_x = perspective.lane_center_x(self.lane, self.depth) + self.lateral;
        self.scale = perspective.size_scale_at(self.depth);
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.screen_x, self.depth)
    }
}

/// Fading burst left behind by an obstacle hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Effect {
    pub x: f32,
    pub y: f32,
    /// 1 when spawned, removed at 0
    pub life: f32,
}

/// Magnet attraction for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnetPull {
    /// Player's visual position
    pub target: Vec2,
    /// Share of the remaining distance closed this frame, in (0, 1)
    pub fraction: f32,
}

impl MagnetPull {
    /// Convert a per-reference-frame pull into this frame's share
    pub fn for_frame(target: Vec2, pull_per_frame: f32, dt: f32) -> Self {
        let fraction = 1.0 - (1.0 - pull_per_frame).powf(dt.max(0.0) / REFERENCE_FRAME_MS);
        Self { target, fraction }
    }
}

/// Owns and advances every non-player entity
#[derive(Debug, Clone)]
pub struct EntityPool {
    tuning: Tuning,
    rng: Pcg32,
    obstacles: Vec<Obstacle>,
    collectibles: Vec<Collectible>,
    effects: Vec<Effect>,
    obstacle_countdown: f32,
    collectible_countdown: f32,
    next_collectible_id: u32,
}

impl EntityPool {
    /// `tuning` must already be validated (spawn odds feed `random_bool`)
    pub(crate) fn new(tuning: &Tuning, seed: u64, perspective: &Perspective) -> Self {
        let obstacles = (0..tuning.obstacle_pool_size as u32)
            .map(Obstacle::parked)
            .collect();
        let mut pool = Self {
            tuning: tuning.clone(),
            rng: Pcg32::seed_from_u64(seed),
            obstacles,
            collectibles: Vec::new(),
            effects: Vec::new(),
            obstacle_countdown: 0.0,
            collectible_countdown: 0.0,
            next_collectible_id: 1,
        };
        pool.reset(perspective);
        pool
    }

    /// Fresh initial layout: same shape every time, new random content
    pub fn reset(&mut self, perspective: &Perspective) {
        for slot in &mut self.obstacles {
            slot.active = false;
        }

        let mut depth = self.tuning.obstacle_spawn_depth;
        for i in 0..self.tuning.initial_obstacles {
            let lane = Lane::random(&mut self.rng);
            let kind = ObstacleKind::random(&mut self.rng);
            let slot = &mut self.obstacles[i];
            slot.kind = kind;
            slot.lane = lane;
            slot.depth = depth;
            slot.prev_depth = depth;
            slot.active = true;
            slot.derive(perspective);
            depth += sample(&mut self.rng, self.tuning.obstacle_gap);
        }

        self.collectibles.clear();
        self.effects.clear();
        self.collectible_countdown = 0.0;
        self.obstacle_countdown = sample(&mut self.rng, self.tuning.obstacle_interval);
        self.next_collectible_id = 1;
    }

    /// Spawn checks, movement, then effect decay
    pub fn update(
        &mut self,
        dt: f32,
        world_delta: f32,
        perspective: &Perspective,
        magnet_target: Option<Vec2>,
    ) {
        if !(dt > 0.0) {
            return;
        }
        self.spawn_obstacle_if_due(dt, perspective);
        self.spawn_collectible_if_due(dt, perspective);
        let magnet = magnet_target
            .map(|target| MagnetPull::for_frame(target, self.tuning.magnet_pull, dt));
        self.advance(world_delta, perspective, magnet);
        self.update_effects(dt);
    }

    /// Activate a parked slot at the far end once the countdown expires
    pub fn spawn_obstacle_if_due(&mut self, dt: f32, perspective: &Perspective) {
        self.obstacle_countdown -= dt;
        if self.obstacle_countdown > 0.0 {
            return;
        }
        self.obstacle_countdown = sample(&mut self.rng, self.tuning.obstacle_interval);

        let lane = Lane::random(&mut self.rng);
        let depth = self.tuning.obstacle_spawn_depth;
        if let Some(id) = self.activate_obstacle(lane, depth, perspective) {
            log::debug!("Obstacle slot {} activated in lane {}", id, lane.index());
        }
    }

    /// Put a parked slot on the road. `None` when the pool is full.
    pub fn activate_obstacle(
        &mut self,
        lane: Lane,
        depth: f32,
        perspective: &Perspective,
    ) -> Option<u32> {
        let kind = ObstacleKind::random(&mut self.rng);
        let slot = self.obstacles.iter_mut().find(|o| !o.active)?;
        slot.kind = kind;
        slot.lane = lane;
        slot.depth = depth;
        slot.prev_depth = depth;
        slot.active = true;
        slot.derive(perspective);
        Some(slot.id)
    }

    /// Park every slot (nothing on the road)
    pub fn park_obstacles(&mut self) {
        for slot in &mut self.obstacles {
            slot.active = false;
        }
    }

    pub fn spawn_collectible_if_due(&mut self, dt: f32, perspective: &Perspective) {
        self.collectible_countdown -= dt;
        if self.collectible_countdown > 0.0 {
            return;
        }
        self.collectible_countdown = sample(&mut self.rng, self.tuning.collectible_interval);

        let powerups = self.tuning.spawnable_powerups();
        let kind = if self.rng.random_bool(self.tuning.powerup_chance as f64) {
            CollectibleKind::Powerup(powerups[self.rng.random_range(0..powerups.len())])
        } else {
            CollectibleKind::Chilli
        };
        let lane = Lane::random(&mut self.rng);
        let depth = self.tuning.collectible_spawn_depth;
        self.spawn_collectible(kind, lane, depth, perspective);
    }

    /// Place a collectible on the road, returning its id
    pub fn spawn_collectible(
        &mut self,
        kind: CollectibleKind,
        lane: Lane,
        depth: f32,
        perspective: &Perspective,
    ) -> u32 {
        let id = self.next_collectible_id;
        self.next_collectible_id += 1;
        let mut collectible = Collectible {
            id,
            kind,
            lane,
            depth,
            prev_depth: depth,
            lateral: 0.0,
            screen_x: 0.0,
            scale: 0.0,
        };
        collectible.derive(perspective);
        self.collectibles.push(collectible);
        id
    }

    /// Scroll everything toward the camera by `world_delta`
    pub fn advance(
        &mut self,
        world_delta: f32,
        perspective: &Perspective,
        magnet: Option<MagnetPull>,
    ) {
        let span = self.tuning.obstacle_track_span();
        let obstacle_limit = self.tuning.obstacle_despawn_depth;
        for obs in self.obstacles.iter_mut().filter(|o| o.active) {
            obs.prev_depth = obs.depth;
            obs.depth -= world_delta;
            if obs.depth < obstacle_limit {
                obs.depth += span;
                obs.prev_depth = obs.depth;
                obs.lane = Lane::random(&mut self.rng);
                obs.kind = ObstacleKind::random(&mut self.rng);
            }
            obs.derive(perspective);
        }

        let range = self.tuning.magnet_range;
        let anchor = self.tuning.player_depth;
        for item in &mut self.collectibles {
            item.prev_depth = item.depth;
            item.depth -= world_delta;
            item.derive(perspective);

            // Items already behind the player are left to scroll away
            let Some(pull) = magnet else { continue };
            if item.depth < anchor {
                continue;
            }
            let pos = item.position();
            let to_player = pull.target - pos;
            if to_player.length() < range {
                let pulled = pos + to_player * pull.fraction;
                item.depth = pulled.y;
                item.lateral = pulled.x - perspective.lane_center_x(item.lane, item.depth);
                item.derive(perspective);
            }
        }

        let collectible_limit = self.tuning.collectible_despawn_depth;
        self.collectibles.retain(|c| c.depth >= collectible_limit);
    }

    /// Spatial test against the player over each entity's last move. Only the
    /// first overlapping obstacle is resolved (and pushed out of range); any
    /// number of collectibles may be picked up in the same frame.
    pub fn check_collisions(
        &mut self,
        engine: &CollisionEngine,
        player: &Player,
        powerups: &PowerupTracker,
        perspective: &Perspective,
    ) -> Vec<InteractionEvent> {
        let mut events = Vec::new();
        let span = self.tuning.obstacle_track_span();

        let mut burst = None;
        for obs in self.obstacles.iter_mut() {
            if engine.hits_obstacle(player, obs, perspective) {
                burst = Some(obs.position());
                obs.depth += span;
                obs.prev_depth = obs.depth;
                obs.derive(perspective);
                events.push(if powerups.is_active(PowerupKind::Shield) {
                    InteractionEvent::ShieldedHit
                } else {
                    InteractionEvent::ObstacleHit
                });
                break;
            }
        }
        if let Some(at) = burst {
            self.add_effect(at.x, at.y);
        }

        let magnet = powerups.is_active(PowerupKind::Magnet);
        self.collectibles.retain(|item| {
            if engine.reaches_collectible(player, item, magnet, perspective) {
                events.push(InteractionEvent::Collected(item.kind));
                false
            } else {
                true
            }
        });

        events
    }

    pub fn add_effect(&mut self, x: f32, y: f32) {
        self.effects.push(Effect { x, y, life: 1.0 });
    }

    pub fn update_effects(&mut self, dt: f32) {
        let lifespan = self.tuning.effect_lifespan_ms;
        for effect in &mut self.effects {
            effect.life -= dt / lifespan;
        }
        self.effects.retain(|e| e.life > 0.0);
    }

    /// Every slot, parked or not
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn active_obstacles(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter().filter(|o| o.active)
    }

    pub fn collectibles(&self) -> &[Collectible] {
        &self.collectibles
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }
}

fn sample(rng: &mut Pcg32, range: SpawnRange) -> f32 {
    rng.random_range(range.min..=range.max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn setup(seed: u64) -> (EntityPool, Perspective, Tuning) {
        let tuning = Tuning::default();
        let perspective = Perspective::new(&tuning);
        (EntityPool::new(&tuning, seed, &perspective), perspective, tuning)
    }

    #[test]
    fn test_initial_layout() {
        let (pool, _, tuning) = setup(1);
        assert_eq!(pool.obstacles().len(), tuning.obstacle_pool_size);
        assert_eq!(pool.active_obstacles().count(), tuning.initial_obstacles);

        let depths: Vec<f32> = pool.active_obstacles().map(|o| o.depth).collect();
        assert_eq!(depths[0], tuning.obstacle_spawn_depth);
        for pair in depths.windows(2) {
            let gap = pair[1] - pair[0];
            assert!((300.0..=700.0).contains(&gap));
        }
    }

    #[test]
    fn test_reset_keeps_shape_with_new_content() {
        let (mut pool, p, _) = setup(2);
        let before: Vec<(Lane, f32)> = pool.active_obstacles().map(|o| (o.lane, o.depth)).collect();
        pool.spawn_collectible(CollectibleKind::Chilli, Lane::LEFT, 500.0, &p);
        pool.add_effect(10.0, 10.0);

        pool.reset(&p);
        let after: Vec<(Lane, f32)> = pool.active_obstacles().map(|o| (o.lane, o.depth)).collect();
        assert_eq!(before.len(), after.len());
        assert_ne!(before, after);
        assert!(pool.collectibles().is_empty());
        assert!(pool.effects().is_empty());
    }

    #[test]
    fn test_advance_zero_is_idempotent() {
        let (mut pool, p, _) = setup(3);
        pool.spawn_collectible(CollectibleKind::Chilli, Lane::RIGHT, 640.0, &p);
        pool.advance(12.0, &p, None);
        let obstacles: Vec<Vec2> = pool.active_obstacles().map(|o| o.position()).collect();
        let items: Vec<Vec2> = pool.collectibles().iter().map(|c| c.position()).collect();

        pool.advance(0.0, &p, None);
        let obstacles_after: Vec<Vec2> = pool.active_obstacles().map(|o| o.position()).collect();
        let items_after: Vec<Vec2> = pool.collectibles().iter().map(|c| c.position()).collect();
        assert_eq!(obstacles, obstacles_after);
        assert_eq!(items, items_after);
    }

    #[test]
    fn test_derived_fields_follow_perspective() {
        let (mut pool, p, _) = setup(4);
        pool.advance(100.0, &p, None);
        for obs in pool.active_obstacles() {
            assert_eq!(obs.screen_x, p.lane_center_x(obs.lane, obs.depth));
            assert_eq!(obs.scale, p.size_scale_at(obs.depth));
        }
    }

    #[test]
    fn test_obstacles_recycle_instead_of_dropping() {
        let (mut pool, p, tuning) = setup(5);
        pool.park_obstacles();
        let id = pool.activate_obstacle(Lane::LEFT, -90.0, &p).unwrap();

        pool.advance(20.0, &p, None);
        let obs = &pool.obstacles()[id as usize];
        assert!(obs.active);
        assert!((obs.depth - (-110.0 + tuning.obstacle_track_span())).abs() < 1e-3);
        assert_eq!(pool.obstacles().len(), tuning.obstacle_pool_size);
    }

    #[test]
    fn test_collectibles_removed_past_threshold() {
        let (mut pool, p, _) = setup(6);
        pool.spawn_collectible(CollectibleKind::Chilli, Lane::CENTER, -40.0, &p);
        pool.advance(5.0, &p, None);
        assert_eq!(pool.collectibles().len(), 1);
        pool.advance(10.0, &p, None);
        assert!(pool.collectibles().is_empty());
    }

    #[test]
    fn test_obstacle_spawn_fills_parked_slots_only() {
        let (mut pool, p, tuning) = setup(7);
        let parked = tuning.obstacle_pool_size - tuning.initial_obstacles;
        for _ in 0..(parked + 3) {
            pool.spawn_obstacle_if_due(tuning.obstacle_interval.max, &p);
        }
        assert_eq!(pool.active_obstacles().count(), tuning.obstacle_pool_size);
        assert_eq!(pool.obstacles().len(), tuning.obstacle_pool_size);
    }

    #[test]
    fn test_collectible_spawn_timer() {
        let (mut pool, p, _) = setup(8);
        // Countdown starts expired, so the first frame spawns
        pool.spawn_collectible_if_due(16.0, &p);
        assert_eq!(pool.collectibles().len(), 1);
        // Next interval is at least 300 ms
        pool.spawn_collectible_if_due(16.0, &p);
        assert_eq!(pool.collectibles().len(), 1);
        pool.spawn_collectible_if_due(800.0, &p);
        assert_eq!(pool.collectibles().len(), 2);
    }

    #[test]
    fn test_powerup_share_of_spawns() {
        let (mut pool, p, _) = setup(9);
        let mut powerups = 0;
        for _ in 0..2_000 {
            pool.spawn_collectible_if_due(1_000.0, &p);
        }
        for item in pool.collectibles() {
            match item.kind {
                CollectibleKind::Powerup(kind) => {
                    assert_ne!(kind, PowerupKind::Shield);
                    powerups += 1;
                }
                CollectibleKind::Chilli => {}
            }
        }
        let share = powerups as f32 / pool.collectibles().len() as f32;
        assert!((0.15..0.25).contains(&share), "share {}", share);
    }

    #[test]
    fn test_effects_fade_out() {
        let (mut pool, _, _) = setup(10);
        pool.add_effect(100.0, 200.0);
        pool.update_effects(150.0);
        assert!((pool.effects()[0].life - 0.5).abs() < 1e-6);
        pool.update_effects(150.0);
        assert!(pool.effects().is_empty());
    }

    #[test]
    fn test_magnet_pull_out_of_range_is_ignored() {
        let (mut pool, p, _) = setup(11);
        pool.spawn_collectible(CollectibleKind::Chilli, Lane::LEFT, 900.0, &p);
        let before = pool.collectibles()[0].position();
        let pull = MagnetPull {
            target: Vec2::new(270.0, 180.0),
            fraction: 0.1,
        };
        pool.advance(0.0, &p, Some(pull));
        assert_eq!(pool.collectibles()[0].position(), before);
    }

    #[test]
    fn test_magnet_ignores_items_behind_player() {
        let (mut pool, p, tuning) = setup(13);
        let depth = tuning.player_depth - 20.0;
        pool.spawn_collectible(CollectibleKind::Chilli, Lane::CENTER, depth, &p);
        let before = pool.collectibles()[0].position();
        let target = Vec2::new(p.lane_center_x(Lane::CENTER, tuning.player_depth), tuning.player_depth);

        pool.advance(0.0, &p, Some(MagnetPull::for_frame(target, 0.1, REFERENCE_FRAME_MS)));
        assert_eq!(pool.collectibles()[0].position(), before);

        // Keeps scrolling off the road instead of hovering behind the player
        for _ in 0..30 {
            pool.advance(10.0, &p, Some(MagnetPull::for_frame(target, 0.1, REFERENCE_FRAME_MS)));
        }
        assert!(pool.collectibles().is_empty());
    }

    #[test]
    fn test_sweep_origin_tracks_moves() {
        let (mut pool, p, _) = setup(14);
        pool.park_obstacles();
        let id = pool.activate_obstacle(Lane::RIGHT, 400.0, &p).unwrap();
        pool.spawn_collectible(CollectibleKind::Chilli, Lane::LEFT, 300.0, &p);
        assert_eq!(pool.obstacles()[id as usize].prev_depth, 400.0);

        pool.advance(25.0, &p, None);
        let obs = &pool.obstacles()[id as usize];
        assert_eq!((obs.prev_depth, obs.depth), (400.0, 375.0));
        let item = &pool.collectibles()[0];
        assert_eq!((item.prev_depth, item.depth), (300.0, 275.0));
    }

    #[test]
    fn test_magnet_fraction_is_frame_rate_independent() {
        let target = Vec2::ZERO;
        let at_60 = MagnetPull::for_frame(target, 0.1, REFERENCE_FRAME_MS);
        assert!((at_60.fraction - 0.1).abs() < 1e-6);

        let half = MagnetPull::for_frame(target, 0.1, REFERENCE_FRAME_MS / 2.0);
        let remaining_two_halves = (1.0 - half.fraction) * (1.0 - half.fraction);
        assert!((remaining_two_halves - 0.9).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn prop_magnet_never_overshoots(
            lane in 0usize..3,
            depth in 200.0f32..450.0,
            dt in 1.0f32..100.0,
        ) {
            let (mut pool, p, _) = setup(12);
            let lane = Lane::new(lane).unwrap();
            pool.spawn_collectible(CollectibleKind::Chilli, lane, depth, &p);
            let target = Vec2::new(p.lane_center_x(Lane::CENTER, 180.0), 180.0);
            let before = pool.collectibles()[0].position();
            prop_assume!(before.distance(target) > 1.0);

            pool.advance(0.0, &p, Some(MagnetPull::for_frame(target, 0.1, dt)));
            let after = pool.collectibles()[0].position();

            prop_assert!(after.distance(target) < before.distance(target));
            // Moved along the segment toward the player, never past it
            prop_assert!((before - target).dot(after - target) > 0.0);
        }
    }
}
