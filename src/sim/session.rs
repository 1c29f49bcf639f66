//! Session orchestration
//!
//! `GameSession` owns every piece of mutable simulation state. Collaborators
//! push intents, call [`GameSession::frame`] once per display frame, then read
//! the snapshot and drain the sound cues. Within a frame the order is fixed:
//! intents, clock, player, powerup timers, entities, collisions, events.

use serde::Serialize;

use super::clock::SimulationClock;
use super::collision::CollisionEngine;
use super::entity::{Collectible, Effect, EntityPool, Obstacle};
use super::perspective::Perspective;
use super::player::Player;
use super::powerup::{ActivePowerup, PowerupKind, PowerupTracker};
use super::state::{CollectibleKind, GamePhase, InteractionEvent};
use crate::platform::{Intent, IntentQueue, SoundEvent};
use crate::tuning::{Tuning, TuningError};

/// Read-only view of one frame for render, HUD and audio collaborators
#[derive(Debug, Clone, Serialize)]
pub struct FrameSnapshot {
    pub phase: GamePhase,
    pub score: u64,
    pub lives: u8,
    pub max_lives: u8,
    pub speed: f32,
    pub muted: bool,
    pub player: Player,
    /// Active obstacles only
    pub obstacles: Vec<Obstacle>,
    pub collectibles: Vec<Collectible>,
    pub effects: Vec<Effect>,
    pub powerups: Vec<ActivePowerup>,
}

/// One player's game, from the start screen through any number of runs
#[derive(Debug, Clone)]
pub struct GameSession {
    tuning: Tuning,
    perspective: Perspective,
    clock: SimulationClock,
    player: Player,
    pool: EntityPool,
    powerups: PowerupTracker,
    collision: CollisionEngine,
    intents: IntentQueue,
    sounds: Vec<SoundEvent>,
    phase: GamePhase,
    score: u64,
    lives: u8,
    muted: bool,
    runs: u32,
}

impl GameSession {
    /// Validate the tuning and build a session waiting on the start screen
    pub fn new(tuning: Tuning, seed: u64) -> Result<Self, TuningError> {
        tuning.validate()?;

        let perspective = Perspective::new(&tuning);
        let session = Self {
            clock: SimulationClock::new(&tuning),
            player: Player::new(&tuning, &perspective),
            pool: EntityPool::new(&tuning, seed, &perspective),
            powerups: PowerupTracker::new(tuning.powerup_durations),
            collision: CollisionEngine::new(tuning.radii),
            intents: IntentQueue::new(),
            sounds: Vec::new(),
            phase: GamePhase::Start,
            score: 0,
            lives: tuning.max_lives,
            muted: false,
            runs: 0,
            perspective,
            tuning,
        };
        log::info!("Session created with seed {}", seed);
        Ok(session)
    }

    /// Queue an intent for the next frame
    pub fn push_intent(&mut self, intent: Intent) {
        self.intents.push(intent);
    }

    /// Advance one display frame ending at `now_ms`
    pub fn frame(&mut self, now_ms: f64) {
        self.sounds.clear();

        let intents: Vec<Intent> = self.intents.drain().collect();
        for intent in intents {
            self.apply_intent(intent, now_ms);
        }

        if self.phase != GamePhase::Playing {
            return;
        }

        let boosted = self.powerups.is_active(PowerupKind::SpeedBoost);
        let Some(step) = self.clock.advance(now_ms, boosted) else {
            return;
        };

        self.player.update(step.dt, &self.perspective);
        self.powerups.update(step.dt);

        let magnet_target = self
            .powerups
            .is_active(PowerupKind::Magnet)
            .then(|| self.player.position());
        self.pool
            .update(step.dt, step.world_delta, &self.perspective, magnet_target);

        let events = self.collision.evaluate(
            &self.player,
            &mut self.pool,
            &self.powerups,
            &self.perspective,
        );
        self.apply_events(&events);
    }

    fn apply_intent(&mut self, intent: Intent, now_ms: f64) {
        let playing = self.phase == GamePhase::Playing;
        match intent {
            Intent::MoveLeft if playing => {
                if self.player.move_left() {
                    self.emit(SoundEvent::Woosh);
                }
            }
            Intent::MoveRight if playing => {
                if self.player.move_right() {
                    self.emit(SoundEvent::Woosh);
                }
            }
            Intent::Jump if playing => {
                self.player.jump();
            }
            Intent::ToggleMute => {
                self.muted = !self.muted;
                log::info!("Audio {}", if self.muted { "muted" } else { "unmuted" });
            }
            Intent::Start if self.phase == GamePhase::Start => self.begin_run(now_ms),
            Intent::Restart => self.begin_run(now_ms),
            _ => {}
        }
    }

    /// Fresh run: everything back to initial values, clock restarted
    fn begin_run(&mut self, now_ms: f64) {
        self.score = 0;
        self.lives = self.tuning.max_lives;
        self.player.reset(&self.perspective);
        self.powerups.reset();
        self.pool.reset(&self.perspective);
        self.clock.reset(now_ms);
        self.phase = GamePhase::Playing;
        self.runs += 1;
        log::info!("Run {} started", self.runs);
    }

    /// Apply interaction events in emission order. Nothing is applied once
    /// the run has ended.
    fn apply_events(&mut self, events: &[InteractionEvent]) {
        for event in events {
            if self.phase != GamePhase::Playing {
                break;
            }
            match *event {
                InteractionEvent::ObstacleHit => {
                    self.lives = self.lives.saturating_sub(1);
                    self.emit(SoundEvent::Fail);
                    log::debug!("Obstacle hit, {} lives left", self.lives);
                    if self.lives == 0 {
                        self.phase = GamePhase::GameOver;
                        log::info!("Game over after run {}: score {}", self.runs, self.score);
                    }
                }
                InteractionEvent::ShieldedHit => {
                    self.powerups.consume(PowerupKind::Shield);
                    self.emit(SoundEvent::Fail);
                    log::debug!("Shield absorbed a hit");
                }
                InteractionEvent::Collected(kind) => {
                    self.emit(SoundEvent::Pickup);
                    match kind {
                        CollectibleKind::Chilli => {
                            let multiplier = if self.powerups.is_active(PowerupKind::DoubleScore) {
                                2
                            } else {
                                1
                            };
                            self.score = self
                                .score
                                .saturating_add(self.tuning.chilli_score * multiplier);
                        }
                        CollectibleKind::Powerup(powerup) => self.powerups.activate(powerup),
                    }
                }
            }
        }
    }

    fn emit(&mut self, sound: SoundEvent) {
        if !self.muted {
            self.sounds.push(sound);
        }
    }

    /// Sound cues produced by the last frame
    pub fn drain_sounds(&mut self) -> Vec<SoundEvent> {
        std::mem::take(&mut self.sounds)
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            phase: self.phase,
            score: self.score,
            lives: self.lives,
            max_lives: self.tuning.max_lives,
            speed: self.clock.speed(),
            muted: self.muted,
            player: self.player.clone(),
            obstacles: self.pool.active_obstacles().cloned().collect(),
            collectibles: self.pool.collectibles().to_vec(),
            effects: self.pool.effects().to_vec(),
            powerups: self.powerups.snapshot_active(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn lives(&self) -> u8 {
        self.lives
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    /// Speed applied on the last simulated frame
    pub fn speed(&self) -> f32 {
        self.clock.speed()
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn powerups(&self) -> &PowerupTracker {
        &self.powerups
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Lane;

    const FRAME: f64 = 16.0;

    /// Session already playing at t=1000 with an empty road
    fn playing(tuning: Tuning) -> (GameSession, f64) {
        let mut session = GameSession::new(tuning, 1234).unwrap();
        session.push_intent(Intent::Start);
        session.frame(1_000.0);
        session.pool.park_obstacles();
        (session, 1_000.0)
    }

    fn obstacle_ahead(session: &mut GameSession) {
        let depth = session.player.depth + 10.0;
        let lane = session.player.lane;
        session
            .pool
            .activate_obstacle(lane, depth, &session.perspective)
            .unwrap();
    }

    fn item_ahead(session: &mut GameSession, kind: CollectibleKind) {
        let depth = session.player.depth + 5.0;
        let lane = session.player.lane;
        session
            .pool
            .spawn_collectible(kind, lane, depth, &session.perspective);
    }

    #[test]
    fn test_waits_on_start_screen() {
        let mut session = GameSession::new(Tuning::default(), 1).unwrap();
        session.push_intent(Intent::MoveLeft);
        session.frame(500.0);
        session.frame(516.0);
        assert_eq!(session.phase(), GamePhase::Start);
        assert_eq!(session.player().lane, Lane::CENTER);

        session.push_intent(Intent::Start);
        session.frame(532.0);
        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(session.lives(), 5);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_invalid_tuning_fails_fast() {
        let tuning = Tuning {
            speed_ramp_ms: 0.0,
            ..Default::default()
        };
        assert!(GameSession::new(tuning, 1).is_err());
    }

    #[test]
    fn test_spawn_odds_are_validated() {
        let tuning = Tuning {
            powerup_chance: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            GameSession::new(tuning, 1),
            Err(TuningError::OutOfUnitRange { field: "powerup_chance", .. })
        ));
    }

    #[test]
    fn test_single_move_left() {
        let (mut session, mut now) = playing(Tuning::default());
        session.push_intent(Intent::MoveLeft);
        now += FRAME;
        session.frame(now);
        assert_eq!(session.player().lane, Lane::LEFT);
        assert_eq!(session.drain_sounds(), vec![SoundEvent::Woosh]);

        for _ in 0..10 {
            now += FRAME;
            session.frame(now);
            assert_eq!(session.player().lane, Lane::LEFT);
        }
    }

    #[test]
    fn test_blocked_move_makes_no_sound() {
        let (mut session, now) = playing(Tuning::default());
        session.push_intent(Intent::MoveLeft);
        session.push_intent(Intent::MoveLeft);
        session.frame(now + FRAME);
        assert_eq!(session.player().lane, Lane::LEFT);
        assert_eq!(session.drain_sounds(), vec![SoundEvent::Woosh]);
    }

    #[test]
    fn test_speed_ramp_reaches_max_exactly() {
        let mut session = GameSession::new(Tuning::default(), 5).unwrap();
        session.push_intent(Intent::Start);
        session.frame(0.0);
        session.frame(16.0);
        assert!(session.speed() < 281.0);

        session.pool.park_obstacles();
        session.frame(60_000.0);
        assert_eq!(session.speed(), 550.0);
        session.frame(75_000.0);
        assert_eq!(session.speed(), 550.0);
    }

    #[test]
    fn test_speed_boost_multiplies_ramp() {
        let (mut session, now) = playing(Tuning::default());
        session.powerups.activate(PowerupKind::SpeedBoost);
        session.frame(now + FRAME);
        let expected = session.clock.ramp_speed(FRAME) * 1.5;
        assert!((session.speed() - expected).abs() < 1e-3);
    }

    #[test]
    fn test_five_hits_end_the_run() {
        let (mut session, mut now) = playing(Tuning::default());
        for hit in 1..=5u8 {
            obstacle_ahead(&mut session);
            now += FRAME;
            session.frame(now);
            assert_eq!(session.lives(), 5 - hit);
        }
        assert_eq!(session.phase(), GamePhase::GameOver);

        // Halted: nothing moves or scores any more
        let score = session.score();
        item_ahead(&mut session, CollectibleKind::Chilli);
        let before = session.snapshot();
        now += FRAME;
        session.frame(now);
        assert_eq!(session.score(), score);
        assert_eq!(session.lives(), 0);
        assert_eq!(session.snapshot().collectibles.len(), before.collectibles.len());
    }

    #[test]
    fn test_hit_fires_once_per_overlap() {
        let (mut session, mut now) = playing(Tuning::default());
        obstacle_ahead(&mut session);
        now += FRAME;
        session.frame(now);
        assert_eq!(session.lives(), 4);
        assert_eq!(session.drain_sounds(), vec![SoundEvent::Fail]);

        for _ in 0..5 {
            now += FRAME;
            session.frame(now);
        }
        assert_eq!(session.lives(), 4);
    }

    #[test]
    fn test_low_frame_rate_still_hits() {
        let (mut session, mut now) = playing(Tuning::default());
        now += 60_000.0;
        session.frame(now);
        session.pool.park_obstacles();
        session.powerups.activate(PowerupKind::SpeedBoost);
        let lives = session.lives();

        // 825 units/s over 60 ms carries the obstacle past the player in one frame
        let depth = session.player.depth + 40.0;
        let lane = session.player.lane;
        session
            .pool
            .activate_obstacle(lane, depth, &session.perspective)
            .unwrap();
        now += 60.0;
        session.frame(now);
        assert_eq!(session.speed(), 550.0 * 1.5);
        assert_eq!(session.lives(), lives - 1);
    }

    #[test]
    fn test_boosted_frame_still_collects() {
        let (mut session, now) = playing(Tuning::default());
        session.powerups.activate(PowerupKind::SpeedBoost);
        item_ahead(&mut session, CollectibleKind::Chilli);
        session.frame(now + FRAME);
        assert_eq!(session.score(), 100);
    }

    #[test]
    fn test_jump_dodges_obstacle() {
        let (mut session, mut now) = playing(Tuning::default());
        session.push_intent(Intent::Jump);
        now += FRAME;
        session.frame(now);
        obstacle_ahead(&mut session);
        now += FRAME;
        session.frame(now);
        assert_eq!(session.lives(), 5);
    }

    #[test]
    fn test_chilli_scores_and_doubles() {
        let (mut session, mut now) = playing(Tuning::default());
        item_ahead(&mut session, CollectibleKind::Chilli);
        now += FRAME;
        session.frame(now);
        assert_eq!(session.score(), 100);
        assert_eq!(session.drain_sounds(), vec![SoundEvent::Pickup]);

        session.powerups.activate(PowerupKind::DoubleScore);
        item_ahead(&mut session, CollectibleKind::Chilli);
        now += FRAME;
        session.frame(now);
        assert_eq!(session.score(), 100 + 2 * 100);
    }

    #[test]
    fn test_powerup_pickup_activates() {
        let (mut session, now) = playing(Tuning::default());
        item_ahead(&mut session, CollectibleKind::Powerup(PowerupKind::Magnet));
        session.frame(now + FRAME);
        assert!(session.powerups().is_active(PowerupKind::Magnet));
        assert_eq!(session.score(), 0);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.powerups.len(), 1);
        assert_eq!(snapshot.powerups[0].kind, PowerupKind::Magnet);
    }

    #[test]
    fn test_shield_absorbs_one_hit() {
        let tuning = Tuning {
            shield_enabled: true,
            ..Default::default()
        };
        let (mut session, mut now) = playing(tuning);
        session.powerups.activate(PowerupKind::Shield);

        obstacle_ahead(&mut session);
        now += FRAME;
        session.frame(now);
        assert_eq!(session.lives(), 5);
        assert!(!session.powerups().is_active(PowerupKind::Shield));

        obstacle_ahead(&mut session);
        now += FRAME;
        session.frame(now);
        assert_eq!(session.lives(), 4);
    }

    #[test]
    fn test_restart_round_trip() {
        let (mut session, mut now) = playing(Tuning::default());
        item_ahead(&mut session, CollectibleKind::Chilli);
        obstacle_ahead(&mut session);
        now += FRAME;
        session.frame(now);
        assert_eq!(session.score(), 100);
        assert_eq!(session.lives(), 4);
        session.powerups.activate(PowerupKind::SpeedBoost);

        session.push_intent(Intent::Restart);
        now += FRAME;
        session.frame(now);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.phase, GamePhase::Playing);
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.lives, snapshot.max_lives);
        assert!(snapshot.powerups.is_empty());
        assert_eq!(snapshot.obstacles.len(), session.tuning().initial_obstacles);
        assert_eq!(snapshot.player.lane, Lane::CENTER);
    }

    #[test]
    fn test_restart_from_game_over() {
        let (mut session, mut now) = playing(Tuning {
            max_lives: 1,
            ..Default::default()
        });
        obstacle_ahead(&mut session);
        now += FRAME;
        session.frame(now);
        assert_eq!(session.phase(), GamePhase::GameOver);

        // Start only works from the start screen
        session.push_intent(Intent::Start);
        now += FRAME;
        session.frame(now);
        assert_eq!(session.phase(), GamePhase::GameOver);

        session.push_intent(Intent::Restart);
        now += FRAME;
        session.frame(now);
        assert_eq!(session.phase(), GamePhase::Playing);
        assert_eq!(session.lives(), 1);
    }

    #[test]
    fn test_mute_suppresses_sounds() {
        let (mut session, now) = playing(Tuning::default());
        session.push_intent(Intent::ToggleMute);
        session.push_intent(Intent::MoveRight);
        session.frame(now + FRAME);
        assert!(session.muted());
        assert_eq!(session.player().lane, Lane::RIGHT);
        assert!(session.drain_sounds().is_empty());
    }

    #[test]
    fn test_zero_delta_frame_is_noop() {
        let (mut session, now) = playing(Tuning::default());
        session.frame(now + FRAME);
        let before = serde_json::to_string(&session.snapshot()).unwrap();
        session.frame(now + FRAME);
        session.frame(now);
        let after = serde_json::to_string(&session.snapshot()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = || {
            let mut session = GameSession::new(Tuning::default(), 77).unwrap();
            session.push_intent(Intent::Start);
            let mut now = 0.0;
            for i in 0..600 {
                if i % 90 == 45 {
                    session.push_intent(Intent::MoveRight);
                }
                if i % 90 == 0 {
                    session.push_intent(Intent::MoveLeft);
                }
                session.frame(now);
                now += FRAME;
            }
            serde_json::to_string(&session.snapshot()).unwrap()
        };
        assert_eq!(run(), run());
    }
}
