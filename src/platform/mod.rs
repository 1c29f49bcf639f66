//! Platform abstraction layer
//!
//! The simulation never talks to the browser directly. Input arrives as
//! queued intents; sounds leave as fire-and-forget events.

use std::collections::VecDeque;

use glam::Vec2;
use serde::Serialize;

/// Discrete player/menu signals (one per key press or gesture)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Intent {
    MoveLeft,
    MoveRight,
    Jump,
    ToggleMute,
    Start,
    Restart,
}

/// Intents waiting for the next frame. Each is consumed exactly once.
#[derive(Debug, Clone, Default)]
pub struct IntentQueue {
    pending: VecDeque<Intent>,
}

impl IntentQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, intent: Intent) {
        self.pending.push_back(intent);
    }

    /// Take everything queued so far, oldest first
    pub fn drain(&mut self) -> impl Iterator<Item = Intent> + '_ {
        self.pending.drain(..)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

/// Minimum travel (CSS px) for a touch to count as a swipe
pub const SWIPE_THRESHOLD: f32 = 30.0;

/// Turn a touch gesture into an intent. Screen coordinates, y grows down.
/// The dominant axis decides; vertical swipes only mean something upward.
pub fn classify_swipe(start: Vec2, end: Vec2) -> Option<Intent> {
    let diff = end - start;
    if diff.x.abs() > diff.y.abs() {
        if diff.x > SWIPE_THRESHOLD {
            Some(Intent::MoveRight)
        } else if diff.x < -SWIPE_THRESHOLD {
            Some(Intent::MoveLeft)
        } else {
            None
        }
    } else if diff.y < -SWIPE_THRESHOLD {
        Some(Intent::Jump)
    } else {
        None
    }
}

/// Sound cues emitted by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SoundEvent {
    /// Collectible picked up
    Pickup,
    /// Obstacle hit
    Fail,
    /// Lane change
    Woosh,
}

impl SoundEvent {
    pub fn name(self) -> &'static str {
        match self {
            SoundEvent::Pickup => "pickup",
            SoundEvent::Fail => "fail",
            SoundEvent::Woosh => "woosh",
        }
    }
}

/// Anything that can play sound cues. Must never block; an unavailable
/// backend simply drops the cue.
pub trait AudioSink {
    fn play(&mut self, sound: SoundEvent);
}

/// Logs cues instead of playing them (native builds, headless runs)
#[derive(Debug, Default)]
pub struct LogAudio {
    pub played: usize,
}

impl AudioSink for LogAudio {
    fn play(&mut self, sound: SoundEvent) {
        self.played += 1;
        log::trace!("sound: {}", sound.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_drains_in_order_once() {
        let mut queue = IntentQueue::new();
        queue.push(Intent::MoveLeft);
        queue.push(Intent::Jump);
        assert_eq!(queue.len(), 2);

        let drained: Vec<Intent> = queue.drain().collect();
        assert_eq!(drained, vec![Intent::MoveLeft, Intent::Jump]);
        assert!(queue.is_empty());
        assert_eq!(queue.drain().count(), 0);
    }

    #[test]
    fn test_swipe_directions() {
        let origin = Vec2::new(200.0, 400.0);
        assert_eq!(classify_swipe(origin, origin + Vec2::new(80.0, 10.0)), Some(Intent::MoveRight));
        assert_eq!(classify_swipe(origin, origin + Vec2::new(-80.0, -10.0)), Some(Intent::MoveLeft));
        assert_eq!(classify_swipe(origin, origin + Vec2::new(5.0, -60.0)), Some(Intent::Jump));
    }

    #[test]
    fn test_swipe_needs_travel_and_ignores_down() {
        let origin = Vec2::new(200.0, 400.0);
        // Taps and short drags
        assert_eq!(classify_swipe(origin, origin), None);
        assert_eq!(classify_swipe(origin, origin + Vec2::new(30.0, 0.0)), None);
        assert_eq!(classify_swipe(origin, origin + Vec2::new(0.0, -30.0)), None);
        // Downward swipes do nothing
        assert_eq!(classify_swipe(origin, origin + Vec2::new(0.0, 120.0)), None);
        // Mostly vertical upward drag is a jump, not a lane change
        assert_eq!(classify_swipe(origin, origin + Vec2::new(40.0, -90.0)), Some(Intent::Jump));
    }

    #[test]
    fn test_log_audio_counts() {
        let mut audio = LogAudio::default();
        audio.play(SoundEvent::Pickup);
        audio.play(SoundEvent::Woosh);
        assert_eq!(audio.played, 2);
    }
}
