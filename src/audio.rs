//! Audio system using Web Audio API
//!
//! The three game cues are synthesized on the fly, so there are no files to
//! load. If there is no context, or it is still suspended waiting for a user
//! gesture, cues are dropped silently.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::platform::{AudioSink, SoundEvent};

/// Output gain for every cue
const VOLUME: f32 = 0.8;

/// Web Audio backed sound sink
pub struct AudioManager {
    ctx: Option<AudioContext>,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            muted: false,
        }
    }

    /// Resume the context (call from a user gesture handler)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Bright two-step chirp
    fn play_pickup(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 660.0, OscillatorType::Triangle) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.4, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.18)
            .ok();
        osc.frequency().set_value_at_time(660.0, t).ok();
        osc.frequency().set_value_at_time(990.0, t + 0.06).ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.2).ok();
    }

    /// Falling thud
    fn play_fail(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 220.0, OscillatorType::Sine) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.6, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.35)
            .ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(55.0, t + 0.3)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.4).ok();
    }

    /// Short filtered-sounding sweep for lane changes
    fn play_woosh(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 120.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(0.001, t).ok();
        gain.gain()
            .linear_ramp_to_value_at_time(vol * 0.12, t + 0.04)
            .ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.001, t + 0.15)
            .ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(480.0, t + 0.12)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.16).ok();
    }
}

impl AudioSink for AudioManager {
    fn play(&mut self, sound: SoundEvent) {
        if self.muted {
            return;
        }
        let Some(ctx) = &self.ctx else { return };
        if ctx.state() != web_sys::AudioContextState::Running {
            return;
        }

        match sound {
            SoundEvent::Pickup => self.play_pickup(ctx, VOLUME),
            SoundEvent::Fail => self.play_fail(ctx, VOLUME),
            SoundEvent::Woosh => self.play_woosh(ctx, VOLUME),
        }
    }
}
