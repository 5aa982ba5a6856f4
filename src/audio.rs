//! Sound effects with a bounded voice pool
//!
//! Procedurally generated sounds (Web Audio oscillators on wasm32) - no
//! external files needed. Playback is fire-and-forget: every failure mode
//! (no audio, muted, backend error, pool full) quietly does nothing.

use crate::persistence::KeyValueStore;
use crate::settings::Settings;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundKind {
    /// Object tapped in time
    Success,
    /// Timeout or misclick
    Miss,
}

impl SoundKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundKind::Success => "success",
            SoundKind::Miss => "miss",
        }
    }
}

/// Platform audio output
pub trait AudioBackend {
    /// Handle for one playing voice
    type Voice;

    /// Make sure output is usable (create/resume the context as needed).
    /// Returns false when audio is unavailable.
    fn ensure_running(&mut self) -> bool;

    /// Audio clock in seconds
    fn now(&self) -> f64;

    /// Start a voice. Returns the handle and its length in seconds.
    fn start(&mut self, kind: SoundKind, volume: f32) -> Option<(Self::Voice, f64)>;

    /// Cut a voice short
    fn stop(&mut self, voice: &Self::Voice);
}

/// Backend for hosts without audio
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudio;

impl AudioBackend for NullAudio {
    type Voice = ();

    fn ensure_running(&mut self) -> bool {
        false
    }

    fn now(&self) -> f64 {
        0.0
    }

    fn start(&mut self, _kind: SoundKind, _volume: f32) -> Option<((), f64)> {
        None
    }

    fn stop(&mut self, _voice: &()) {}
}

struct ActiveVoice<V> {
    kind: SoundKind,
    ends_at: f64,
    voice: V,
}

/// Bounded pool of sound voices
pub struct SoundPool<B: AudioBackend, S: KeyValueStore> {
    backend: B,
    store: S,
    /// Oldest first
    voices: Vec<ActiveVoice<B::Voice>>,
    max_voices: usize,
    volume: f32,
    muted: bool,
}

impl<B: AudioBackend, S: KeyValueStore> SoundPool<B, S> {
    /// Storage key for the mute flag ("true"/"false")
    pub const MUTE_KEY: &'static str = "soundMuted";

    pub fn new(backend: B, store: S, settings: &Settings) -> Self {
        let muted = match store.get(Self::MUTE_KEY) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                log::warn!("Could not read sound preference: {}", e);
                false
            }
        };
        Self {
            backend,
            store,
            voices: Vec::with_capacity(settings.max_voices),
            max_voices: settings.max_voices.max(1),
            volume: settings.sfx_volume.clamp(0.0, 1.0),
            muted,
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, kind: SoundKind) {
        if self.muted || self.volume <= 0.0 {
            return;
        }
        if !self.backend.ensure_running() {
            return;
        }

        self.prune_finished();

        if self.voices.len() >= self.max_voices {
            // Full: steal the oldest voice of the same kind, or give up
            match self.voices.iter().position(|v| v.kind == kind) {
                Some(idx) => {
                    let old = self.voices.remove(idx);
                    self.backend.stop(&old.voice);
                }
                None => {
                    log::debug!("Voice pool full, dropping {} sound", kind.as_str());
                    return;
                }
            }
        }

        let now = self.backend.now();
        if let Some((voice, duration)) = self.backend.start(kind, self.volume) {
            self.voices.push(ActiveVoice {
                kind,
                ends_at: now + duration,
                voice,
            });
        }
    }

    /// Forget voices that have already finished on their own
    fn prune_finished(&mut self) {
        let now = self.backend.now();
        self.voices.retain(|v| v.ends_at > now);
    }

    /// Stop every voice of one kind
    pub fn stop_kind(&mut self, kind: SoundKind) {
        let backend = &mut self.backend;
        self.voices.retain(|v| {
            if v.kind == kind {
                backend.stop(&v.voice);
                false
            } else {
                true
            }
        });
    }

    pub fn stop_all(&mut self) {
        for v in self.voices.drain(..) {
            self.backend.stop(&v.voice);
        }
    }

    /// Unlock audio after a user gesture (browsers block it before one)
    pub fn unlock(&mut self) -> bool {
        self.backend.ensure_running()
    }

    /// Flip mute; returns the new state
    pub fn toggle_mute(&mut self) -> bool {
        self.set_muted(!self.muted);
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted {
            self.stop_all();
        }
        if let Err(e) = self
            .store
            .set(Self::MUTE_KEY, if muted { "true" } else { "false" })
        {
            log::warn!("Could not save sound preference: {}", e);
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Voices still considered playing
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebAudio;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, AudioContextState, GainNode, OscillatorNode, OscillatorType};

    use super::{AudioBackend, SoundKind};

    /// Web Audio backend. The context is created lazily (it needs a user
    /// gesture) and recreated if the browser closes it.
    #[derive(Default)]
    pub struct WebAudio {
        ctx: Option<AudioContext>,
    }

    impl WebAudio {
        pub fn new() -> Self {
            Self { ctx: None }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
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

        /// Success - bright rising chime
        fn play_success(ctx: &AudioContext, vol: f32) -> (Vec<OscillatorNode>, f64) {
            let mut oscs = Vec::new();
            for (i, freq) in [660.0, 880.0, 1320.0].iter().enumerate() {
                let delay = i as f64 * 0.08;
                if let Some((osc, gain)) = Self::create_osc(ctx, *freq, OscillatorType::Triangle) {
                    let t = ctx.current_time() + delay;
                    gain.gain().set_value_at_time(vol * 0.3, t).ok();
                    gain.gain()
                        .exponential_ramp_to_value_at_time(0.01, t + 0.2)
                        .ok();
                    osc.start_with_when(t).ok();
                    osc.stop_with_when(t + 0.25).ok();
                    oscs.push(osc);
                }
            }
            (oscs, 0.41)
        }

        /// Miss - sad descending buzz
        fn play_miss(ctx: &AudioContext, vol: f32) -> (Vec<OscillatorNode>, f64) {
            let mut oscs = Vec::new();
            let t = ctx.current_time();

            if let Some((osc, gain)) = Self::create_osc(ctx, 300.0, OscillatorType::Sawtooth) {
                gain.gain().set_value_at_time(vol * 0.25, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.35)
                    .ok();
                osc.frequency().set_value_at_time(300.0, t).ok();
                osc.frequency()
                    .exponential_ramp_to_value_at_time(90.0, t + 0.35)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.4).ok();
                oscs.push(osc);
            }

            // Low thud underneath
            if let Some((osc, gain)) = Self::create_osc(ctx, 80.0, OscillatorType::Sine) {
                gain.gain().set_value_at_time(vol * 0.35, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.2)
                    .ok();
                osc.start().ok();
                osc.stop_with_when(t + 0.25).ok();
                oscs.push(osc);
            }
            (oscs, 0.4)
        }
    }

    impl AudioBackend for WebAudio {
        type Voice = Vec<OscillatorNode>;

        fn ensure_running(&mut self) -> bool {
            let closed = self
                .ctx
                .as_ref()
                .map(|ctx| ctx.state() == AudioContextState::Closed)
                .unwrap_or(true);
            if closed {
                self.ctx = AudioContext::new().ok();
                if self.ctx.is_none() {
                    log::warn!("Failed to create AudioContext - audio disabled");
                    return false;
                }
            }

            let Some(ctx) = &self.ctx else { return false };
            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == AudioContextState::Suspended {
                let _ = ctx.resume();
            }
            ctx.state() != AudioContextState::Closed
        }

        fn now(&self) -> f64 {
            self.ctx.as_ref().map(|ctx| ctx.current_time()).unwrap_or(0.0)
        }

        fn start(&mut self, kind: SoundKind, volume: f32) -> Option<(Self::Voice, f64)> {
            let ctx = self.ctx.as_ref()?;
            let (oscs, duration) = match kind {
                SoundKind::Success => Self::play_success(ctx, volume),
                SoundKind::Miss => Self::play_miss(ctx, volume),
            };
            if oscs.is_empty() {
                log::debug!("Could not build {} sound", kind.as_str());
                return None;
            }
            Some((oscs, duration))
        }

        fn stop(&mut self, voice: &Self::Voice) {
            for osc in voice {
                // Already-stopped nodes throw; nothing to do about it
                let _ = osc.stop();
            }
        }
    }
}
