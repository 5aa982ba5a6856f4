//! Game settings and tuning
//!
//! Persisted separately from stats in LocalStorage. Missing fields take
//! their defaults so older saves keep loading.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::persistence::{self, KeyValueStore};

/// Tunable game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Object ===
    /// Object footprint (px, never below MIN_OBJECT_SIZE)
    pub object_size: f32,

    // === Movement ===
    /// Leg progress per millisecond
    pub movement_speed: f32,
    /// Distance at which a leg counts as arrived (px)
    pub arrival_distance: f32,
    /// Frames between throttled position publications
    pub observe_every_frames: u32,

    // === Timing ===
    pub response_timeout_ms: u32,
    pub celebration_ms: u32,
    pub respawn_delay_ms: u32,
    pub fail_effect_ms: u32,

    // === Session ===
    pub initial_lives: u8,

    // === Audio ===
    /// Concurrent sound voices
    pub max_voices: usize,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            object_size: OBJECT_SIZE,

            movement_speed: MOVEMENT_SPEED,
            arrival_distance: ARRIVAL_DISTANCE,
            observe_every_frames: OBSERVE_EVERY_FRAMES,

            response_timeout_ms: RESPONSE_TIMEOUT_MS,
            celebration_ms: CELEBRATION_MS,
            respawn_delay_ms: RESPAWN_DELAY_MS,
            fail_effect_ms: FAIL_EFFECT_MS,

            initial_lives: INITIAL_LIVES,

            max_voices: MAX_VOICES,
            sfx_volume: 1.0,
        }
    }
}

impl Settings {
    /// LocalStorage key
    pub const STORAGE_KEY: &'static str = "fetchFeast_settings";

    /// Pull out-of-range values back into something playable
    pub fn sanitized(mut self) -> Self {
        if !(self.object_size >= MIN_OBJECT_SIZE) {
            self.object_size = MIN_OBJECT_SIZE;
        }
        if !(self.movement_speed > 0.0) {
            self.movement_speed = MOVEMENT_SPEED;
        }
        self.observe_every_frames = self.observe_every_frames.max(1);
        self.initial_lives = self.initial_lives.max(1);
        self.max_voices = self.max_voices.max(1);
        self.sfx_volume = if self.sfx_volume.is_finite() {
            self.sfx_volume.clamp(0.0, 1.0)
        } else {
            1.0
        };
        self
    }

    /// Load settings, defaults on missing/corrupt data
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let settings: Self = persistence::load_or_default(store, Self::STORAGE_KEY);
        log::info!("Settings loaded");
        settings.sanitized()
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &S) {
        if persistence::save_json(store, Self::STORAGE_KEY, self) {
            log::info!("Settings saved");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_defaults_match_consts() {
        let s = Settings::default();
        assert_eq!(s.object_size, 220.0);
        assert_eq!(s.response_timeout_ms, 5000);
        assert_eq!(s.initial_lives, 5);
        assert_eq!(s.max_voices, 4);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let store = MemoryStore::new();
        store
            .set(Settings::STORAGE_KEY, r#"{"response_timeout_ms": 3000}"#)
            .unwrap();
        let s = Settings::load(&store);
        assert_eq!(s.response_timeout_ms, 3000);
        assert_eq!(s.object_size, OBJECT_SIZE);
    }

    #[test]
    fn test_sanitize_clamps() {
        let s = Settings {
            object_size: 10.0,
            movement_speed: -1.0,
            initial_lives: 0,
            max_voices: 0,
            sfx_volume: 3.0,
            ..Settings::default()
        }
        .sanitized();
        assert_eq!(s.object_size, MIN_OBJECT_SIZE);
        assert_eq!(s.movement_speed, MOVEMENT_SPEED);
        assert_eq!(s.initial_lives, 1);
        assert_eq!(s.max_voices, 1);
        assert_eq!(s.sfx_volume, 1.0);
    }

    #[test]
    fn test_save_then_load() {
        let store = MemoryStore::new();
        let s = Settings {
            celebration_ms: 1500,
            ..Settings::default()
        };
        s.save(&store);
        assert_eq!(Settings::load(&store), s);
    }
}
