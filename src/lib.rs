//! Fetch & Feast - tap the treat before it gets away
//!
//! Core modules:
//! - `sim`: Pure game logic (spawning, movement, animation, session, timers)
//! - `game`: Session controller tying the simulation to sound and storage
//! - `audio`: Bounded-voice sound effects (Web Audio on wasm32)
//! - `persistence`: Key-value storage (LocalStorage on web)
//! - `highscores`: Persisted best score and aggregate statistics
//! - `settings`: Tunable game configuration

pub mod audio;
pub mod game;
pub mod highscores;
pub mod persistence;
pub mod settings;
pub mod sim;

pub use game::{GameController, GameEvent};
pub use glam;
pub use highscores::{GameStats, StatsStore};
pub use settings::Settings;

use glam::Vec2;

/// Container-local pixel coordinates
pub type Position = Vec2;

/// Game configuration constants
pub mod consts {
    /// Distance kept free from every container edge when spawning (px)
    pub const SAFE_MARGIN: f32 = 20.0;

    /// Object footprint
    pub const MIN_OBJECT_SIZE: f32 = 120.0;
    pub const OBJECT_SIZE: f32 = 220.0;
    /// Number of object sprites cycled through on each spawn
    pub const OBJECT_VARIANTS: u8 = 5;

    /// Leg progress per millisecond (~4 s per full leg)
    pub const MOVEMENT_SPEED: f32 = 0.00025;
    /// A leg ends once the object is this close to its target (px)
    pub const ARRIVAL_DISTANCE: f32 = 20.0;
    /// Lateral amplitude of the zigzag pattern (px)
    pub const ZIGZAG_AMPLITUDE: f32 = 30.0;
    /// Frames between throttled position publications
    pub const OBSERVE_EVERY_FRAMES: u32 = 30;

    /// Time the player has to tap a spawned object
    pub const RESPONSE_TIMEOUT_MS: u32 = 5000;
    /// Celebration effect length after a hit
    pub const CELEBRATION_MS: u32 = 2000;
    /// Gap between the celebration ending and the next spawn
    pub const RESPAWN_DELAY_MS: u32 = 150;
    /// How long the fail effect stays on screen
    pub const FAIL_EFFECT_MS: u32 = 1000;

    pub const INITIAL_LIVES: u8 = 5;

    /// Concurrent sound voices
    pub const MAX_VOICES: usize = 4;
}

/// Axis-aligned rectangle in container space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    /// Square of side `size` centered on `center`
    pub fn centered(center: Vec2, size: f32) -> Self {
        let half = size / 2.0;
        Self {
            left: center.x - half,
            top: center.y - half,
            right: center.x + half,
            bottom: center.y + half,
        }
    }
}

/// Whether a tap at (x, y) lands on the object's rectangle (edges inclusive)
#[inline]
pub fn is_successful_interaction(rect: &Rect, x: f32, y: f32) -> bool {
    x >= rect.left && x <= rect.right && y >= rect.top && y <= rect.bottom
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interaction_inside_and_on_edges() {
        let rect = Rect::centered(Vec2::new(100.0, 100.0), 50.0);
        assert!(is_successful_interaction(&rect, 100.0, 100.0));
        assert!(is_successful_interaction(&rect, 75.0, 125.0));
        assert!(!is_successful_interaction(&rect, 74.9, 100.0));
        assert!(!is_successful_interaction(&rect, 100.0, 126.0));
    }
}
