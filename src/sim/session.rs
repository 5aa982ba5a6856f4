//! Score and lives for one play session

use serde::{Deserialize, Serialize};

use crate::consts::INITIAL_LIVES;

/// Score/lives state. `is_game_over` is true exactly when lives hit zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub score: u32,
    pub lives: u8,
    pub is_playing: bool,
    pub is_game_over: bool,
    #[serde(skip, default = "default_lives")]
    initial_lives: u8,
}

fn default_lives() -> u8 {
    INITIAL_LIVES
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(INITIAL_LIVES)
    }
}

impl SessionState {
    /// Fresh, not yet playing
    pub fn new(initial_lives: u8) -> Self {
        Self {
            score: 0,
            lives: initial_lives,
            is_playing: false,
            is_game_over: false,
            initial_lives,
        }
    }

    /// Start (or restart) a session with full lives
    pub fn start(&mut self) {
        *self = Self {
            is_playing: true,
            ..Self::new(self.initial_lives)
        };
    }

    pub fn on_success(&mut self) {
        self.score += 1;
    }

    /// Lose a life. Returns true if this miss ended the session.
    pub fn on_miss(&mut self) -> bool {
        let was_over = self.is_game_over;
        self.lives = self.lives.saturating_sub(1);
        if self.lives == 0 {
            self.is_game_over = true;
            self.is_playing = false;
        }
        self.is_game_over && !was_over
    }

    /// Leave the session without ending it
    pub fn quit(&mut self) {
        self.is_playing = false;
    }

    pub fn initial_lives(&self) -> u8 {
        self.initial_lives
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let mut session = SessionState::default();
        session.start();
        assert_eq!(session.score, 0);
        assert_eq!(session.lives, 5);
        assert!(session.is_playing);
        assert!(!session.is_game_over);
    }

    #[test]
    fn test_fifth_miss_ends_game() {
        let mut session = SessionState::default();
        session.start();
        for i in 1..=4 {
            assert!(!session.on_miss());
            assert_eq!(session.lives, 5 - i);
            assert!(!session.is_game_over);
            assert!(session.is_playing);
        }
        assert!(session.on_miss());
        assert_eq!(session.lives, 0);
        assert!(session.is_game_over);
        assert!(!session.is_playing);

        // Already over: stays at zero, doesn't report a second ending
        assert!(!session.on_miss());
        assert_eq!(session.lives, 0);
    }

    #[test]
    fn test_restart_clears_score_and_lives() {
        let mut session = SessionState::new(3);
        session.start();
        session.on_success();
        session.on_success();
        session.on_miss();
        assert_eq!(session.score, 2);

        session.start();
        assert_eq!(session.score, 0);
        assert_eq!(session.lives, 3);
        assert!(session.is_playing);
    }

    #[test]
    fn test_quit_keeps_score() {
        let mut session = SessionState::default();
        session.start();
        session.on_success();
        session.quit();
        assert!(!session.is_playing);
        assert!(!session.is_game_over);
        assert_eq!(session.score, 1);
    }
}
