//! Best score and aggregate statistics
//!
//! Persisted to LocalStorage as a single JSON record:
//! `{highScore, totalGames, totalPlaytime, averageScore, lastPlayed}`.
//! Updated only when a session ends. Each field is read on its own: a
//! missing, null or malformed value becomes its default without discarding
//! the rest of the record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::persistence::{self, KeyValueStore};

/// Persisted game statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameStats {
    #[serde(deserialize_with = "lenient_count")]
    pub high_score: u64,
    #[serde(deserialize_with = "lenient_count")]
    pub total_games: u64,
    /// Seconds across all recorded sessions
    #[serde(deserialize_with = "lenient_count")]
    pub total_playtime: u64,
    /// Rounded mean score over `total_games`
    #[serde(deserialize_with = "lenient_count")]
    pub average_score: u64,
    /// ISO-8601 on disk
    #[serde(deserialize_with = "lenient_timestamp")]
    pub last_played: DateTime<Utc>,
}

/// Non-negative number, rounded; anything else reads as 0
fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value.as_f64() {
        Some(n) if n.is_finite() && n > 0.0 => n.round() as u64,
        _ => 0,
    })
}

/// RFC 3339 timestamp; anything else reads as the epoch
fn lenient_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH))
}

impl Default for GameStats {
    fn default() -> Self {
        Self {
            high_score: 0,
            total_games: 0,
            total_playtime: 0,
            average_score: 0,
            last_played: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

impl GameStats {
    /// Fold one finished session into the aggregates
    pub fn record(&mut self, score: u64, playtime_secs: u64, now: DateTime<Utc>) {
        let total_games = self.total_games + 1;
        let sum = self.average_score as f64 * self.total_games as f64 + score as f64;

        self.average_score = (sum / total_games as f64).round() as u64;
        self.total_games = total_games;
        self.total_playtime += playtime_secs;
        self.high_score = self.high_score.max(score);
        self.last_played = now;
    }
}

/// Stats record bound to a store
#[derive(Debug, Clone)]
pub struct StatsStore<S> {
    store: S,
}

impl<S: KeyValueStore> StatsStore<S> {
    /// LocalStorage key
    pub const STORAGE_KEY: &'static str = "fetchFeast_gameStats";

    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Current stats; all-zero defaults if missing, corrupt or unreadable
    pub fn load(&self) -> GameStats {
        persistence::load_or_default(&self.store, Self::STORAGE_KEY)
    }

    fn save(&self, stats: &GameStats) {
        if persistence::save_json(&self.store, Self::STORAGE_KEY, stats) {
            log::info!(
                "Stats saved (high score {}, {} games)",
                stats.high_score,
                stats.total_games
            );
        }
    }

    /// Store `score` as the new best if it beats the old one.
    /// Returns whether it was a new record.
    pub fn update_high_score(&mut self, score: u64, now: DateTime<Utc>) -> bool {
        let mut stats = self.load();
        let is_new_record = score > stats.high_score;
        if is_new_record {
            stats.high_score = score;
            stats.last_played = now;
            self.save(&stats);
            log::info!("New high score: {}", score);
        }
        is_new_record
    }

    /// Record a completed session
    pub fn record_session(&mut self, score: u64, playtime_secs: u64, now: DateTime<Utc>) -> GameStats {
        let mut stats = self.load();
        stats.record(score, playtime_secs, now);
        self.save(&stats);
        stats
    }

    pub fn high_score(&self) -> u64 {
        self.load().high_score
    }

    pub fn is_new_record(&self, score: u64) -> bool {
        score > self.high_score()
    }

    /// Forget all statistics
    pub fn reset(&mut self) {
        if let Err(e) = self.store.remove(Self::STORAGE_KEY) {
            log::warn!("Failed to reset game stats: {}", e);
        }
    }
}

/// Human-readable playtime: "1h 5m", "3m 20s" or "42s"
pub fn format_playtime(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}
