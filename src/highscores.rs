//! High score storage
//!
//! Normal mode keeps one best score per level; endless mode keeps a top-10
//! leaderboard. Both persist as JSON through the injected key/value store.

use serde::{Deserialize, Serialize};

use crate::services::KeyValueStore;

/// Maximum number of endless-mode leaderboard entries
pub const MAX_LEADERBOARD_ENTRIES: usize = 10;

fn normal_mode_key(level: u32) -> String {
    format!("crab_strike_best_normal_{level}")
}

const ENDLESS_STORAGE_KEY: &str = "crab_strike_endless_leaderboard";

/// Best normal-mode score for a level (0.0 if none recorded)
pub fn normal_mode_best(store: &dyn KeyValueStore, level: u32) -> f32 {
    store
        .get(&normal_mode_key(level))
        .and_then(|v| v.parse().ok())
        .unwrap_or(0.0)
}

/// Record a normal-mode score; returns true when it is a new best.
pub fn set_normal_mode_best(store: &dyn KeyValueStore, level: u32, score: f32) -> bool {
    if score > normal_mode_best(store, level) {
        store.set(&normal_mode_key(level), &score.to_string());
        true
    } else {
        false
    }
}

/// A single endless-mode leaderboard entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Final score
    pub score: f32,
    /// Enemies destroyed
    pub break_count: u32,
}

/// Endless-mode leaderboard, sorted descending by score
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EndlessLeaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl EndlessLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: f32) -> bool {
        if score <= 0.0 {
            return false;
        }
        if self.entries.len() < MAX_LEADERBOARD_ENTRIES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Add a score if it qualifies. Returns the rank achieved (1-indexed).
    pub fn add_score(&mut self, score: f32, break_count: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = LeaderboardEntry { score, break_count };
        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };
        self.entries.truncate(MAX_LEADERBOARD_ENTRIES);
        Some(rank)
    }

    pub fn top_score(&self) -> Option<f32> {
        self.entries.first().map(|e| e.score)
    }

    pub fn load(store: &dyn KeyValueStore) -> Self {
        if let Some(json) = store.get(ENDLESS_STORAGE_KEY) {
            if let Ok(board) = serde_json::from_str::<EndlessLeaderboard>(&json) {
                log::info!("loaded {} leaderboard entries", board.entries.len());
                return board;
            }
            log::warn!("leaderboard data unreadable, starting fresh");
        }
        Self::new()
    }

    pub fn save(&self, store: &dyn KeyValueStore) {
        if let Ok(json) = serde_json::to_string(self) {
            store.set(ENDLESS_STORAGE_KEY, &json);
            log::info!("leaderboard saved ({} entries)", self.entries.len());
        }
    }
}
