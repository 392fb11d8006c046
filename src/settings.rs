//! Player preferences
//!
//! Persisted separately from high scores through the key/value store. The
//! core never reads these itself - the frontend applies them to the audio
//! service it injects.

use serde::{Deserialize, Serialize};

use crate::services::KeyValueStore;

const STORAGE_KEY: &str = "crab_strike_settings";

/// Audio preferences
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Background music volume (0.0 - 1.0)
    pub bgm_volume: f32,
    /// Sound effect volume (0.0 - 1.0)
    pub se_volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bgm_volume: 0.7,
            se_volume: 1.0,
        }
    }
}

impl Settings {
    pub fn set_bgm_volume(&mut self, volume: f32) {
        self.bgm_volume = volume.clamp(0.0, 1.0);
    }

    pub fn set_se_volume(&mut self, volume: f32) {
        self.se_volume = volume.clamp(0.0, 1.0);
    }

    pub fn load(store: &dyn KeyValueStore) -> Self {
        if let Some(json) = store.get(STORAGE_KEY) {
            if let Ok(settings) = serde_json::from_str(&json) {
                log::info!("loaded settings");
                return settings;
            }
        }
        log::info!("using default settings");
        Self::default()
    }

    pub fn save(&self, store: &dyn KeyValueStore) {
        if let Ok(json) = serde_json::to_string(self) {
            store.set(STORAGE_KEY, &json);
        }
    }
}
