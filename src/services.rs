//! Collaborator interfaces consumed by the core
//!
//! Rendering, audio playback, and persisted storage live outside this crate;
//! the simulation talks to them through these traits, injected at session
//! construction. All calls are fire-and-forget: nothing here blocks a tick
//! or reports completion back into the simulation.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::tables::{EnemyGenerateParams, GameMode, ScoreTable, TimeBonus};

/// Read-only access to the tuned parameter tables
pub trait DataAccess {
    fn enemy_generate_params(&self, mode: GameMode, level: u32) -> Option<EnemyGenerateParams>;
    fn score_table(&self) -> ScoreTable;
    fn time_bonus(&self, mode: GameMode, level: u32) -> Option<TimeBonus>;
}

/// Sound cue names the core emits
pub mod sfx {
    pub const BGM_BATTLE: &str = "bgm_battle";
    pub const SHOT: &str = "se_shot";
    pub const BEAM: &str = "se_beam";
    pub const BOMB: &str = "se_bomb";
    pub const BOMB_BIG: &str = "se_bomb_big";
    pub const LUCKY: &str = "se_lucky";
    pub const GAME_OVER: &str = "se_game_over";
}

/// Fire-and-forget audio commands
pub trait AudioService {
    fn play_bgm(&self, name: &str);
    fn stop_bgm(&self);
    fn play_se(&self, name: &str);
    /// Pitch applied to subsequently played sound effects (slow motion)
    fn set_se_pitch(&self, pitch: f32);
}

/// Audio sink that only logs. Used by the headless demo and tests.
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioService for NullAudio {
    fn play_bgm(&self, name: &str) {
        log::debug!("audio: bgm {name}");
    }
    fn stop_bgm(&self) {
        log::debug!("audio: bgm stop");
    }
    fn play_se(&self, name: &str) {
        log::debug!("audio: se {name}");
    }
    fn set_se_pitch(&self, pitch: f32) {
        log::debug!("audio: se pitch {pitch}");
    }
}

// Shared handles stay usable as services; every method takes &self.
impl<T: AudioService + ?Sized> AudioService for std::rc::Rc<T> {
    fn play_bgm(&self, name: &str) {
        (**self).play_bgm(name);
    }
    fn stop_bgm(&self) {
        (**self).stop_bgm();
    }
    fn play_se(&self, name: &str) {
        (**self).play_se(name);
    }
    fn set_se_pitch(&self, pitch: f32) {
        (**self).set_se_pitch(pitch);
    }
}

/// Simple persisted key/value storage (high scores, settings)
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// In-memory store. Backs tests and the demo binary; a real frontend plugs
/// in platform storage instead.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values.borrow_mut().insert(key.into(), value.into());
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::rc::Rc<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value);
    }
}

/// Audio sink that records every command, for asserting on side effects.
#[derive(Debug, Default)]
pub struct RecordingAudio {
    pub events: RefCell<Vec<String>>,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, event: &str) -> bool {
        self.events.borrow().iter().any(|e| e == event)
    }
}

impl AudioService for RecordingAudio {
    fn play_bgm(&self, name: &str) {
        self.events.borrow_mut().push(format!("bgm:{name}"));
    }
    fn stop_bgm(&self) {
        self.events.borrow_mut().push("bgm:stop".into());
    }
    fn play_se(&self, name: &str) {
        self.events.borrow_mut().push(format!("se:{name}"));
    }
    fn set_se_pitch(&self, pitch: f32) {
        self.events.borrow_mut().push(format!("pitch:{pitch}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.get("missing").is_none());
        store.set("k", "v1");
        store.set("k", "v2");
        assert_eq!(store.get("k").as_deref(), Some("v2"));
    }

    #[test]
    fn test_recording_audio_captures_order() {
        let audio = RecordingAudio::new();
        audio.play_bgm(sfx::BGM_BATTLE);
        audio.play_se(sfx::SHOT);
        audio.set_se_pitch(0.45);
        let events = audio.events.borrow();
        assert_eq!(
            events.as_slice(),
            ["bgm:bgm_battle", "se:se_shot", "pitch:0.45"]
        );
    }
}
