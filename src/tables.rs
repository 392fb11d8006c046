//! Tunable gameplay parameter tables
//!
//! The core is format-agnostic: records arrive already deserialized. The
//! JSON-backed `StaticTables` store mirrors how the shipped data files are
//! keyed - one row per (mode, level) - and is loaded once, then shared
//! read-only.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::services::DataAccess;

/// Game mode selector, part of every table key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Fixed wave, time-bonus scored
    Normal,
    /// Wave after wave with an escalating generation level
    Endless,
}

/// One wave's worth of enemy generation tuning. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyGenerateParams {
    pub mode: GameMode,
    pub level: u32,

    /// Number of enemies in the wave
    pub generate_count: u32,

    /// Angular step range between successive spawns (degrees, random walk)
    pub min_appear_degree: f32,
    pub max_appear_degree: f32,

    pub min_scale: f32,
    pub max_scale: f32,

    pub min_speed: f32,
    pub max_speed: f32,
    /// Per-index speed multiplier increment: enemy i moves at
    /// `uniform(min,max) * (1 + i * add_speed)`
    pub add_speed: f32,

    pub min_shake_width_x: f32,
    pub max_shake_width_x: f32,
    pub min_shake_width_y: f32,
    pub max_shake_width_y: f32,
    /// Every Nth enemy also shakes vertically
    pub shake_width_y_count: u32,

    pub min_wait_time: f32,
    pub max_wait_time: f32,
    /// Divisor staggering release: enemy i waits
    /// `i / appear_each_count * uniform(min_wait, max_wait)` extra seconds
    pub appear_each_count: u32,
}

/// Base score per hit quality
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreTable {
    pub good_score: f32,
    pub great_score: f32,
    pub perfect_score: f32,
}

/// Time-bonus curve parameters for one (mode, level)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeBonus {
    pub mode: GameMode,
    pub level: u32,
    /// At or past this many seconds the multiplier is x1.0
    pub standard_time: f32,
    /// At this many seconds the multiplier is 1.0 + bonus_add_scale
    pub bonus_time: f32,
    /// Scale added at bonus_time
    pub bonus_add_scale: f32,
}

/// Top-level document shape for the bundled JSON tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TablesDoc {
    pub generate_infos: Vec<EnemyGenerateParams>,
    pub enemy_score: ScoreTable,
    pub time_bonus_infos: Vec<TimeBonus>,
}

/// In-memory table store keyed by (mode, level)
pub struct StaticTables {
    generate: HashMap<(GameMode, u32), EnemyGenerateParams>,
    score: ScoreTable,
    time_bonus: HashMap<(GameMode, u32), TimeBonus>,
}

impl StaticTables {
    pub fn from_doc(doc: TablesDoc) -> Self {
        let generate = doc
            .generate_infos
            .into_iter()
            .map(|info| ((info.mode, info.level), info))
            .collect();
        let time_bonus = doc
            .time_bonus_infos
            .into_iter()
            .map(|info| ((info.mode, info.level), info))
            .collect();
        Self {
            generate,
            score: doc.enemy_score,
            time_bonus,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::from_doc(serde_json::from_str(json)?))
    }

    /// Built-in table set used by the demo binary and integration tests.
    pub fn demo() -> Self {
        Self::from_json(DEMO_TABLES_JSON).expect("built-in tables parse")
    }
}

impl DataAccess for StaticTables {
    fn enemy_generate_params(&self, mode: GameMode, level: u32) -> Option<EnemyGenerateParams> {
        let params = self.generate.get(&(mode, level)).cloned();
        if params.is_none() {
            log::debug!("no enemy generation parameters for {mode:?} level {level}");
        }
        params
    }

    fn score_table(&self) -> ScoreTable {
        self.score
    }

    fn time_bonus(&self, mode: GameMode, level: u32) -> Option<TimeBonus> {
        self.time_bonus.get(&(mode, level)).copied()
    }
}

/// Three normal levels and two endless levels - enough to exercise every
/// code path (including the endless overflow fallback) without data files.
pub const DEMO_TABLES_JSON: &str = r#"{
  "generate_infos": [
    {
      "mode": "normal", "level": 1, "generate_count": 10,
      "min_appear_degree": -60.0, "max_appear_degree": 60.0,
      "min_scale": 1.0, "max_scale": 2.0,
      "min_speed": 15.0, "max_speed": 25.0, "add_speed": 0.05,
      "min_shake_width_x": 0.0, "max_shake_width_x": 3.0,
      "min_shake_width_y": 1.0, "max_shake_width_y": 3.0,
      "shake_width_y_count": 4,
      "min_wait_time": 1.0, "max_wait_time": 2.0, "appear_each_count": 3
    },
    {
      "mode": "normal", "level": 2, "generate_count": 16,
      "min_appear_degree": -80.0, "max_appear_degree": 80.0,
      "min_scale": 0.8, "max_scale": 2.0,
      "min_speed": 20.0, "max_speed": 32.0, "add_speed": 0.06,
      "min_shake_width_x": 1.0, "max_shake_width_x": 4.0,
      "min_shake_width_y": 1.0, "max_shake_width_y": 4.0,
      "shake_width_y_count": 3,
      "min_wait_time": 0.8, "max_wait_time": 1.8, "appear_each_count": 4
    },
    {
      "mode": "normal", "level": 3, "generate_count": 24,
      "min_appear_degree": -90.0, "max_appear_degree": 90.0,
      "min_scale": 0.7, "max_scale": 2.2,
      "min_speed": 26.0, "max_speed": 40.0, "add_speed": 0.07,
      "min_shake_width_x": 1.0, "max_shake_width_x": 5.0,
      "min_shake_width_y": 2.0, "max_shake_width_y": 5.0,
      "shake_width_y_count": 3,
      "min_wait_time": 0.5, "max_wait_time": 1.5, "appear_each_count": 5
    },
    {
      "mode": "endless", "level": 1, "generate_count": 8,
      "min_appear_degree": -60.0, "max_appear_degree": 60.0,
      "min_scale": 1.0, "max_scale": 2.0,
      "min_speed": 15.0, "max_speed": 25.0, "add_speed": 0.05,
      "min_shake_width_x": 0.0, "max_shake_width_x": 3.0,
      "min_shake_width_y": 1.0, "max_shake_width_y": 3.0,
      "shake_width_y_count": 4,
      "min_wait_time": 1.0, "max_wait_time": 2.0, "appear_each_count": 3
    },
    {
      "mode": "endless", "level": 2, "generate_count": 12,
      "min_appear_degree": -80.0, "max_appear_degree": 80.0,
      "min_scale": 0.8, "max_scale": 2.0,
      "min_speed": 22.0, "max_speed": 34.0, "add_speed": 0.06,
      "min_shake_width_x": 1.0, "max_shake_width_x": 4.0,
      "min_shake_width_y": 1.0, "max_shake_width_y": 4.0,
      "shake_width_y_count": 3,
      "min_wait_time": 0.8, "max_wait_time": 1.6, "appear_each_count": 4
    }
  ],
  "enemy_score": { "good_score": 100.0, "great_score": 300.0, "perfect_score": 500.0 },
  "time_bonus_infos": [
    { "mode": "normal", "level": 1, "standard_time": 30.0, "bonus_time": 25.0, "bonus_add_scale": 1.0 },
    { "mode": "normal", "level": 2, "standard_time": 45.0, "bonus_time": 38.0, "bonus_add_scale": 1.0 },
    { "mode": "normal", "level": 3, "standard_time": 60.0, "bonus_time": 50.0, "bonus_add_scale": 1.2 }
  ]
}"#;
