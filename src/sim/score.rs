//! Score accumulation and the clear-time bonus curve
//!
//! The board tallies hits and tracks wave bookkeeping during play; the time
//! multiplier only enters at finalization. Every counter saturates so a
//! marathon endless run cannot overflow the display.

use crate::sim::judge::HitQuality;
use crate::tables::{ScoreTable, TimeBonus};

/// Displayed score saturates here
pub const MAX_SCORE: f32 = 999_999.0;
/// Per-quality hit counters saturate here
pub const MAX_BREAK_COUNT: u32 = 999;

/// Clear-time score multiplier.
///
/// At or past `standard_time` the multiplier is flat 1.0. Between
/// `bonus_time` and `standard_time` it climbs linearly (on whole seconds)
/// from 1.0 to `1.0 + bonus_add_scale`. Faster than `bonus_time`, every
/// tenth of a second shaved adds another 0.02.
pub fn time_scale(bonus: &TimeBonus, elapsed: f32) -> f32 {
    if elapsed >= bonus.standard_time {
        1.0
    } else if elapsed >= bonus.bonus_time {
        let whole = elapsed.floor();
        let percent = 1.0 - (whole - bonus.bonus_time) / (bonus.standard_time - bonus.bonus_time);
        1.0 + bonus.bonus_add_scale * percent
    } else {
        let under = (bonus.bonus_time - elapsed) / 0.1 * 0.02;
        1.0 + bonus.bonus_add_scale + under
    }
}

/// Final results snapshot produced at session end
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInfo {
    /// Raw accumulated score before the time multiplier
    pub total_score: f32,
    /// Multiplier applied (1.0 when no bonus curve applies)
    pub time_scale: f32,
    /// `total_score * time_scale`, saturated
    pub final_score: f32,
    pub perfect_count: u32,
    pub great_count: u32,
    pub good_count: u32,
    /// Score earned per quality (beam kills feed the perfect subtotal)
    pub perfect_total_score: f32,
    pub great_total_score: f32,
    pub good_total_score: f32,
    /// Total enemies destroyed
    pub break_count: u32,
    /// Play time in seconds
    pub elapsed: f32,
}

/// Live score and wave bookkeeping for one session
#[derive(Debug, Clone)]
pub struct ScoreBoard {
    table: ScoreTable,
    elapsed: f32,
    total_score: f32,
    perfect_count: u32,
    great_count: u32,
    good_count: u32,
    perfect_total_score: f32,
    great_total_score: f32,
    good_total_score: f32,
    total_count: u32,
    generated_count: u32,
    remaining_count: u32,
}

impl ScoreBoard {
    pub fn new(table: ScoreTable) -> Self {
        Self {
            table,
            elapsed: 0.0,
            total_score: 0.0,
            perfect_count: 0,
            great_count: 0,
            good_count: 0,
            perfect_total_score: 0.0,
            great_total_score: 0.0,
            good_total_score: 0.0,
            total_count: 0,
            generated_count: 0,
            remaining_count: 0,
        }
    }

    /// Reset the wave counters for a freshly generated wave
    pub fn set_spawned(&mut self, count: u32) {
        self.generated_count = count;
        self.remaining_count = count;
    }

    /// Record a destroyed enemy: bump the quality bucket, add its score to
    /// that quality's subtotal and the grand total, and saturate everything.
    pub fn record_hit(&mut self, quality: HitQuality) {
        let score = quality.score_value(&self.table);
        let (count, subtotal) = match quality {
            HitQuality::Good => (&mut self.good_count, &mut self.good_total_score),
            HitQuality::Great => (&mut self.great_count, &mut self.great_total_score),
            // Beam kills share the perfect bucket and subtotal
            HitQuality::Perfect | HitQuality::Beam => {
                (&mut self.perfect_count, &mut self.perfect_total_score)
            }
        };
        *count = (*count + 1).min(MAX_BREAK_COUNT);
        *subtotal = (*subtotal + score).min(MAX_SCORE);

        self.total_count = (self.total_count + 1).min(MAX_BREAK_COUNT);
        self.total_score = (self.total_score + score).min(MAX_SCORE);
        self.remaining_count = self.remaining_count.saturating_sub(1);
    }

    pub fn advance_time(&mut self, dt: f32) {
        self.elapsed += dt;
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn total_score(&self) -> f32 {
        self.total_score
    }

    /// Cumulative enemies destroyed across every wave of the session
    pub fn break_count(&self) -> u32 {
        self.total_count
    }

    pub fn remaining(&self) -> u32 {
        self.remaining_count
    }

    /// True once at least one enemy was generated and none remain
    pub fn all_destroyed(&self) -> bool {
        self.generated_count > 0 && self.remaining_count == 0
    }

    /// Fraction of generated enemies still alive (1.0 before any spawn)
    pub fn remain_ratio(&self) -> f32 {
        if self.generated_count == 0 {
            1.0
        } else {
            self.remaining_count as f32 / self.generated_count as f32
        }
    }

    /// Apply the time multiplier and produce the final results.
    pub fn finalize(&self, bonus: Option<&TimeBonus>) -> ScoreInfo {
        let scale = bonus.map(|b| time_scale(b, self.elapsed)).unwrap_or(1.0);
        ScoreInfo {
            total_score: self.total_score,
            time_scale: scale,
            final_score: (self.total_score * scale).min(MAX_SCORE),
            perfect_count: self.perfect_count,
            great_count: self.great_count,
            good_count: self.good_count,
            perfect_total_score: self.perfect_total_score,
            great_total_score: self.great_total_score,
            good_total_score: self.good_total_score,
            break_count: self.break_count(),
            elapsed: self.elapsed,
        }
    }
}
