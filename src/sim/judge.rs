//! Geometric hit quality judging
//!
//! A hit's quality depends on where the impact landed relative to the
//! enemy's body: the lateral offset across its facing axis and the vertical
//! offset. Both thresholds scale with the enemy so big targets are as
//! forgiving as they look.

use glam::Vec3;

/// Quality of a landed hit, best to worst: Perfect, Great, Good.
/// Beam kills are their own quality but score like Perfect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitQuality {
    Good,
    Great,
    Perfect,
    Beam,
}

/// Perfect window half-extents (lateral, vertical) at scale 1
const PERFECT_HIT_AREA: (f32, f32) = (0.3, 0.3);
/// Great window half-extents at scale 1
const GREAT_HIT_AREA: (f32, f32) = (0.5, 0.5);

/// Judge the quality of a missile impact against an enemy.
///
/// The lateral offset is the horizontal-plane distance from the enemy's
/// travel axis; the vertical offset is the plain height difference. A hit
/// inside the perfect window is Perfect, inside the great window Great,
/// anything else Good (it still connected).
pub fn judge(impact: Vec3, enemy_pos: Vec3, enemy_forward: Vec3, scale: f32) -> HitQuality {
    let diff = impact - enemy_pos;
    let diff_xz = glam::Vec2::new(diff.x, diff.z);
    let forward_xz = glam::Vec2::new(enemy_forward.x, enemy_forward.z).normalize_or_zero();

    // Perpendicular distance from the enemy's facing line, in the horizontal
    // plane. perp_dot with a unit axis gives the signed lateral component.
    let lateral = diff_xz.perp_dot(forward_xz).abs();
    let vertical = diff.y.abs();

    if lateral < PERFECT_HIT_AREA.0 * scale && vertical < PERFECT_HIT_AREA.1 * scale {
        HitQuality::Perfect
    } else if lateral < GREAT_HIT_AREA.0 * scale && vertical < GREAT_HIT_AREA.1 * scale {
        HitQuality::Great
    } else {
        HitQuality::Good
    }
}

impl HitQuality {
    /// Base score for this quality from the score table
    pub fn score_value(self, table: &crate::tables::ScoreTable) -> f32 {
        match self {
            HitQuality::Good => table.good_score,
            HitQuality::Great => table.great_score,
            // Beam kills pay out like perfect hits
            HitQuality::Perfect | HitQuality::Beam => table.perfect_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::ScoreTable;

    const FWD: Vec3 = Vec3::Z;

    #[test]
    fn test_dead_center_is_perfect() {
        let enemy = Vec3::new(0.0, 0.0, 50.0);
        assert_eq!(judge(enemy, enemy, FWD, 1.0), HitQuality::Perfect);
        // Offsets along the facing axis do not matter
        let along = enemy + FWD * 5.0;
        assert_eq!(judge(along, enemy, FWD, 1.0), HitQuality::Perfect);
    }

    #[test]
    fn test_lateral_offset_degrades_quality() {
        let enemy = Vec3::new(0.0, 0.0, 50.0);
        // Lateral axis for forward = +Z is x
        assert_eq!(
            judge(enemy + Vec3::new(0.2, 0.0, 0.0), enemy, FWD, 1.0),
            HitQuality::Perfect
        );
        assert_eq!(
            judge(enemy + Vec3::new(0.4, 0.0, 0.0), enemy, FWD, 1.0),
            HitQuality::Great
        );
        assert_eq!(
            judge(enemy + Vec3::new(0.6, 0.0, 0.0), enemy, FWD, 1.0),
            HitQuality::Good
        );
    }

    #[test]
    fn test_vertical_offset_degrades_quality() {
        let enemy = Vec3::new(0.0, 0.0, 50.0);
        assert_eq!(
            judge(enemy + Vec3::new(0.0, 0.45, 0.0), enemy, FWD, 1.0),
            HitQuality::Great
        );
        assert_eq!(
            judge(enemy + Vec3::new(0.0, 0.55, 0.0), enemy, FWD, 1.0),
            HitQuality::Good
        );
    }

    #[test]
    fn test_windows_scale_with_enemy() {
        let enemy = Vec3::new(0.0, 0.0, 50.0);
        let impact = enemy + Vec3::new(0.4, 0.0, 0.0);
        // 0.4 lateral: Great at scale 1, Perfect once the window doubles
        assert_eq!(judge(impact, enemy, FWD, 1.0), HitQuality::Great);
        assert_eq!(judge(impact, enemy, FWD, 2.0), HitQuality::Perfect);
    }

    #[test]
    fn test_judgement_depends_on_enemy_orientation() {
        let enemy = Vec3::new(0.0, 0.0, 50.0);
        let impact = enemy + Vec3::new(0.4, 0.0, 0.0);
        // Same impact, rotated enemy: the offset is now along the facing
        // axis, so it counts for nothing.
        assert_eq!(judge(impact, enemy, Vec3::X, 1.0), HitQuality::Perfect);
        assert_eq!(judge(impact, enemy, Vec3::Z, 1.0), HitQuality::Great);
    }

    #[test]
    fn test_score_values() {
        let table = ScoreTable {
            good_score: 100.0,
            great_score: 300.0,
            perfect_score: 500.0,
        };
        assert_eq!(HitQuality::Good.score_value(&table), 100.0);
        assert_eq!(HitQuality::Great.score_value(&table), 300.0);
        assert_eq!(HitQuality::Perfect.score_value(&table), 500.0);
        assert_eq!(HitQuality::Beam.score_value(&table), 500.0);
    }
}
