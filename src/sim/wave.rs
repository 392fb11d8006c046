//! Enemy wave generation
//!
//! Turns one `EnemyGenerateParams` record into concrete spawn commands. The
//! spawn angle is a random walk - each enemy appears a random angular step
//! from the previous one, so waves sweep around the ring instead of
//! scattering independently.

use glam::{Vec2, Vec3};
use rand::Rng;
use rand_pcg::Pcg32;

use crate::consts::APPEAR_DISTANCE;
use crate::position_at_degrees;
use crate::tables::EnemyGenerateParams;

/// Spawn command for a single enemy
#[derive(Debug, Clone, PartialEq)]
pub struct EnemySpawn {
    /// Initial position on the appear circle
    pub position: Vec3,
    /// Facing, always toward the origin
    pub forward: Vec3,
    pub scale: f32,
    pub speed: f32,
    /// Shake amplitude: x = lateral (always), y = vertical (every Nth enemy)
    pub shake: Vec2,
    /// Seconds before the enemy reveals itself and starts moving
    pub wait_time: f32,
}

/// Generate one wave of spawn commands.
///
/// `initial_delay` is added to every enemy's wait time (the session uses 1 s
/// for the opening wave and 3 s for endless re-waves).
pub fn generate_wave(
    params: &EnemyGenerateParams,
    initial_delay: f32,
    rng: &mut Pcg32,
) -> Vec<EnemySpawn> {
    let mut spawns = Vec::with_capacity(params.generate_count as usize);
    let mut degree = 0.0f32;

    for i in 0..params.generate_count {
        // Monotonic angular drift around the origin
        degree += rng.random_range(params.min_appear_degree..=params.max_appear_degree);
        let position = position_at_degrees(degree, APPEAR_DISTANCE);
        let forward = (-position).normalize();

        let scale = rng.random_range(params.min_scale..=params.max_scale);

        // Later spawns in the wave are systematically faster
        let speed = rng.random_range(params.min_speed..=params.max_speed)
            * (1.0 + i as f32 * params.add_speed);

        // Lateral shake always; vertical shake on every Nth enemy
        let mut shake = Vec2::new(
            rng.random_range(params.min_shake_width_x..=params.max_shake_width_x),
            0.0,
        );
        if params.shake_width_y_count > 0
            && i % params.shake_width_y_count == params.shake_width_y_count - 1
        {
            shake.y = rng.random_range(params.min_shake_width_y..=params.max_shake_width_y);
        }

        // Staggered release: release index scales the drawn wait
        let wait_time = i as f32 / params.appear_each_count as f32
            * rng.random_range(params.min_wait_time..=params.max_wait_time)
            + initial_delay;

        spawns.push(EnemySpawn {
            position,
            forward,
            scale,
            speed,
            shake,
            wait_time,
        });
    }

    log::debug!(
        "generated wave: {} enemies ({:?} level {})",
        spawns.len(),
        params.mode,
        params.level
    );
    spawns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::GameMode;
    use rand::SeedableRng;

    fn fixed_params() -> EnemyGenerateParams {
        EnemyGenerateParams {
            mode: GameMode::Normal,
            level: 1,
            generate_count: 3,
            min_appear_degree: 30.0,
            max_appear_degree: 30.0,
            min_scale: 1.0,
            max_scale: 1.0,
            min_speed: 10.0,
            max_speed: 10.0,
            add_speed: 0.5,
            min_shake_width_x: 2.0,
            max_shake_width_x: 2.0,
            min_shake_width_y: 1.0,
            max_shake_width_y: 1.0,
            shake_width_y_count: 2,
            min_wait_time: 0.0,
            max_wait_time: 0.0,
            appear_each_count: 3,
        }
    }

    #[test]
    fn test_degenerate_ranges_give_exact_wave() {
        let mut rng = Pcg32::seed_from_u64(7);
        let spawns = generate_wave(&fixed_params(), 0.0, &mut rng);
        assert_eq!(spawns.len(), 3);

        // Cumulative angles 30, 60, 90 degrees
        for (spawn, deg) in spawns.iter().zip([30.0, 60.0, 90.0]) {
            let expected = position_at_degrees(deg, APPEAR_DISTANCE);
            assert!((spawn.position - expected).length() < 1e-3);
            // Facing the origin
            assert!((spawn.forward + spawn.position.normalize()).length() < 1e-5);
        }

        // Speeds 10, 15, 20: multiplier (1 + i * 0.5)
        let speeds: Vec<f32> = spawns.iter().map(|s| s.speed).collect();
        assert_eq!(speeds, vec![10.0, 15.0, 20.0]);

        // Only index 1 (i % 2 == 1) carries vertical shake
        assert_eq!(spawns[0].shake.y, 0.0);
        assert_eq!(spawns[1].shake.y, 1.0);
        assert_eq!(spawns[2].shake.y, 0.0);
        for s in &spawns {
            assert_eq!(s.shake.x, 2.0);
        }

        // Zero wait range: delay only
        for s in &spawns {
            assert_eq!(s.wait_time, 0.0);
        }
    }

    #[test]
    fn test_count_and_speed_multiplier_hold_for_random_ranges() {
        let mut params = fixed_params();
        params.generate_count = 17;
        params.min_speed = 10.0;
        params.max_speed = 10.0;
        params.add_speed = 0.25;
        params.min_appear_degree = -45.0;
        params.max_appear_degree = 80.0;
        let mut rng = Pcg32::seed_from_u64(99);
        let spawns = generate_wave(&params, 0.5, &mut rng);
        assert_eq!(spawns.len(), 17);
        for (i, s) in spawns.iter().enumerate() {
            let expected = 10.0 * (1.0 + i as f32 * 0.25);
            assert!((s.speed - expected).abs() < 1e-4, "enemy {i}");
            assert!((s.position.length() - APPEAR_DISTANCE).abs() < 1e-2);
        }
    }

    #[test]
    fn test_initial_delay_added_to_every_wait() {
        let mut params = fixed_params();
        params.min_wait_time = 2.0;
        params.max_wait_time = 2.0;
        let mut rng = Pcg32::seed_from_u64(3);
        let spawns = generate_wave(&params, 3.0, &mut rng);
        // wait = i / 3 * 2.0 + 3.0
        assert_eq!(spawns[0].wait_time, 3.0);
        assert!((spawns[1].wait_time - (2.0 / 3.0 + 3.0)).abs() < 1e-5);
        assert!((spawns[2].wait_time - (4.0 / 3.0 + 3.0)).abs() < 1e-5);
    }

    #[test]
    fn test_same_seed_same_wave() {
        let params = {
            let mut p = fixed_params();
            p.min_scale = 0.5;
            p.max_scale = 2.0;
            p.min_appear_degree = -60.0;
            p.max_appear_degree = 60.0;
            p
        };
        let a = generate_wave(&params, 1.0, &mut Pcg32::seed_from_u64(42));
        let b = generate_wave(&params, 1.0, &mut Pcg32::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
