//! Missiles and the beam
//!
//! Both are simple kinematic entities owned by the session; neither runs a
//! state machine. Missiles fly straight and despawn past a fixed range. The
//! beam sweeps with the ship's heading for its attached phase, then holds
//! its last heading until it burns out.

use glam::Vec3;

pub const MISSILE_SPEED: f32 = 100.0;
/// Missiles despawn this far from the origin
pub const MISSILE_DESTROY_DISTANCE: f32 = 200.0;
/// Impact point for judging sits at the missile tip
pub const MISSILE_TIP_OFFSET: f32 = 1.5;
/// Contact radius against an enemy of scale 1
pub const MISSILE_HIT_RADIUS: f32 = 2.0;

/// Seconds the beam stays attached to the ship's heading
pub const BEAM_FOLLOW_TIME: f32 = 1.5;
/// Total beam lifetime
pub const BEAM_LIFETIME: f32 = 3.0;
pub const BEAM_RANGE: f32 = 160.0;
/// Half-angle of the kill cone (degrees)
pub const BEAM_CONE_DEGREES: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Missile {
    pub position: Vec3,
    pub direction: Vec3,
}

impl Missile {
    pub fn new(position: Vec3, direction: Vec3) -> Self {
        Self {
            position,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Advance one tick. Returns false once out of range.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.position += MISSILE_SPEED * dt * self.direction;
        self.position.length() <= MISSILE_DESTROY_DISTANCE
    }

    /// Judging position, offset to the tip
    pub fn impact_point(&self) -> Vec3 {
        self.position + self.direction * MISSILE_TIP_OFFSET
    }

    /// Contact test against an enemy body
    pub fn hits(&self, enemy_position: Vec3, enemy_scale: f32) -> bool {
        self.position.distance(enemy_position) <= MISSILE_HIT_RADIUS * enemy_scale
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Beam {
    pub direction: Vec3,
    elapsed: f32,
}

impl Beam {
    pub fn new(direction: Vec3) -> Self {
        Self {
            direction: direction.normalize_or_zero(),
            elapsed: 0.0,
        }
    }

    /// Advance one tick, tracking `ship_forward` while still attached.
    /// Returns false once burnt out.
    pub fn tick(&mut self, dt: f32, ship_forward: Option<Vec3>) -> bool {
        if self.elapsed <= BEAM_FOLLOW_TIME {
            if let Some(forward) = ship_forward {
                self.direction = forward.normalize_or_zero();
            }
        }
        self.elapsed += dt;
        self.elapsed <= BEAM_LIFETIME
    }

    /// True when an enemy position falls inside the kill cone
    pub fn catches(&self, enemy_position: Vec3) -> bool {
        let dist = enemy_position.length();
        if dist > BEAM_RANGE || dist < f32::EPSILON {
            return false;
        }
        let cos = self.direction.dot(enemy_position / dist);
        cos >= BEAM_CONE_DEGREES.to_radians().cos()
    }
}
