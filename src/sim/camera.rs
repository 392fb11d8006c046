//! Camera actor
//!
//! Follows the ship from behind in `Normal`, plays a scripted fly-in during
//! `AppearAnimate`, and swings out to frame a surviving enemy in `Clear`.
//! The session ticks the camera last so it always reads final actor
//! positions for the frame. A separate noise-driven shake overlay handles
//! the player-death rumble.

use glam::{Quat, Vec3};
use rand::Rng;
use rand_pcg::Pcg32;

use crate::fsm::{State, StateMachine, Transition};
use crate::move_towards;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraState {
    /// Chase view behind the ship
    Normal,
    /// Scripted intro fly-in
    AppearAnimate,
    /// Framing the celebration shot
    Clear,
}

/// Chase offset behind the target (up, back)
const CHASE_OFFSET: (f32, f32) = (5.0, 10.0);
/// Look-at height offset in the chase view
const CHASE_LOOK_HEIGHT: f32 = 3.0;

const APPEAR_ANIM_TIME: f32 = 3.5;
const APPEAR_INIT_DISTANCE: f32 = 6.5;
const APPEAR_LOOK_FORWARD: f32 = 4.5;
/// Drift direction of the intro fly-in (unnormalized on purpose)
const APPEAR_DRIFT: Vec3 = Vec3::new(-0.8, -1.2, 0.85);

/// Clear framing offsets (right, up, outward)
const CLEAR_OFFSET: Vec3 = Vec3::new(5.0, 5.0, 10.0);
const CLEAR_INIT_DISTANCE: f32 = 5.0;
const CLEAR_SNAP_DISTANCE: f32 = 0.5;
/// Units moved toward the framing point per tick
const CLEAR_SMOOTH_STEP: f32 = 5.0;
const CLEAR_SHAKE_STRENGTH: f32 = 1.0;
const CLEAR_SHAKE_DURATION: f32 = 0.5;

pub struct CameraBody {
    pub position: Vec3,
    /// Point the camera is aimed at
    pub look_target: Vec3,
    /// False once the ship is gone; the chase view freezes
    pub has_target: bool,
    pub target_position: Vec3,
    pub target_forward: Vec3,
    /// Intro fly-in requested / in progress
    pub appear_animation: bool,
    /// Clear framing requested / in progress
    pub clear_state: bool,
    /// Enemy framed by the clear shot
    pub clear_enemy_position: Vec3,
    rng: Pcg32,
}

impl CameraBody {
    /// View direction derived from the current aim point
    pub fn forward(&self) -> Vec3 {
        let dir = self.look_target - self.position;
        if dir.length_squared() < f32::EPSILON {
            Vec3::Z
        } else {
            dir.normalize()
        }
    }

    fn right(&self) -> Vec3 {
        let r = Vec3::Y.cross(self.forward());
        if r.length_squared() < f32::EPSILON {
            Vec3::X
        } else {
            r.normalize()
        }
    }
}

struct NormalState;

impl State<CameraBody, CameraState> for NormalState {
    fn update(&mut self, body: &mut CameraBody, _dt: f32) -> Transition<CameraState> {
        if !body.has_target {
            return Transition::Stay;
        }
        if body.appear_animation {
            return Transition::To(CameraState::AppearAnimate);
        }
        if body.clear_state {
            return Transition::To(CameraState::Clear);
        }

        body.position =
            body.target_position - CHASE_OFFSET.1 * body.target_forward + CHASE_OFFSET.0 * Vec3::Y;
        body.look_target = body.target_position + Vec3::new(0.0, CHASE_LOOK_HEIGHT, 0.0);
        Transition::Stay
    }
}

struct AppearAnimateState {
    elapsed: f32,
}

impl State<CameraBody, CameraState> for AppearAnimateState {
    fn enter(&mut self, body: &mut CameraBody) {
        self.elapsed = 0.0;
        body.position = APPEAR_INIT_DISTANCE * APPEAR_DRIFT;
    }

    fn update(&mut self, body: &mut CameraBody, dt: f32) -> Transition<CameraState> {
        body.position += APPEAR_DRIFT * dt;

        // Aim a little ahead of where the camera is already looking
        let ahead = APPEAR_LOOK_FORWARD * body.forward();
        body.look_target = body.target_position + ahead;

        self.elapsed += dt;
        if self.elapsed >= APPEAR_ANIM_TIME {
            Transition::To(CameraState::Normal)
        } else {
            Transition::Stay
        }
    }

    fn exit(&mut self, body: &mut CameraBody) {
        body.appear_animation = false;
    }
}

struct ClearState {
    framing_point: Vec3,
    elapsed: f32,
}

impl State<CameraBody, CameraState> for ClearState {
    fn enter(&mut self, body: &mut CameraBody) {
        self.elapsed = 0.0;

        // Frame the enemy from outside the ring, offset right and up
        let outward = body.clear_enemy_position.normalize_or_zero();
        let right = Quat::from_rotation_y((-90.0f32).to_radians()) * outward;
        self.framing_point = body.clear_enemy_position
            + outward * CLEAR_OFFSET.z
            + right * CLEAR_OFFSET.x
            + Vec3::Y * CLEAR_OFFSET.y;

        body.position = self.framing_point.normalize_or_zero() * CLEAR_INIT_DISTANCE;
        body.look_target = Vec3::ZERO;
    }

    fn update(&mut self, body: &mut CameraBody, dt: f32) -> Transition<CameraState> {
        if !body.clear_state {
            return Transition::To(CameraState::Normal);
        }

        if body.position.distance(self.framing_point) < CLEAR_SNAP_DISTANCE {
            return Transition::Stay;
        }

        // Handheld-style jitter that settles as the shot arrives
        let ratio = (1.0 - self.elapsed / CLEAR_SHAKE_DURATION).clamp(0.0, 1.0);
        self.elapsed += dt;
        let jitter_x = body.rng.random_range(-CLEAR_SHAKE_STRENGTH..=CLEAR_SHAKE_STRENGTH) * ratio;
        let jitter_y = body.rng.random_range(-CLEAR_SHAKE_STRENGTH..=CLEAR_SHAKE_STRENGTH) * ratio;
        let right = body.right();
        let up = body.forward().cross(right);
        body.position += jitter_x * right + jitter_y * up;

        body.position = move_towards(body.position, self.framing_point, CLEAR_SMOOTH_STEP);
        body.look_target = Vec3::ZERO;
        Transition::Stay
    }
}

/// Noise-driven positional shake, overlaid after the state update
struct ShakeEffect {
    duration: f32,
    strength: f32,
    vibrato: f32,
    noise_offset: (f32, f32),
    init_position: Vec3,
    elapsed: f32,
}

impl ShakeEffect {
    fn noise(offset: f32, speed: f32, time: f32) -> f32 {
        (offset + speed * time).sin()
    }

    /// Shake position for the current elapsed time
    fn position(&self, right: Vec3) -> Vec3 {
        let fade = self.vibrato * (1.0 - self.elapsed / self.duration);
        let x = (Self::noise(self.noise_offset.0, self.strength, self.elapsed) * self.strength)
            .clamp(-fade, fade);
        let y = (Self::noise(self.noise_offset.1, self.strength, self.elapsed) * self.strength)
            .clamp(-fade, fade);
        self.init_position + x * right + y * Vec3::Y
    }
}

pub struct Camera {
    pub body: CameraBody,
    fsm: StateMachine<CameraBody, CameraState>,
    shake: Option<ShakeEffect>,
}

impl Camera {
    pub fn new(rng: Pcg32) -> Self {
        let mut body = CameraBody {
            position: Vec3::ZERO,
            look_target: Vec3::Z,
            has_target: false,
            target_position: Vec3::ZERO,
            target_forward: Vec3::Z,
            appear_animation: false,
            clear_state: false,
            clear_enemy_position: Vec3::ZERO,
            rng,
        };
        let mut fsm = StateMachine::new();
        fsm.register(CameraState::Normal, || Box::new(NormalState) as _);
        fsm.register(CameraState::AppearAnimate, || {
            Box::new(AppearAnimateState { elapsed: 0.0 }) as _
        });
        fsm.register(CameraState::Clear, || {
            Box::new(ClearState {
                framing_point: Vec3::ZERO,
                elapsed: 0.0,
            }) as _
        });
        fsm.start(&mut body, CameraState::Normal);
        Self {
            body,
            fsm,
            shake: None,
        }
    }

    /// Advance one tick. Must run after every other actor so the chase view
    /// reads this frame's final target transform.
    pub fn tick(&mut self, dt: f32) {
        self.fsm.update(&mut self.body, dt);

        if let Some(shake) = &mut self.shake {
            self.body.position = shake.position(self.body.right());
            shake.elapsed += dt;
            if shake.elapsed >= shake.duration {
                self.body.position = shake.init_position;
                self.shake = None;
            }
        }
    }

    pub fn state(&self) -> CameraState {
        self.fsm.current().expect("camera machine started")
    }

    /// Update the chase target for this frame
    pub fn set_target(&mut self, position: Vec3, forward: Vec3) {
        self.body.has_target = true;
        self.body.target_position = position;
        self.body.target_forward = forward;
    }

    /// Target destroyed: freeze the chase view
    pub fn clear_target(&mut self) {
        self.body.has_target = false;
    }

    pub fn start_appear_animation(&mut self) {
        self.body.appear_animation = true;
    }

    /// True while the intro fly-in is pending or running
    pub fn appear_animation_running(&self) -> bool {
        self.body.appear_animation
    }

    pub fn start_clear_state(&mut self, enemy_position: Vec3) {
        self.body.clear_state = true;
        self.body.clear_enemy_position = enemy_position;
    }

    pub fn end_clear_state(&mut self) {
        self.body.clear_state = false;
        self.body.clear_enemy_position = Vec3::ZERO;
    }

    /// Player-death rumble overlay
    pub fn start_shake(&mut self) {
        self.shake = Some(ShakeEffect {
            duration: 0.3,
            strength: 5.0,
            vibrato: 100.0,
            noise_offset: (
                self.body.rng.random_range(0.0..=100.0),
                self.body.rng.random_range(0.0..=100.0),
            ),
            init_position: self.body.position,
            elapsed: 0.0,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use rand::SeedableRng;

    fn camera() -> Camera {
        Camera::new(Pcg32::seed_from_u64(11))
    }

    #[test]
    fn test_chase_view_tracks_target() {
        let mut cam = camera();
        cam.set_target(Vec3::ZERO, Vec3::Z);
        cam.tick(SIM_DT);
        assert_eq!(cam.state(), CameraState::Normal);
        assert_eq!(cam.body.position, Vec3::new(0.0, 5.0, -10.0));
        assert_eq!(cam.body.look_target, Vec3::new(0.0, 3.0, 0.0));

        // Target turns; the camera swings behind the new facing
        cam.set_target(Vec3::ZERO, Vec3::X);
        cam.tick(SIM_DT);
        assert_eq!(cam.body.position, Vec3::new(-10.0, 5.0, 0.0));
    }

    #[test]
    fn test_without_target_nothing_moves() {
        let mut cam = camera();
        cam.start_appear_animation();
        cam.tick(SIM_DT);
        // No target yet: even a pending fly-in does not start
        assert_eq!(cam.state(), CameraState::Normal);
        assert_eq!(cam.body.position, Vec3::ZERO);
    }

    #[test]
    fn test_appear_animation_runs_and_clears_flag() {
        let mut cam = camera();
        cam.set_target(Vec3::ZERO, Vec3::Z);
        cam.start_appear_animation();
        cam.tick(SIM_DT);
        assert_eq!(cam.state(), CameraState::AppearAnimate);
        assert!(cam.appear_animation_running());
        let start = APPEAR_INIT_DISTANCE * APPEAR_DRIFT;
        assert_eq!(cam.body.position, start);

        // Run the full animation out
        let ticks = (APPEAR_ANIM_TIME / SIM_DT) as u32 + 2;
        for _ in 0..ticks {
            cam.tick(SIM_DT);
        }
        assert_eq!(cam.state(), CameraState::Normal);
        assert!(!cam.appear_animation_running());
        // Drifted along the fixed vector the whole time
        assert!(cam.body.position.distance(Vec3::new(0.0, 5.0, -10.0)) < 1e-3);
    }

    #[test]
    fn test_clear_state_converges_on_framing_point() {
        let mut cam = camera();
        cam.set_target(Vec3::ZERO, Vec3::Z);
        let enemy = Vec3::new(0.0, 0.0, 2.0);
        cam.start_clear_state(enemy);
        cam.tick(SIM_DT);
        assert_eq!(cam.state(), CameraState::Clear);

        // Expected framing point: outward +Z, right -X (rotated -90)
        let expected = enemy + Vec3::Z * 10.0 + Vec3::new(-5.0, 0.0, 0.0) + Vec3::Y * 5.0;
        for _ in 0..120 {
            cam.tick(SIM_DT);
        }
        assert!(cam.body.position.distance(expected) < CLEAR_SNAP_DISTANCE + 1e-3);
        assert_eq!(cam.body.look_target, Vec3::ZERO);

        cam.end_clear_state();
        cam.tick(SIM_DT);
        assert_eq!(cam.state(), CameraState::Normal);
    }

    #[test]
    fn test_shake_displaces_then_restores() {
        let mut cam = camera();
        cam.set_target(Vec3::ZERO, Vec3::Z);
        cam.tick(SIM_DT);
        let resting = cam.body.position;

        cam.clear_target();
        cam.start_shake();
        cam.tick(SIM_DT);
        let mut moved = cam.body.position != resting;
        // 0.3 s shake at 60 Hz
        for _ in 0..20 {
            cam.tick(SIM_DT);
            moved |= cam.body.position != resting;
        }
        assert!(moved);
        assert_eq!(cam.body.position, resting);
    }
}
