//! Enemy actor
//!
//! Each enemy runs a three-state lifecycle on the shared machine: hidden
//! `Wait` until its staggered release time, `Move` straight toward the
//! origin with a sinusoidal shake, and `Happy` (a victory spin) once it
//! reaches the ship. Death is a latch on the body, not a state: a dead
//! enemy is removed by the session at the end of the tick.

use glam::{Vec2, Vec3};

use crate::consts::CAPTURE_DISTANCE;
use crate::fsm::{State, StateMachine, Transition};
use crate::normalize_degrees;
use crate::sim::wave::EnemySpawn;

/// Degrees per second of celebration spin
const HAPPY_SPIN_SPEED: f32 = 1200.0;
/// Shake phase advances one step per tick, divided down to this period
const SHAKE_TICK_DIVISOR: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyState {
    /// Hidden, counting down to release
    Wait,
    /// Advancing toward the origin
    Move,
    /// Reached the ship, spinning in place
    Happy,
}

/// Mutable enemy data shared across its states
#[derive(Debug)]
pub struct EnemyBody {
    pub position: Vec3,
    /// Spawn position on the appear circle
    pub init_position: Vec3,
    /// Travel direction, toward the origin
    pub forward: Vec3,
    pub scale: f32,
    pub speed: f32,
    /// Shake amplitude (x = lateral, y = vertical)
    pub shake: Vec2,
    /// Seconds to stay hidden before moving
    pub wait_time: f32,
    /// False while waiting; flips on release
    pub visible: bool,
    /// Distance travelled along `forward`
    pub total_move: f32,
    /// Tick counter driving the shake phase
    pub move_ticks: u32,
    /// Celebration spin angle (degrees)
    pub spin_degrees: f32,
    dead: bool,
}

impl EnemyBody {
    fn from_spawn(spawn: &EnemySpawn) -> Self {
        Self {
            position: spawn.position,
            init_position: spawn.position,
            forward: spawn.forward,
            scale: spawn.scale,
            speed: spawn.speed,
            shake: spawn.shake,
            wait_time: spawn.wait_time,
            visible: false,
            total_move: 0.0,
            move_ticks: 0,
            spin_degrees: 0.0,
            dead: false,
        }
    }
}

struct WaitState {
    elapsed: f32,
}

impl State<EnemyBody, EnemyState> for WaitState {
    fn enter(&mut self, _body: &mut EnemyBody) {
        self.elapsed = 0.0;
    }

    fn update(&mut self, body: &mut EnemyBody, dt: f32) -> Transition<EnemyState> {
        self.elapsed += dt;
        if self.elapsed >= body.wait_time {
            body.visible = true;
            Transition::To(EnemyState::Move)
        } else {
            Transition::Stay
        }
    }
}

struct MoveState;

impl State<EnemyBody, EnemyState> for MoveState {
    fn update(&mut self, body: &mut EnemyBody, dt: f32) -> Transition<EnemyState> {
        if body.position.distance(Vec3::ZERO) <= CAPTURE_DISTANCE {
            return Transition::To(EnemyState::Happy);
        }

        if body.total_move < crate::consts::APPEAR_DISTANCE {
            body.total_move += body.speed * dt;
        }
        body.move_ticks += 1;

        let right = Vec3::Y.cross(body.forward);
        let phase = (body.move_ticks as f32 / SHAKE_TICK_DIVISOR).sin();
        let shake_vec = phase * (body.shake.x * right + body.shake.y * Vec3::Y);

        body.position = body.init_position + body.total_move * body.forward + shake_vec;
        Transition::Stay
    }
}

struct HappyState;

impl State<EnemyBody, EnemyState> for HappyState {
    fn update(&mut self, body: &mut EnemyBody, dt: f32) -> Transition<EnemyState> {
        body.spin_degrees = normalize_degrees(body.spin_degrees + HAPPY_SPIN_SPEED * dt);
        Transition::Stay
    }
}

/// A live enemy: body plus its state machine
pub struct Enemy {
    pub body: EnemyBody,
    fsm: StateMachine<EnemyBody, EnemyState>,
}

impl Enemy {
    pub fn from_spawn(spawn: &EnemySpawn) -> Self {
        let mut body = EnemyBody::from_spawn(spawn);
        let mut fsm = StateMachine::new();
        fsm.register(EnemyState::Wait, || Box::new(WaitState { elapsed: 0.0 }) as _);
        fsm.register(EnemyState::Move, || Box::new(MoveState) as _);
        fsm.register(EnemyState::Happy, || Box::new(HappyState) as _);
        fsm.start(&mut body, EnemyState::Wait);
        Self { body, fsm }
    }

    pub fn tick(&mut self, dt: f32) {
        if self.body.dead {
            return;
        }
        self.fsm.update(&mut self.body, dt);
    }

    pub fn state(&self) -> EnemyState {
        self.fsm.current().expect("enemy machine started")
    }

    /// Latch the enemy dead. Idempotent; a dead enemy never updates again.
    pub fn kill(&mut self) {
        self.body.dead = true;
    }

    pub fn is_dead(&self) -> bool {
        self.body.dead
    }

    /// True once the enemy has closed to capture range of the origin
    pub fn has_reached_ship(&self) -> bool {
        self.state() == EnemyState::Happy
    }
}
