//! Player ship actor
//!
//! The ship sits at the origin and rotates to face incoming enemies. It is
//! inert until the session activates it (after the appear animation) and is
//! stopped again for the slow-motion finish. Firing produces commands the
//! session drains each tick; the ship itself never spawns projectiles.

use glam::{Quat, Vec3};

use crate::consts::{SHIP_RELOAD_TIME, SHIP_TILT, SHIP_YAW_SPEED, SHOT_OFFSET, SHOT_PITCH};
use crate::fsm::{State, StateMachine, Transition};
use crate::normalize_degrees;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShipState {
    /// Inert during the intro
    Wait,
    /// Player controlled
    Active,
    /// Controls locked for the finish
    Stopped,
}

/// Per-tick control intent, written by the frontend before each tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShipInput {
    /// Turn axis: -1 full left, +1 full right
    pub turn: f32,
    /// Aim axis: -1 full down, +1 full up
    pub aim: f32,
    pub fire: bool,
    pub beam: bool,
}

/// Commands emitted by the ship for the session to execute
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShipCommand {
    /// Launch a missile from `position` along `direction`
    Fire { position: Vec3, direction: Vec3 },
    /// Fire the beam if the gauge allows it
    BeamRequest,
}

#[derive(Debug, Default)]
pub struct ShipBody {
    /// Facing around the vertical axis (degrees)
    pub yaw_degrees: f32,
    /// Lean into the current turn (degrees, cosmetic)
    pub tilt_degrees: f32,
    /// Seconds until the next missile may fire
    pub reload: f32,
    pub input: ShipInput,
    /// Set by the session when the intro finishes
    pub activate: bool,
    /// Set by the session when the finish begins
    pub stop: bool,
    /// Drained by the session after each tick
    pub commands: Vec<ShipCommand>,
}

impl ShipBody {
    /// Horizontal facing direction
    pub fn forward(&self) -> Vec3 {
        Quat::from_rotation_y(self.yaw_degrees.to_radians()) * Vec3::Z
    }

    /// Facing with the vertical aim offset applied
    fn aim_direction(&self) -> Vec3 {
        let pitch = -self.input.aim * SHOT_PITCH;
        Quat::from_rotation_y(self.yaw_degrees.to_radians())
            * Quat::from_rotation_x(pitch.to_radians())
            * Vec3::Z
    }
}

struct WaitState;

impl State<ShipBody, ShipState> for WaitState {
    fn update(&mut self, body: &mut ShipBody, _dt: f32) -> Transition<ShipState> {
        if body.activate {
            Transition::To(ShipState::Active)
        } else {
            Transition::Stay
        }
    }
}

struct ActiveState;

impl State<ShipBody, ShipState> for ActiveState {
    fn update(&mut self, body: &mut ShipBody, dt: f32) -> Transition<ShipState> {
        if body.stop {
            body.tilt_degrees = 0.0;
            return Transition::To(ShipState::Stopped);
        }

        let turn = body.input.turn.clamp(-1.0, 1.0);
        body.yaw_degrees = normalize_degrees(body.yaw_degrees + SHIP_YAW_SPEED * turn * dt);
        // Tilt is set absolutely from the stick, not integrated
        body.tilt_degrees = -SHIP_TILT * turn;

        body.reload = (body.reload - dt).max(0.0);
        // Sub-millisecond float residue must not cost a whole tick of reload
        if body.input.fire && body.reload <= 1e-4 {
            let direction = body.aim_direction();
            body.commands.push(ShipCommand::Fire {
                position: direction * SHOT_OFFSET,
                direction,
            });
            body.reload = SHIP_RELOAD_TIME;
        }

        if body.input.beam {
            body.commands.push(ShipCommand::BeamRequest);
        }

        Transition::Stay
    }
}

struct StoppedState;

impl State<ShipBody, ShipState> for StoppedState {
    fn enter(&mut self, body: &mut ShipBody) {
        body.tilt_degrees = 0.0;
    }

    fn update(&mut self, _body: &mut ShipBody, _dt: f32) -> Transition<ShipState> {
        Transition::Stay
    }
}

pub struct Ship {
    pub body: ShipBody,
    fsm: StateMachine<ShipBody, ShipState>,
}

impl Ship {
    pub fn new() -> Self {
        let mut body = ShipBody::default();
        let mut fsm = StateMachine::new();
        fsm.register(ShipState::Wait, || Box::new(WaitState) as _);
        fsm.register(ShipState::Active, || Box::new(ActiveState) as _);
        fsm.register(ShipState::Stopped, || Box::new(StoppedState) as _);
        fsm.start(&mut body, ShipState::Wait);
        Self { body, fsm }
    }

    pub fn tick(&mut self, dt: f32) {
        self.fsm.update(&mut self.body, dt);
    }

    pub fn state(&self) -> ShipState {
        self.fsm.current().expect("ship machine started")
    }

    pub fn activate(&mut self) {
        self.body.activate = true;
    }

    pub fn stop(&mut self) {
        self.body.stop = true;
    }

    pub fn drain_commands(&mut self) -> Vec<ShipCommand> {
        std::mem::take(&mut self.body.commands)
    }
}

impl Default for Ship {
    fn default() -> Self {
        Self::new()
    }
}
