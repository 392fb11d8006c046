//! Crab Strike - gameplay core for an arcade rail shooter
//!
//! Core modules:
//! - `fsm`: generic hierarchical state machine driving every actor
//! - `sim`: deterministic simulation (waves, actors, hit judging, scoring)
//! - `tables`: tunable parameter records and their JSON-backed store
//! - `services`: injected collaborator interfaces (audio, persistence)
//! - `highscores` / `settings`: persisted player data
//!
//! The simulation is single-threaded and tick-driven: everything advances
//! through one `GameSession::tick` per frame, with a fixed in-tick order
//! (ship, projectiles, enemies, camera last).

pub mod fsm;
pub mod highscores;
pub mod services;
pub mod settings;
pub mod sim;
pub mod tables;

pub use highscores::{EndlessLeaderboard, normal_mode_best, set_normal_mode_best};
pub use settings::Settings;
pub use sim::session::{GameMode, GameSession, SessionState};

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep for the demo loop (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Distance from the origin at which enemies appear
    pub const APPEAR_DISTANCE: f32 = 150.0;
    /// Enemies this close to the origin have reached the ship
    pub const CAPTURE_DISTANCE: f32 = 2.0;

    /// Ship yaw speed (degrees/sec at full stick)
    pub const SHIP_YAW_SPEED: f32 = 70.0;
    /// Ship tilt at full stick (degrees)
    pub const SHIP_TILT: f32 = 30.0;
    /// Minimum time between missile shots (seconds)
    pub const SHIP_RELOAD_TIME: f32 = 0.15;
    /// Vertical aim offset per unit of up/down intent (degrees)
    pub const SHOT_PITCH: f32 = 15.0;
    /// Missiles spawn this far ahead of the ship
    pub const SHOT_OFFSET: f32 = 3.0;

    /// Seconds of play to passively charge the beam gauge from empty
    pub const BEAM_CHARGE_TIME: f32 = 10.0;
    /// Gauge added per destroyed enemy
    pub const BEAM_KILL_CHARGE: f32 = 0.1;

    /// World time scale while in slow motion
    pub const SLOW_MOTION_TIME_SCALE: f32 = 0.2;
    /// Sound effect pitch while in slow motion
    pub const SLOW_MOTION_SE_PITCH: f32 = 0.45;
    /// Slow motion duration (scaled seconds)
    pub const SLOW_MOTION_TIME: f32 = 0.6;

    /// Speed added to the last known wave parameters past the configured
    /// maximum endless level
    pub const OVER_LEVEL_ADD_SPEED: f32 = 10.0;
}

/// Normalize an angle in degrees to [0, 360)
#[inline]
pub fn normalize_degrees(mut degrees: f32) -> f32 {
    degrees %= 360.0;
    if degrees < 0.0 {
        degrees += 360.0;
    }
    degrees
}

/// Move `from` toward `to` by at most `max_delta`, without overshooting
#[inline]
pub fn move_towards(from: Vec3, to: Vec3, max_delta: f32) -> Vec3 {
    let delta = to - from;
    let dist = delta.length();
    if dist <= max_delta || dist < f32::EPSILON {
        to
    } else {
        from + delta / dist * max_delta
    }
}

/// Position on the appear circle for a spawn angle (degrees, 0 = forward),
/// rotated about the vertical axis
#[inline]
pub fn position_at_degrees(degrees: f32, distance: f32) -> Vec3 {
    glam::Quat::from_rotation_y(degrees.to_radians()) * (Vec3::Z * distance)
}
