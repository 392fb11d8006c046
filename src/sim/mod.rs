//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Tick-driven only, no blocking waits
//! - Seeded RNG only
//! - Fixed in-tick actor order (ship, projectiles, enemies, camera last)
//! - No rendering or platform dependencies

pub mod camera;
pub mod enemy;
pub mod judge;
pub mod projectile;
pub mod score;
pub mod session;
pub mod ship;
pub mod wave;

pub use camera::{Camera, CameraState};
pub use enemy::{Enemy, EnemyState};
pub use judge::{HitQuality, judge};
pub use projectile::{Beam, Missile};
pub use score::{ScoreBoard, ScoreInfo, time_scale};
pub use session::{GameMode, GameSession, SessionServices, SessionState};
pub use ship::{Ship, ShipInput, ShipState};
pub use wave::{EnemySpawn, generate_wave};
