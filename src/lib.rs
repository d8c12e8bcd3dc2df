//! Hammer Ascent - a physics-driven pot-and-hammer platformer
//!
//! Core modules:
//! - `sim`: Gameplay simulation (level, rig, abilities, collisions, game loop)
//! - `physics`: Physics engine boundary and the rapier2d adapter
//! - `tuning`: Data-driven game balance
//! - `hud`: Per-frame readout and transient notices for the presentation layer
//! - `clock`: Monotonic time sources

pub mod clock;
pub mod error;
pub mod hud;
pub mod physics;
pub mod sim;
pub mod tuning;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, GameError, Rejection};
pub use hud::{HudSnapshot, Notice, NoticeBoard};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, matches the tuned spring feel)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Fixed simulation timestep in milliseconds
    pub const SIM_DT_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
}

/// Clamp helper that tolerates an inverted range by favouring the lower bound
#[inline]
pub fn clamp(v: f32, lo: f32, hi: f32) -> f32 {
    v.min(hi).max(lo)
}

/// Unit vector for an angle in radians
#[inline]
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Rotate a local offset by `angle` radians
#[inline]
pub fn rotate(local: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(local)
}
