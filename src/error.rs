//! Error types
//!
//! Nothing here is fatal to the running process: the game loop turns every
//! error into a notice, an idle frame, or a respawn.

use thiserror::Error;

/// Top-level error type for the simulation core.
#[derive(Debug, Error)]
pub enum GameError {
    /// The physics engine (or anything else a run needs) is not ready
    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    #[error("Ability rejected: {0}")]
    AbilityRejected(#[from] Rejection),

    /// Pivot fell past the fall limit
    #[error("Out of bounds: pivot y={y} exceeds fall limit {limit}")]
    OutOfBounds { y: f32, limit: f32 },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Why an ability activation was turned down.
///
/// Copy + static messages, cheap to return from the per-tick input path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// No run in progress, or the rig is missing
    #[error("no run in progress")]
    NotRunning,

    /// Still cooling down (never surfaced to the player)
    #[error("on cooldown")]
    OnCooldown,

    #[error("insufficient energy: need {needed}, have {available}")]
    InsufficientEnergy { needed: u32, available: u32 },

    /// Hook ray found no static geometry in range
    #[error("no hook target in range")]
    NoTarget,
}

impl Rejection {
    /// Whether the player should see a notice for this rejection
    pub fn is_silent(&self) -> bool {
        matches!(self, Rejection::OnCooldown | Rejection::NotRunning)
    }
}

/// Tuning file errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },
}
