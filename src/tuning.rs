//! Data-driven game balance
//!
//! Every gameplay number lives here so a JSON file can override any subset of
//! them. Units: pixels, seconds for rates, milliseconds for windows.
//! Y grows downward, so "up" is negative Y.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::Ability;

/// Cost and cooldown for one ability
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbilityTuning {
    /// Energy spent on activation
    pub cost: f32,
    /// Minimum time between activations (ms)
    pub cooldown_ms: f64,
}

impl AbilityTuning {
    pub const fn new(cost: f32, cooldown_ms: f64) -> Self {
        Self { cost, cooldown_ms }
    }
}

/// Procedural level layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelTuning {
    pub stage_count: u32,
    pub stage_width: f32,
    /// Vertical rise between consecutive stages
    pub stage_step_up: f32,
    /// Y of the first stage's base platform
    pub stage_base_y: f32,
    pub stage_block_w: f32,
    pub stage_block_h: f32,
    /// Decoration cadence (stages)
    pub plant_every: u32,
    /// Enemy cadence (stages)
    pub enemy_every: u32,
    pub checkpoint_every: u32,
    /// Cadence of the bonus coin (the odd-stage coin is unconditional)
    pub bonus_coin_every: u32,
    /// Cadence of the tall vertical platform
    pub tower_every: u32,
    /// Patrol speed range (px/s)
    pub enemy_speed_min: f32,
    pub enemy_speed_max: f32,
    /// Half width of an enemy's patrol span
    pub enemy_patrol_half_span: f32,
}

impl Default for LevelTuning {
    fn default() -> Self {
        Self {
            stage_count: 20,
            stage_width: 520.0,
            stage_step_up: 120.0,
            stage_base_y: 820.0,
            stage_block_w: 460.0,
            stage_block_h: 90.0,
            plant_every: 2,
            enemy_every: 3,
            checkpoint_every: 3,
            bonus_coin_every: 4,
            tower_every: 5,
            enemy_speed_min: 72.0,
            enemy_speed_max: 108.0,
            enemy_patrol_half_span: 80.0,
        }
    }
}

/// Complete gameplay tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === World ===
    /// Downward gravity (px/s²)
    pub gravity_y: f32,
    pub level: LevelTuning,
    /// Pivot Y past which the player is respawned
    pub fall_y_limit: f32,

    // === Camera ===
    pub zoom: f32,
    /// Per-tick exponential smoothing factor toward the camera target
    pub cam_smooth: f32,
    /// Camera target relative to the pivot
    pub cam_offset: Vec2,

    // === Steering ===
    /// Steering rotation rate (rad/s)
    pub rotate_speed: f32,
    /// Reach extension rate (px/s)
    pub extend_speed: f32,
    pub min_reach: f32,
    pub max_reach: f32,
    pub default_angle: f32,
    pub default_reach: f32,

    // === Energy ===
    pub energy_max: f32,
    /// Regeneration (energy/s of wall-clock time)
    pub energy_regen: f32,
    /// Respawn never leaves the player with less than this
    pub respawn_energy_floor: f32,

    // === Abilities ===
    pub burst: AbilityTuning,
    pub dash: AbilityTuning,
    pub hook: AbilityTuning,
    pub slow: AbilityTuning,
    /// Burst impulse magnitude along tip→pivot
    pub burst_impulse: f32,
    /// Dash impulse magnitude along the steering direction
    pub dash_impulse: f32,
    /// Upward bias added to burst and dash
    pub impulse_lift: f32,
    pub hook_range: f32,
    pub hook_duration_ms: f64,
    pub slow_duration_ms: f64,
    pub slow_time_scale: f32,

    // === Checkpoints / respawn ===
    /// Checkpoint respawn point sits this far above the marker
    pub checkpoint_lift: f32,
    /// Weapon placement relative to the checkpoint on respawn
    pub respawn_weapon_offset: Vec2,

    // === Progress ===
    pub progress_pad_start: f32,
    pub progress_pad_end: f32,

    // === HUD ===
    pub notice_ms: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity_y: 1050.0,
            level: LevelTuning::default(),
            fall_y_limit: 1400.0,

            zoom: 1.0,
            cam_smooth: 0.10,
            cam_offset: Vec2::new(0.0, -80.0),

            rotate_speed: 3.3,
            extend_speed: 360.0,
            min_reach: 90.0,
            max_reach: 380.0,
            default_angle: -0.15,
            default_reach: 240.0,

            energy_max: 100.0,
            energy_regen: 8.4,
            respawn_energy_floor: 40.0,

            burst: AbilityTuning::new(18.0, 900.0),
            dash: AbilityTuning::new(26.0, 2300.0),
            hook: AbilityTuning::new(10.0, 4500.0),
            slow: AbilityTuning::new(22.0, 9500.0),
            burst_impulse: 6000.0,
            dash_impulse: 8000.0,
            impulse_lift: 2000.0,
            hook_range: 380.0,
            hook_duration_ms: 2600.0,
            slow_duration_ms: 2200.0,
            slow_time_scale: 0.35,

            checkpoint_lift: 40.0,
            respawn_weapon_offset: Vec2::new(160.0, -80.0),

            progress_pad_start: 80.0,
            progress_pad_end: 280.0,

            notice_ms: 1800.0,
        }
    }
}

impl Tuning {
    /// Cost/cooldown pair for an ability
    pub fn ability(&self, ability: Ability) -> AbilityTuning {
        match ability {
            Ability::Burst => self.burst,
            Ability::Dash => self.dash,
            Ability::Hook => self.hook,
            Ability::Slow => self.slow,
        }
    }

    /// X coordinate that counts as 100% progress
    pub fn goal_x(&self) -> f32 {
        (self.level.stage_count.saturating_sub(1)) as f32 * self.level.stage_width + 520.0
    }

    /// Parse and validate a JSON override; missing fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json_str(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, message: impl Into<String>) -> ConfigError {
            ConfigError::InvalidValue {
                field,
                message: message.into(),
            }
        }

        let level = &self.level;
        if level.stage_count == 0 {
            return Err(invalid("level.stage_count", "must be at least 1"));
        }
        if level.stage_width <= 0.0 {
            return Err(invalid("level.stage_width", "must be > 0"));
        }
        for (field, every) in [
            ("level.plant_every", level.plant_every),
            ("level.enemy_every", level.enemy_every),
            ("level.checkpoint_every", level.checkpoint_every),
            ("level.bonus_coin_every", level.bonus_coin_every),
            ("level.tower_every", level.tower_every),
        ] {
            if every == 0 {
                return Err(invalid(field, "cadence must be at least 1"));
            }
        }
        if level.enemy_speed_min > level.enemy_speed_max {
            return Err(invalid(
                "level.enemy_speed_min",
                format!(
                    "{} exceeds enemy_speed_max {}",
                    level.enemy_speed_min, level.enemy_speed_max
                ),
            ));
        }
        if self.min_reach <= 0.0 || self.min_reach > self.max_reach {
            return Err(invalid(
                "min_reach",
                format!("need 0 < min_reach <= max_reach (got {} / {})", self.min_reach, self.max_reach),
            ));
        }
        if !(self.slow_time_scale > 0.0 && self.slow_time_scale <= 1.0) {
            return Err(invalid("slow_time_scale", "must be in (0, 1]"));
        }
        if self.energy_max <= 0.0 {
            return Err(invalid("energy_max", "must be > 0"));
        }
        if !(self.cam_smooth > 0.0 && self.cam_smooth <= 1.0) {
            return Err(invalid("cam_smooth", "must be in (0, 1]"));
        }
        let span = self.goal_x() - self.progress_pad_end - self.progress_pad_start;
        if span <= 0.0 {
            return Err(invalid(
                "progress_pad_end",
                format!("progress pads leave no distance to cover ({span})"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let tuning = Tuning::default();
        assert!(tuning.validate().is_ok());
        assert_eq!(tuning.goal_x(), 19.0 * 520.0 + 520.0);
        assert_eq!(tuning.ability(Ability::Dash).cost, 26.0);
        assert_eq!(tuning.ability(Ability::Slow).cooldown_ms, 9500.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json_str(r#"{ "energy_max": 150.0, "level": { "stage_count": 8 } }"#)
            .expect("valid override");
        assert_eq!(tuning.energy_max, 150.0);
        assert_eq!(tuning.level.stage_count, 8);
        assert_eq!(tuning.level.stage_width, 520.0);
        assert_eq!(tuning.hook_range, 380.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Tuning::from_json_str(r#"{ "min_reach": 500.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "min_reach", .. }));

        let err = Tuning::from_json_str(r#"{ "slow_time_scale": 0.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "slow_time_scale", .. }));

        let err = Tuning::from_json_str(r#"{ "level": { "enemy_every": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "level.enemy_every", .. }));
    }

    #[test]
    fn test_malformed_json() {
        let err = Tuning::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Tuning::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
