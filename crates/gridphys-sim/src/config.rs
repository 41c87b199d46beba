//! Pipeline and engine configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use gridphys_core::constants::{RAY_STEP, TICK_RATE};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("tick_rate must be at least 1")]
    ZeroTickRate,
    #[error("{field} must be finite and positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },
}

/// Tunables for the physics pipeline. Missing JSON fields fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Ticks per simulated second.
    pub tick_rate: u32,
    /// Sample spacing for grid ray marching, in world units.
    pub ray_step: f32,
    /// World units per grid cell.
    pub tile_scale: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            tick_rate: TICK_RATE,
            ray_step: RAY_STEP,
            tile_scale: 1.0,
        }
    }
}

impl PhysicsConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        for (field, value) in [("ray_step", self.ray_step), ("tile_scale", self.tile_scale)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        Ok(())
    }

    /// Seconds per tick.
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }
}

/// Configuration for starting a new simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    pub physics: PhysicsConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            physics: PhysicsConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.physics.validate()?;
        Ok(config)
    }
}
