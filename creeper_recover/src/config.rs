// Data-driven recovery configuration.
//
// Every tunable the engine reads lives in `RecoverConfig`: which materials are
// re-armed instead of recorded, the fuse range and launch speed for re-armed
// ordnance, the coincidence epsilon used to deduplicate cells, and the pacing
// used by `RecoveryQueue`. Hosts load it from JSON; every field has a default
// (`#[serde(default)]`), so a file only needs the keys it changes.
//
// `from_json` parses and validates. Constructing the struct directly skips
// validation, which is fine for tests that know what they pass.
//
// See also: `explosion.rs` (ordnance and dedup fields), `queue.rs` (pacing).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All tunable parameters of the recovery engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoverConfig {
    /// Materials that are re-armed as primed entities instead of restored.
    pub ordnance_materials: Vec<String>,
    /// Inclusive lower bound of the fuse draw, in ticks.
    pub fuse_ticks_min: u32,
    /// Exclusive upper bound of the fuse draw, in ticks.
    pub fuse_ticks_max: u32,
    /// Magnitude of the launch velocity given to re-armed ordnance.
    pub launch_speed: f64,
    /// Cells closer than this to an already-consumed cell are dropped.
    pub coincidence_epsilon: f64,
    /// Ticks an explosion waits in `RecoveryQueue` before its first block
    /// is restored.
    pub recover_delay_ticks: u64,
    /// Blocks restored per explosion per queue tick.
    pub blocks_per_tick: usize,
}

impl Default for RecoverConfig {
    fn default() -> Self {
        Self {
            ordnance_materials: vec!["minecraft:tnt".to_string()],
            fuse_ticks_min: 10,
            fuse_ticks_max: 30,
            launch_speed: 0.7,
            coincidence_epsilon: 0.1,
            recover_delay_ticks: 100,
            blocks_per_tick: 1,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("fuse range [{min}, {max}) is empty")]
    EmptyFuseRange { min: u32, max: u32 },
    #[error("launch_speed must be finite and non-negative, got {0}")]
    LaunchSpeed(f64),
    #[error("coincidence_epsilon must be finite and positive, got {0}")]
    Epsilon(f64),
    #[error("blocks_per_tick must be at least 1")]
    ZeroBlocksPerTick,
}

impl RecoverConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: RecoverConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fuse_ticks_min >= self.fuse_ticks_max {
            return Err(ConfigError::EmptyFuseRange {
                min: self.fuse_ticks_min,
                max: self.fuse_ticks_max,
            });
        }
        if !self.launch_speed.is_finite() || self.launch_speed < 0.0 {
            return Err(ConfigError::LaunchSpeed(self.launch_speed));
        }
        if !self.coincidence_epsilon.is_finite() || self.coincidence_epsilon <= 0.0 {
            return Err(ConfigError::Epsilon(self.coincidence_epsilon));
        }
        if self.blocks_per_tick == 0 {
            return Err(ConfigError::ZeroBlocksPerTick);
        }
        Ok(())
    }

    pub fn is_ordnance(&self, material: &str) -> bool {
        self.ordnance_materials.iter().any(|m| m == material)
    }
}
