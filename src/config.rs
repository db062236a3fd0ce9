//! # Engine Configuration
//!
//! Runtime settings for the voxel world. Every field has a default, so a
//! configuration file only needs to list the values it overrides:
//!
//! ```json
//! { "chunk_size": 32, "load_radius": 3, "terrain": { "seed": 7 } }
//! ```
//!
//! `ChunkSize` and `BlockSize` form part of the implicit data format of the
//! engine: every chunk in a world must agree on them.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default number of voxels along one chunk edge.
pub const DEFAULT_CHUNK_SIZE: usize = 16;
/// Largest chunk edge accepted by [`EngineConfig::validate`].
pub const MAX_CHUNK_SIZE: usize = 128;

/// Top level engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Voxels per chunk edge.
    pub chunk_size: usize,
    /// World units per voxel edge.
    pub block_size: f32,
    /// Horizontal streaming radius, in chunks.
    pub load_radius: i32,
    /// Vertical streaming radius, in chunks.
    pub vertical_load_radius: i32,
    /// Worker threads for generation and meshing. Zero runs every task inline
    /// on the thread that drives the engine.
    pub worker_count: usize,
    /// Terrain generation settings.
    pub terrain: TerrainConfig,
}

/// Settings for the default noise-backed terrain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Seed for the height and cave noise.
    pub seed: u32,
    /// Scale applied to chunk-space coordinates before sampling height noise.
    pub frequency: f64,
    /// Whether solid terrain is carved by 3-D cave noise.
    pub caves: bool,
    /// Scale applied to voxel coordinates before sampling cave noise.
    pub cave_frequency: f64,
    /// Solid voxels with `|noise| < cave_threshold` are carved out.
    pub cave_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            chunk_size: DEFAULT_CHUNK_SIZE,
            block_size: 1.0,
            load_radius: 2,
            vertical_load_radius: 1,
            worker_count: 4,
            terrain: TerrainConfig::default(),
        }
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        TerrainConfig {
            seed: 0,
            frequency: 0.35,
            caves: false,
            cave_frequency: 0.08,
            cave_threshold: 0.06,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks that every field holds a value the engine can work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Terrain divides by `chunk_size - 1`.
        if !(2..=MAX_CHUNK_SIZE).contains(&self.chunk_size) {
            return Err(ConfigError::Invalid {
                field: "chunk_size",
                reason: format!("must be in 2..={}, got {}", MAX_CHUNK_SIZE, self.chunk_size),
            });
        }
        if !self.block_size.is_finite() || self.block_size <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "block_size",
                reason: format!("must be finite and positive, got {}", self.block_size),
            });
        }
        if self.load_radius < 0 {
            return Err(ConfigError::Invalid {
                field: "load_radius",
                reason: format!("must not be negative, got {}", self.load_radius),
            });
        }
        if self.vertical_load_radius < 0 {
            return Err(ConfigError::Invalid {
                field: "vertical_load_radius",
                reason: format!("must not be negative, got {}", self.vertical_load_radius),
            });
        }
        if !self.terrain.frequency.is_finite() || !self.terrain.cave_frequency.is_finite() {
            return Err(ConfigError::Invalid {
                field: "terrain",
                reason: "noise frequencies must be finite".to_string(),
            });
        }
        Ok(())
    }
}
