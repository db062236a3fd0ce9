//! # Error Types
//!
//! Recoverable failures surfaced by the public API. Conditions that can only
//! arise from a programming mistake (initialising a chunk twice, copying
//! arrays of different dimensions) panic instead of appearing here.

use cgmath::Point3;

/// Errors returned by the voxel edit and light request boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoxelError {
    /// A local coordinate lies outside `[0, chunk_size)` on some axis.
    #[error("local coordinate ({x}, {y}, {z}) is outside a chunk of size {size}")]
    OutOfBounds {
        /// Requested x coordinate.
        x: i32,
        /// Requested y coordinate.
        y: i32,
        /// Requested z coordinate.
        z: i32,
        /// Edge length of the chunk.
        size: usize,
    },

    /// The target chunk is not registered with the world.
    #[error("chunk ({x}, {y}, {z}) is not loaded")]
    ChunkNotLoaded {
        /// Chunk x coordinate.
        x: i32,
        /// Chunk y coordinate.
        y: i32,
        /// Chunk z coordinate.
        z: i32,
    },

    /// A light level above the 4-bit maximum was requested.
    #[error("light level {level} exceeds the maximum of 15")]
    InvalidLightLevel {
        /// The rejected level.
        level: u8,
    },
}

impl VoxelError {
    pub(crate) fn out_of_bounds(local: Point3<i32>, size: usize) -> Self {
        VoxelError::OutOfBounds {
            x: local.x,
            y: local.y,
            z: local.z,
            size,
        }
    }

    pub(crate) fn chunk_not_loaded(position: Point3<i32>) -> Self {
        VoxelError::ChunkNotLoaded {
            x: position.x,
            y: position.y,
            z: position.z,
        }
    }
}

/// Errors produced while loading or validating an [`EngineConfig`](crate::config::EngineConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration text is not valid JSON for the expected shape.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A field holds a value the engine cannot work with.
    #[error("invalid configuration value for `{field}`: {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// Human readable explanation.
        reason: String,
    },
}

/// Inconsistencies detected in a built [`ChunkMesh`](crate::engine::rendering::meshing::ChunkMesh).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshError {
    /// Indices do not describe whole quads.
    #[error("index count {count} is not a multiple of 6")]
    PartialQuad {
        /// Number of indices in the mesh.
        count: usize,
    },

    /// An index points past the end of the vertex buffer.
    #[error("index {index} references a vertex past the end of {vertex_count} vertices")]
    IndexOutOfRange {
        /// The offending index value.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },
}
