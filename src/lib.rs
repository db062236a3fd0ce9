#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World
//!
//! A chunked voxel world with two-channel flood-fill lighting, face
//! visibility culling and smooth-lit meshing, driven by a worker pool.
//!
//! ## Key Modules
//!
//! * `core` - Shared handles used across threads
//! * `engine` - Voxels, lighting, meshing, task management and the `Engine` driver
//! * `config` - JSON-loadable engine settings
//! * `error` - Error types returned at the API boundary
//!
//! ## Architecture
//!
//! The engine keeps a clear separation between:
//! * Voxel and light storage per chunk
//! * Light resolution across chunk boundaries
//! * Surface extraction into render-ready meshes
//! * Task scheduling and execution
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::Point3;
//! use voxel_world::{
//!     config::EngineConfig,
//!     engine::{rendering::MeshCollector, Engine},
//! };
//!
//! let config = EngineConfig {
//!     chunk_size: 8,
//!     load_radius: 1,
//!     vertical_load_radius: 0,
//!     worker_count: 0,
//!     ..EngineConfig::default()
//! };
//! let mut engine = Engine::new(config, MeshCollector::new()).unwrap();
//! engine.run_until_idle(Point3::new(0.0, 0.0, 0.0), 100);
//! assert_eq!(engine.consumer().len(), 9);
//! ```

pub mod config;
pub mod core;
pub mod engine;
pub mod error;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{ConfigError, MeshError, VoxelError};

/// Initialises `env_logger` on stdout, filtered by `RUST_LOG`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logger() {
    let mut log_builder = env_logger::Builder::new();
    let _ = log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .try_init();
}
