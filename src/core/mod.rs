//! # Core Module
//!
//! Fundamental concurrency primitives shared by every subsystem of the engine.
//!
//! ## Key Components
//! - `Shared`: Thread-safe reference-counted value with read-write locking
//!
//! ## Usage
//! ```rust
//! use voxel_world::core::Shared;
//!
//! let counter = Shared::new(0);
//! *counter.write() += 1;
//! assert_eq!(*counter.read(), 1);
//! ```

pub mod shared;

pub use shared::Shared;
