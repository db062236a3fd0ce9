//! # Voxel World
//!
//! Representation, lighting and lifecycle of a chunked voxel world.
//!
//! ## Architecture
//!
//! * **Block**: voxel types, faces and per-voxel face-visibility masks
//! * **Chunk**: fixed-size 3D grids of voxels, light and face masks
//! * **ChunkIndex**: position to chunk lookup plus coordinate conversions
//! * **Lighting**: two-channel flood fill with depropagation across chunk faces
//! * **Terrain**: heightfield and cave based voxel generation
//! * **Visibility**: per-voxel face masks from a padded neighbourhood snapshot
//! * **Lifecycle**: per-chunk state machine and the stage driver
//! * **Loader**: which chunks should exist around a moving point
//! * **World**: owns the chunks and resolves edits and light
//! * **Tasks**: terrain generation on worker threads
//!
//! ## Data Flow
//!
//! 1. A loader plan creates chunks, which start `Uninitialized`
//! 2. Terrain is generated and installed, seeding light at chunk faces
//! 3. Edits queue on their chunk and are applied during `resolve_pending`
//! 4. Light settles across all live chunks, marking touched chunks dirty
//! 5. Dirty chunks are remeshed and handed to a mesh consumer
//!
//! ## Thread Safety
//!
//! * Chunks live behind `Shared` read-write locks
//! * Only the thread owning the `World` takes write locks
//! * Worker tasks take one read lock at a time

pub mod block;
pub mod chunk;
pub mod chunk_index;
pub mod lifecycle;
pub mod lighting;
pub mod loader;
pub mod neighborhood;
pub mod tasks;
pub mod terrain;
pub mod visibility;
pub mod world;
