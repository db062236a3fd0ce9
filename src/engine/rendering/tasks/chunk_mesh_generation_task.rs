//! Task for rebuilding a chunk's surface in a background thread.
//!
//! The task carries handles to the chunk and its live neighbours, captured on
//! the main thread. On the worker it copies their data into a
//! [`ChunkNeighborhood`](crate::engine::voxels::neighborhood::ChunkNeighborhood),
//! taking one read lock at a time, then computes face visibility and the
//! mesh without holding any lock.

use cgmath::Point3;
use log::debug;

use crate::engine::{
    rendering::meshing::{build_chunk_surface, ChunkSurface, MeshBuilder},
    task_management::task::{Task, TaskContext, TaskResult},
    voxels::{chunk_index::ChunkHandle, neighborhood::NeighborhoodHandles},
};

/// Rebuilds face masks and mesh for one chunk.
pub struct ChunkMeshGenerationTask {
    position: Point3<i32>,
    /// Revision of the chunk when the task was scheduled.
    revision: u64,
    handles: NeighborhoodHandles,
    builder: MeshBuilder,
}

impl ChunkMeshGenerationTask {
    pub fn new(
        position: Point3<i32>,
        revision: u64,
        handles: NeighborhoodHandles,
        builder: MeshBuilder,
    ) -> Self {
        ChunkMeshGenerationTask {
            position,
            revision,
            handles,
            builder,
        }
    }
}

impl Task for ChunkMeshGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        Box::new(ChunkMeshGenerationTaskResult {
            position: self.position,
            revision: self.revision,
            chunk: self.handles.center().cloned(),
            surface: build_chunk_surface(&self.handles, &self.builder),
        })
    }
}

/// The rebuilt surface, applied on the main thread if still current.
pub struct ChunkMeshGenerationTaskResult {
    position: Point3<i32>,
    revision: u64,
    /// The chunk the surface was built for, so a replacement chunk loaded at
    /// the same position never receives it.
    chunk: Option<ChunkHandle>,
    surface: ChunkSurface,
}

impl TaskResult for ChunkMeshGenerationTaskResult {
    /// Stores the surface on the chunk and forwards the mesh to the
    /// consumer. Results built from an outdated revision are dropped; the
    /// chunk is already dirty again and will be rescheduled.
    fn handle_result(self: Box<Self>, context: &mut TaskContext<'_>) -> Vec<Box<dyn Task + Send>> {
        let current = match (&self.chunk, context.world.chunk(self.position)) {
            (Some(built_for), Some(handle)) => handle.ptr_eq(built_for),
            _ => false,
        };
        if !current {
            debug!("Discarding mesh for chunk {:?}, it was unloaded", self.position);
            return Vec::new();
        }
        let ChunkSurface { face_masks, mesh } = self.surface;
        if context
            .world
            .apply_surface(self.position, self.revision, face_masks, mesh.clone())
        {
            context.consumer.apply_mesh(self.position, &mesh);
        }
        Vec::new()
    }
}
