//! # Chunk Generation Task
//!
//! Generates terrain for one chunk on a worker. The result installs the grid
//! into the world on the main thread, which also seeds the chunk's light.

use std::sync::Arc;

use cgmath::Point3;
use log::debug;

use crate::engine::{
    task_management::task::{Task, TaskContext, TaskResult},
    voxels::{chunk::VoxelGrid, chunk_index::ChunkHandle, lifecycle::ChunkState, terrain::TerrainGenerator},
};

/// Generates the terrain grid of one chunk.
pub struct ChunkGenerationTask {
    /// The chunk the terrain is for. Compared on completion so that terrain
    /// for a chunk that was unloaded and recreated meanwhile is discarded.
    chunk: ChunkHandle,
    position: Point3<i32>,
    size: usize,
    generator: Arc<TerrainGenerator>,
}

impl ChunkGenerationTask {
    pub fn new(
        chunk: ChunkHandle,
        position: Point3<i32>,
        size: usize,
        generator: Arc<TerrainGenerator>,
    ) -> Self {
        ChunkGenerationTask {
            chunk,
            position,
            size,
            generator,
        }
    }
}

impl Task for ChunkGenerationTask {
    fn process(&self) -> Box<dyn TaskResult + Send> {
        Box::new(ChunkGenerationTaskResult {
            chunk: self.chunk.clone(),
            position: self.position,
            grid: self.generator.generate(self.position, self.size),
        })
    }
}

/// Generated terrain waiting to be installed.
pub struct ChunkGenerationTaskResult {
    chunk: ChunkHandle,
    position: Point3<i32>,
    grid: VoxelGrid,
}

impl TaskResult for ChunkGenerationTaskResult {
    fn handle_result(self: Box<Self>, context: &mut TaskContext<'_>) -> Vec<Box<dyn Task + Send>> {
        let current = context
            .world
            .chunk(self.position)
            .is_some_and(|handle| handle.ptr_eq(&self.chunk));
        if !current || self.chunk.read().state() != ChunkState::Generating {
            debug!("Discarding terrain for chunk {:?}, it was unloaded", self.position);
            return Vec::new();
        }

        context.world.install_terrain(self.position, self.grid);
        Vec::new()
    }
}
