//! # Chunk Module
//!
//! A chunk is a cubic block of `size³` voxels and the unit of storage, dirty
//! tracking and meshing. Chunks are identified by their position on the
//! chunk grid (not in world units) and looked up through the
//! [`ChunkIndex`](super::chunk_index::ChunkIndex); they never hold references
//! to each other.
//!
//! Besides its [`VoxelGrid`], a chunk carries the queues that feed the light
//! engine and the last mesh built from it:
//!
//! - `pending_edits`: voxel writes requested by gameplay, applied in FIFO
//!   order during the next resolution pass
//! - `pending_light`: light-set requests, from callers or from neighbour
//!   chunks handing work across a shared face
//! - `light_queues`: the flood fill's scratch queues, kept between passes

use std::collections::VecDeque;

use cgmath::Point3;

use super::{
    block::Voxel,
    lifecycle::{ChunkLifecycle, ChunkState},
    lighting::{LightLevel, LightQueues, PendingLightChange},
};
use crate::{engine::rendering::meshing::ChunkMesh, error::VoxelError};

pub mod chunk_iteration;
pub mod voxel_grid;

pub use voxel_grid::{NeighborCell, VoxelGrid};

/// A queued voxel write, applied in FIFO order with other edits of the same
/// chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingEdit {
    /// Flat index of the edited cell.
    pub index: usize,
    pub voxel: Voxel,
}

/// One cubic region of the world.
pub struct Chunk {
    /// Position on the chunk grid.
    pub position: Point3<i32>,
    pub(crate) grid: VoxelGrid,
    pub(crate) lifecycle: ChunkLifecycle,
    pub(crate) pending_edits: VecDeque<PendingEdit>,
    pub(crate) pending_light: VecDeque<PendingLightChange>,
    pub(crate) light_queues: LightQueues,
    pub(crate) mesh: ChunkMesh,
}

impl Chunk {
    /// Creates an uninitialised chunk with an empty, dark grid.
    pub fn new(position: Point3<i32>, size: usize) -> Self {
        Chunk {
            position,
            grid: VoxelGrid::new(size),
            lifecycle: ChunkLifecycle::default(),
            pending_edits: VecDeque::new(),
            pending_light: VecDeque::new(),
            light_queues: LightQueues::new(),
            mesh: ChunkMesh::default(),
        }
    }

    pub fn size(&self) -> usize {
        self.grid.size()
    }

    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    pub fn state(&self) -> ChunkState {
        self.lifecycle.state()
    }

    pub fn lifecycle(&self) -> &ChunkLifecycle {
        &self.lifecycle
    }

    /// Terrain has been installed, so the chunk takes part in neighbour
    /// lookups.
    pub fn is_live(&self) -> bool {
        self.lifecycle.is_live()
    }

    /// The mesh from the most recent completed remesh.
    pub fn mesh(&self) -> &ChunkMesh {
        &self.mesh
    }

    /// Voxel at a validated local coordinate.
    pub fn voxel_at(&self, local: Point3<i32>) -> Result<Voxel, VoxelError> {
        let index = self.grid.checked_index(local)?;
        Ok(self.grid.voxel(index))
    }

    /// Light at a validated local coordinate.
    pub fn light_at(&self, local: Point3<i32>) -> Result<LightLevel, VoxelError> {
        let index = self.grid.checked_index(local)?;
        Ok(self.grid.light(index))
    }

    /// Queues a voxel write at a validated local coordinate.
    pub fn queue_edit(&mut self, local: Point3<i32>, voxel: Voxel) -> Result<(), VoxelError> {
        let index = self.grid.checked_index(local)?;
        self.pending_edits.push_back(PendingEdit { index, voxel });
        Ok(())
    }

    pub(crate) fn queue_light_change(&mut self, change: PendingLightChange) {
        self.pending_light.push_back(change);
    }

    /// Edits or light requests are waiting for the next resolution pass.
    pub fn has_pending_work(&self) -> bool {
        !self.pending_edits.is_empty()
            || !self.pending_light.is_empty()
            || !self.light_queues.is_idle()
    }

    /// Replaces the placeholder grid with generated terrain.
    ///
    /// # Panics
    /// Panics if the chunk was already initialised or the grid size differs.
    pub(crate) fn install_grid(&mut self, grid: VoxelGrid) {
        self.lifecycle.finish_generation();
        self.grid.copy_from(&grid);
    }
}
