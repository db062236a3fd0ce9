//! Mesh output of the voxel engine.
//!
//! This module turns chunk data into vertex and index buffers and hands them
//! to a [`MeshConsumer`]. Uploading to a GPU or building collision shapes is
//! the consumer's business; the engine only guarantees that every mesh it
//! delivers passes [`ChunkMesh::validate`].

use std::collections::HashMap;

use cgmath::Point3;
use log::trace;

pub mod meshing;
pub mod tasks;
mod vertex;

pub use meshing::{ChunkMesh, MeshBuilder};
pub use vertex::{Vertex, VertexAttribute};

/// Receives rebuilt chunk meshes.
pub trait MeshConsumer {
    /// A chunk's mesh was rebuilt. Replaces any mesh previously applied for
    /// `position`.
    fn apply_mesh(&mut self, position: Point3<i32>, mesh: &ChunkMesh);

    /// A chunk was unloaded.
    fn remove_mesh(&mut self, position: Point3<i32>);
}

/// Keeps the latest mesh of every chunk in memory.
#[derive(Debug, Default)]
pub struct MeshCollector {
    meshes: HashMap<Point3<i32>, ChunkMesh>,
    applied: usize,
    removed: usize,
}

impl MeshCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mesh(&self, position: Point3<i32>) -> Option<&ChunkMesh> {
        self.meshes.get(&position)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Total meshes applied, including replacements.
    pub fn applied(&self) -> usize {
        self.applied
    }

    pub fn removed(&self) -> usize {
        self.removed
    }

    /// Sum of quads across all held meshes.
    pub fn total_quads(&self) -> usize {
        self.meshes.values().map(ChunkMesh::quad_count).sum()
    }
}

impl MeshConsumer for MeshCollector {
    fn apply_mesh(&mut self, position: Point3<i32>, mesh: &ChunkMesh) {
        trace!("Collected mesh for {:?} ({} quads)", position, mesh.quad_count());
        self.meshes.insert(position, mesh.clone());
        self.applied += 1;
    }

    fn remove_mesh(&mut self, position: Point3<i32>) {
        if self.meshes.remove(&position).is_some() {
            self.removed += 1;
        }
    }
}

/// Discards every mesh.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullMeshConsumer;

impl MeshConsumer for NullMeshConsumer {
    fn apply_mesh(&mut self, _position: Point3<i32>, _mesh: &ChunkMesh) {}

    fn remove_mesh(&mut self, _position: Point3<i32>) {}
}
