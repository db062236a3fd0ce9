//! Per-chunk mesh buffers.

use crate::{engine::rendering::Vertex, error::MeshError};

/// Interleaved vertex buffer plus triangle indices for one chunk.
///
/// Rebuilt from scratch on every remesh. Positions are chunk-local; hosts
/// translate by [`chunk_world_offset`](crate::engine::voxels::chunk_index::chunk_world_offset).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkMesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl ChunkMesh {
    pub fn with_capacity(quads: usize) -> Self {
        ChunkMesh {
            vertices: Vec::with_capacity(quads * 4),
            indices: Vec::with_capacity(quads * 6),
        }
    }

    /// Appends one quad. `pattern` indexes into `corners`.
    pub fn push_quad(&mut self, corners: [Vertex; 4], pattern: [u32; 6]) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&corners);
        self.indices.extend(pattern.iter().map(|i| base + i));
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn quad_count(&self) -> usize {
        self.indices.len() / 6
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn positions(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.vertices.iter().map(|v| v.position)
    }

    pub fn normals(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.vertices.iter().map(|v| v.normal)
    }

    pub fn colors(&self) -> impl Iterator<Item = [f32; 4]> + '_ {
        self.vertices.iter().map(|v| v.color)
    }

    pub fn uvs(&self) -> impl Iterator<Item = [f32; 2]> + '_ {
        self.vertices.iter().map(|v| v.uv)
    }

    pub fn uv2s(&self) -> impl Iterator<Item = [f32; 2]> + '_ {
        self.vertices.iter().map(|v| v.uv2)
    }

    /// Raw vertex bytes for upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw index bytes for upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Checks that indices form whole quads and reference existing vertices.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.indices.len() % 6 != 0 {
            return Err(MeshError::PartialQuad {
                count: self.indices.len(),
            });
        }
        let vertex_count = self.vertices.len();
        match self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            Some(&index) => Err(MeshError::IndexOutOfRange {
                index,
                vertex_count,
            }),
            None => Ok(()),
        }
    }
}
