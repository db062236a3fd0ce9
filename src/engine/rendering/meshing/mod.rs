//! # Meshing
//!
//! Turns a chunk's visible faces into renderable geometry. Every visible face
//! of every non-empty voxel becomes one quad: four vertices and six indices.
//! Vertex colours come from smooth lighting over the neighbourhood snapshot,
//! and each quad's diagonal is chosen from the same corner samples so that
//! shading interpolates along the brighter diagonal.
//!
//! Meshes are always rebuilt whole; a dirty chunk never patches its previous
//! mesh.

use cgmath::Point3;
use log::debug;
use web_time::Instant;

use crate::engine::voxels::{
    block::{material_layer, FaceMask},
    chunk::chunk_iteration::VisibleVoxelIterator,
    neighborhood::{ChunkNeighborhood, NeighborhoodHandles},
    visibility::FaceVisibilityBuilder,
};
use crate::engine::rendering::Vertex;

pub mod face;
pub mod mesh;
pub mod smooth_lighting;

pub use face::{Face, FaceBasis};
pub use mesh::ChunkMesh;

use face::CORNER_UVS;
use smooth_lighting::{corner_brightness, corner_samples, quad_indices};

/// Builds chunk meshes at a fixed block size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshBuilder {
    block_size: f32,
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl MeshBuilder {
    pub fn new(block_size: f32) -> Self {
        MeshBuilder { block_size }
    }

    pub fn block_size(&self) -> f32 {
        self.block_size
    }

    /// Meshes the centre chunk of `neighborhood` using `masks` as its face
    /// visibility.
    ///
    /// # Panics
    /// Panics if `masks` does not hold one entry per voxel.
    pub fn build(&self, neighborhood: &ChunkNeighborhood, masks: &[FaceMask]) -> ChunkMesh {
        let visible: Vec<_> = VisibleVoxelIterator::with_masks(neighborhood.center(), masks).collect();
        let quads = visible.iter().map(|v| v.faces.count() as usize).sum();
        let mut mesh = ChunkMesh::with_capacity(quads);

        for voxel in visible {
            let p = voxel.position;
            let position = Point3::new(p.x as i32, p.y as i32, p.z as i32);
            for direction in voxel.faces.iter() {
                let face = Face::new(position, direction, voxel.voxel);
                let samples = corner_samples(neighborhood, position, &face.basis);
                let corners = face.corners(self.block_size);
                let normal = direction.normal();
                let layer = material_layer(voxel.voxel, direction);

                let vertices = [0, 1, 2, 3].map(|corner| {
                    Vertex::new(
                        corners[corner],
                        normal,
                        corner_brightness(samples[corner]),
                        CORNER_UVS[corner],
                        layer,
                    )
                });
                mesh.push_quad(vertices, quad_indices(samples));
            }
        }

        mesh
    }
}

/// Face masks and mesh produced by one remesh.
#[derive(Debug, Clone, Default)]
pub struct ChunkSurface {
    pub face_masks: Vec<FaceMask>,
    pub mesh: ChunkMesh,
}

/// Captures the neighbourhood of a chunk, computes face visibility and
/// builds its mesh.
pub fn build_chunk_surface(handles: &NeighborhoodHandles, builder: &MeshBuilder) -> ChunkSurface {
    let start = Instant::now();
    let neighborhood = ChunkNeighborhood::capture(handles);
    let face_masks = FaceVisibilityBuilder::build(&neighborhood);
    let mesh = builder.build(&neighborhood, &face_masks);
    debug_assert_eq!(mesh.validate(), Ok(()));

    debug!(
        "Meshed chunk {:?}: {} quads in {:?}",
        handles.position,
        mesh.quad_count(),
        start.elapsed()
    );
    ChunkSurface { face_masks, mesh }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::voxels::{
        block::{Direction, Voxel},
        chunk::VoxelGrid,
        lighting::LightLevel,
    };

    fn mesh_of(grid: &VoxelGrid) -> ChunkMesh {
        let neighborhood = ChunkNeighborhood::isolated(grid);
        let masks = FaceVisibilityBuilder::build(&neighborhood);
        MeshBuilder::new(1.0).build(&neighborhood, &masks)
    }

    #[test]
    fn lone_block_in_sky_gives_six_bright_quads() {
        let mut grid = VoxelGrid::filled(4, Voxel::Empty, LightLevel::SKY);
        let index = grid.index(1, 1, 1);
        grid.set_voxel(index, Voxel::Grass);
        grid.set_light(index, LightLevel::DARK);

        let mesh = mesh_of(&grid);
        assert_eq!(mesh.quad_count(), 6);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.validate(), Ok(()));
        assert!(mesh.colors().all(|c| c == [1.0, 1.0, 1.0, 1.0]));

        let up = Direction::Up.normal();
        let top_layers: Vec<_> = mesh
            .vertices
            .iter()
            .filter(|v| v.normal == [up.x, up.y, up.z])
            .map(|v| v.uv2[0])
            .collect();
        assert_eq!(top_layers, vec![material_layer(Voxel::Grass, Direction::Up) as f32; 4]);
    }

    #[test]
    fn empty_chunk_has_empty_mesh() {
        assert!(mesh_of(&VoxelGrid::new(4)).is_empty());
    }

    #[test]
    fn dark_surroundings_give_black_vertices() {
        let mut grid = VoxelGrid::new(3);
        grid.set_voxel(grid.index(1, 1, 1), Voxel::Stone);
        let mesh = mesh_of(&grid);

        // Interior neighbours are dark, padding outside the chunk is sky.
        let up_colors: Vec<_> = mesh
            .vertices
            .iter()
            .filter(|v| v.normal == [0.0, 1.0, 0.0])
            .map(|v| v.color[0])
            .collect();
        assert_eq!(up_colors.len(), 4);
        assert!(up_colors.iter().all(|&c| c < 1.0));
    }

    #[test]
    fn mesh_positions_are_scaled_by_block_size() {
        let mut grid = VoxelGrid::new(2);
        grid.set_voxel(grid.index(1, 0, 0), Voxel::Dirt);
        let neighborhood = ChunkNeighborhood::isolated(&grid);
        let masks = FaceVisibilityBuilder::build(&neighborhood);
        let mesh = MeshBuilder::new(0.5).build(&neighborhood, &masks);

        for position in mesh.positions() {
            assert!(position.iter().all(|c| (-0.25..=0.75).contains(c)), "{:?}", position);
        }
    }
}
