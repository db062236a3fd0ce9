//! # Face Visibility
//!
//! For every voxel of a chunk, records which of its six faces border
//! transparent space. A face across the edge of the loaded world counts as
//! visible.

use cgmath::Point3;

use super::{
    block::{Direction, FaceMask},
    neighborhood::ChunkNeighborhood,
};
use crate::engine::voxels::chunk_index::{at, to_index};

/// Computes per-voxel face masks from a [`ChunkNeighborhood`].
///
/// Each voxel's mask depends only on its six neighbours, so cells can be
/// processed in any order.
pub struct FaceVisibilityBuilder;

impl FaceVisibilityBuilder {
    /// Face mask of one cell of the centre chunk.
    #[inline]
    pub fn voxel_mask(neighborhood: &ChunkNeighborhood, local: Point3<i32>) -> FaceMask {
        let mut mask = FaceMask::EMPTY;
        for direction in Direction::ALL {
            let neighbor: Point3<i32> = local + direction.offset();
            if !neighborhood.is_solid(neighbor) {
                mask.insert(direction);
            }
        }
        mask
    }

    /// Face masks for every cell of the centre chunk, in flat index order.
    pub fn build(neighborhood: &ChunkNeighborhood) -> Vec<FaceMask> {
        let size = neighborhood.size();
        let mut masks = vec![FaceMask::EMPTY; size * size * size];
        for z in 0..size {
            for y in 0..size {
                for x in 0..size {
                    let local = Point3::new(x as i32, y as i32, z as i32);
                    masks[to_index(x, y, z, size)] = Self::voxel_mask(neighborhood, local);
                }
            }
        }
        masks
    }

    /// Number of faces that will be meshed: visible faces of non-empty voxels.
    pub fn count_visible_faces(neighborhood: &ChunkNeighborhood, masks: &[FaceMask]) -> usize {
        let size = neighborhood.size();
        masks
            .iter()
            .enumerate()
            .filter(|(index, _)| {
                let p = at(*index, size);
                !neighborhood
                    .voxel(Point3::new(p.x as i32, p.y as i32, p.z as i32))
                    .is_empty()
            })
            .map(|(_, mask)| mask.count() as usize)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;
    use crate::engine::voxels::{block::Voxel, chunk::VoxelGrid, lighting::LightLevel};

    #[test]
    fn lone_block_shows_all_faces() {
        let mut grid = VoxelGrid::new(4);
        grid.set_voxel(grid.index(1, 1, 1), Voxel::Stone);
        let masks = FaceVisibilityBuilder::build(&ChunkNeighborhood::isolated(&grid));

        assert_eq!(masks[grid.index(1, 1, 1)], FaceMask::ALL);
        assert!(!masks[grid.index(2, 1, 1)].contains(Direction::Left));
        assert!(masks[grid.index(2, 1, 1)].contains(Direction::Right));
    }

    #[test]
    fn solid_chunk_without_neighbours_shows_only_its_shell() {
        let grid = VoxelGrid::filled(3, Voxel::Dirt, LightLevel::DARK);
        let neighborhood = ChunkNeighborhood::isolated(&grid);
        let masks = FaceVisibilityBuilder::build(&neighborhood);

        assert_eq!(masks[grid.index(1, 1, 1)], FaceMask::EMPTY);
        assert_eq!(masks[grid.index(0, 1, 1)], FaceMask::from_iter([Direction::Left]));
        assert_eq!(FaceVisibilityBuilder::count_visible_faces(&neighborhood, &masks), 6 * 9);
    }

    #[test]
    fn loaded_solid_neighbour_hides_boundary_faces() {
        let grid = VoxelGrid::filled(3, Voxel::Dirt, LightLevel::DARK);
        let mut neighborhood = ChunkNeighborhood::isolated(&grid);
        neighborhood.copy_from(Vector3::new(0, 1, 0), &grid);
        let masks = FaceVisibilityBuilder::build(&neighborhood);

        assert!(!masks[grid.index(1, 2, 1)].contains(Direction::Up));
        assert!(masks[grid.index(1, 0, 1)].contains(Direction::Down));
    }
}
