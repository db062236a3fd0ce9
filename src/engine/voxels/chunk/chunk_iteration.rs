//! # Chunk Iteration Module
//!
//! Iterates the cells of a chunk that produce geometry: non-empty voxels
//! with at least one visible face. Empty space and fully buried voxels are
//! skipped without touching the caller.

use cgmath::Point3;

use crate::engine::voxels::block::{FaceMask, Voxel};

use super::VoxelGrid;

/// A voxel that has at least one face to mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleVoxel {
    /// Flat index inside the grid.
    pub index: usize,
    /// Local position inside the chunk.
    pub position: Point3<usize>,
    /// The voxel type.
    pub voxel: Voxel,
    /// Faces bordering transparent space.
    pub faces: FaceMask,
}

/// Iterator over the meshable voxels of a grid, in flat index order.
pub struct VisibleVoxelIterator<'a> {
    grid: &'a VoxelGrid,
    masks: &'a [FaceMask],
    current_index: usize,
}

impl<'a> VisibleVoxelIterator<'a> {
    /// Iterates `grid` using the face masks stored in the grid itself.
    pub fn new(grid: &'a VoxelGrid) -> Self {
        Self::with_masks(grid, grid.face_masks())
    }

    /// Iterates `grid` using a freshly computed mask array.
    ///
    /// # Panics
    /// Panics if `masks` does not match the grid volume.
    pub fn with_masks(grid: &'a VoxelGrid, masks: &'a [FaceMask]) -> Self {
        assert_eq!(masks.len(), grid.volume(), "face mask array does not match chunk volume");
        VisibleVoxelIterator {
            grid,
            masks,
            current_index: 0,
        }
    }
}

impl Iterator for VisibleVoxelIterator<'_> {
    type Item = VisibleVoxel;

    fn next(&mut self) -> Option<Self::Item> {
        while self.current_index < self.grid.volume() {
            let index = self.current_index;
            self.current_index += 1;

            let voxel = self.grid.voxel(index);
            let faces = self.masks[index];
            if voxel.is_empty() || faces.is_empty() {
                continue;
            }

            return Some(VisibleVoxel {
                index,
                position: self.grid.at(index),
                voxel,
                faces,
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::voxels::block::Direction;

    #[test]
    fn skips_empty_and_buried_voxels() {
        let mut grid = VoxelGrid::new(3);
        let visible = grid.index(0, 0, 0);
        let buried = grid.index(1, 1, 1);
        let empty = grid.index(2, 2, 2);
        grid.set_voxel(visible, Voxel::Dirt);
        grid.set_voxel(buried, Voxel::Stone);

        let mut masks = vec![FaceMask::EMPTY; grid.volume()];
        masks[visible].insert(Direction::Up);
        masks[empty] = FaceMask::ALL;

        let found: Vec<_> = VisibleVoxelIterator::with_masks(&grid, &masks).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].position, Point3::new(0, 0, 0));
        assert_eq!(found[0].voxel, Voxel::Dirt);
    }
}
