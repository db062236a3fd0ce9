//! # Chunk Neighbourhood
//!
//! A padded copy of one chunk plus the one-voxel shell of its 26 neighbours.
//! Face visibility and smooth lighting both look one voxel past the chunk
//! edge; reading from this snapshot lets a worker mesh a chunk without
//! holding any lock while it works.
//!
//! Padded coordinates run from `-1` to `size` on every axis. Cells that fall
//! in an unloaded neighbour read as empty space lit by full sky light.

use bitvec::prelude::BitVec;
use cgmath::{Point3, Vector3};
use log::debug;

use super::{
    block::Voxel, chunk::VoxelGrid, chunk_index::ChunkHandle, lighting::LightLevel,
};

/// Number of chunks in a 3×3×3 block.
pub const NEIGHBORHOOD_CHUNKS: usize = 27;

/// Slot of a neighbour offset with components in `-1..=1`.
#[inline]
pub fn offset_slot(offset: Vector3<i32>) -> usize {
    ((offset.x + 1) + 3 * (offset.y + 1) + 9 * (offset.z + 1)) as usize
}

/// Inverse of [`offset_slot`].
#[inline]
pub fn slot_offset(slot: usize) -> Vector3<i32> {
    let slot = slot as i32;
    Vector3::new(slot % 3 - 1, (slot / 3) % 3 - 1, slot / 9 - 1)
}

/// Handles of the live chunks around a centre chunk, captured on the main
/// thread and read on a worker.
#[derive(Clone)]
pub struct NeighborhoodHandles {
    pub position: Point3<i32>,
    pub size: usize,
    /// Indexed by [`offset_slot`]. `None` for chunks that are not live.
    pub chunks: Vec<Option<ChunkHandle>>,
}

impl NeighborhoodHandles {
    pub fn center(&self) -> Option<&ChunkHandle> {
        self.chunks[offset_slot(Vector3::new(0, 0, 0))].as_ref()
    }
}

/// Padded voxel and light snapshot.
#[derive(Debug, Clone)]
pub struct ChunkNeighborhood {
    size: usize,
    center: VoxelGrid,
    padded: usize,
    voxels: Vec<Voxel>,
    light: Vec<LightLevel>,
    solid: BitVec,
    loaded: BitVec,
}

impl ChunkNeighborhood {
    /// A neighbourhood with nothing loaded.
    pub fn new(size: usize) -> Self {
        let padded = size + 2;
        let volume = padded * padded * padded;
        ChunkNeighborhood {
            size,
            center: VoxelGrid::new(size),
            padded,
            voxels: vec![Voxel::Empty; volume],
            light: vec![LightLevel::SKY; volume],
            solid: BitVec::repeat(false, volume),
            loaded: BitVec::repeat(false, volume),
        }
    }

    /// Copies the centre chunk and its live neighbours, locking one chunk at
    /// a time.
    pub fn capture(handles: &NeighborhoodHandles) -> Self {
        let mut neighborhood = Self::new(handles.size);
        for (slot, handle) in handles.chunks.iter().enumerate() {
            let Some(handle) = handle else {
                continue;
            };
            let chunk = handle.read();
            if !chunk.is_live() {
                debug!(
                    "Chunk {:?} unloaded its terrain before the neighbourhood of {:?} was captured",
                    chunk.position, handles.position
                );
                continue;
            }
            neighborhood.copy_from(slot_offset(slot), chunk.grid());
        }
        neighborhood
    }

    /// Builds a neighbourhood from a lone grid with nothing around it.
    pub fn isolated(grid: &VoxelGrid) -> Self {
        let mut neighborhood = Self::new(grid.size());
        neighborhood.copy_from(Vector3::new(0, 0, 0), grid);
        neighborhood
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Unpadded copy of the centre chunk. Empty if the centre was not live.
    pub fn center(&self) -> &VoxelGrid {
        &self.center
    }

    /// Copies the part of `grid` that falls inside the padded region when the
    /// grid sits at chunk `offset` relative to the centre.
    ///
    /// # Panics
    /// Panics if the grid size differs from the neighbourhood's.
    pub fn copy_from(&mut self, offset: Vector3<i32>, grid: &VoxelGrid) {
        assert_eq!(
            grid.size(),
            self.size,
            "neighbour chunk size does not match neighbourhood"
        );
        if offset == Vector3::new(0, 0, 0) {
            self.center.copy_from(grid);
        }

        let size = self.size;
        // Source range and the padded coordinate of its first cell per axis.
        let span = |o: i32| -> (std::ops::Range<usize>, i32) {
            match o {
                -1 => (size - 1..size, -1),
                0 => (0..size, 0),
                _ => (0..1, size as i32),
            }
        };
        let (xs, px) = span(offset.x);
        let (ys, py) = span(offset.y);
        let (zs, pz) = span(offset.z);

        for (dz, z) in zs.enumerate() {
            for (dy, y) in ys.clone().enumerate() {
                for (dx, x) in xs.clone().enumerate() {
                    let source = grid.index(x, y, z);
                    let target = self.padded_index(Point3::new(
                        px + dx as i32,
                        py + dy as i32,
                        pz + dz as i32,
                    ));
                    let voxel = grid.voxel(source);
                    self.voxels[target] = voxel;
                    self.light[target] = grid.light(source);
                    self.solid.set(target, !voxel.is_transparent());
                    self.loaded.set(target, true);
                }
            }
        }
    }

    #[inline]
    fn padded_index(&self, p: Point3<i32>) -> usize {
        debug_assert!(
            [p.x, p.y, p.z].iter().all(|&c| c >= -1 && c <= self.size as i32),
            "{:?} outside padded neighbourhood",
            p
        );
        let padded = self.padded;
        (p.z + 1) as usize * padded * padded + (p.y + 1) as usize * padded + (p.x + 1) as usize
    }

    #[inline]
    pub fn voxel(&self, p: Point3<i32>) -> Voxel {
        self.voxels[self.padded_index(p)]
    }

    #[inline]
    pub fn light(&self, p: Point3<i32>) -> LightLevel {
        self.light[self.padded_index(p)]
    }

    /// The cell blocks light and hides faces.
    #[inline]
    pub fn is_solid(&self, p: Point3<i32>) -> bool {
        self.solid[self.padded_index(p)]
    }

    /// The cell was copied from a live chunk.
    #[inline]
    pub fn is_loaded(&self, p: Point3<i32>) -> bool {
        self.loaded[self.padded_index(p)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::voxels::lighting::MAX_LIGHT;

    #[test]
    fn slots_round_trip() {
        for slot in 0..NEIGHBORHOOD_CHUNKS {
            assert_eq!(offset_slot(slot_offset(slot)), slot);
        }
        assert_eq!(offset_slot(Vector3::new(0, 0, 0)), 13);
    }

    #[test]
    fn unloaded_cells_read_as_open_sky() {
        let neighborhood = ChunkNeighborhood::new(4);
        let outside = Point3::new(-1, 2, 4);
        assert_eq!(neighborhood.voxel(outside), Voxel::Empty);
        assert_eq!(neighborhood.light(outside).sky(), MAX_LIGHT);
        assert!(!neighborhood.is_loaded(outside));
    }

    #[test]
    fn neighbour_contributes_only_its_facing_layer() {
        let mut right = VoxelGrid::new(4);
        right.set_voxel(right.index(0, 1, 2), Voxel::Stone);
        right.set_voxel(right.index(1, 1, 2), Voxel::Stone);

        let mut neighborhood = ChunkNeighborhood::isolated(&VoxelGrid::new(4));
        neighborhood.copy_from(Vector3::new(1, 0, 0), &right);

        assert!(neighborhood.is_solid(Point3::new(4, 1, 2)));
        assert!(neighborhood.is_loaded(Point3::new(4, 0, 0)));
        assert!(!neighborhood.is_loaded(Point3::new(-1, 0, 0)));
        assert!(!neighborhood.is_solid(Point3::new(3, 1, 2)));
    }

    #[test]
    fn corner_neighbour_fills_one_cell() {
        let grid = VoxelGrid::filled(3, Voxel::Dirt, LightLevel::DARK);
        let mut neighborhood = ChunkNeighborhood::new(3);
        neighborhood.copy_from(Vector3::new(-1, 1, -1), &grid);

        assert!(neighborhood.is_solid(Point3::new(-1, 3, -1)));
        assert!(!neighborhood.is_loaded(Point3::new(-1, 3, 0)));
    }

    #[test]
    #[should_panic(expected = "does not match")]
    fn mismatched_sizes_panic() {
        ChunkNeighborhood::new(4).copy_from(Vector3::new(0, 0, 0), &VoxelGrid::new(5));
    }
}
