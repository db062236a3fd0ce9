//! # Voxel Grid
//!
//! Flat per-chunk storage: one voxel tag, one packed light byte and one face
//! mask per cell, all indexed by `z * size² + y * size + x`.

use cgmath::Point3;

use crate::{
    engine::voxels::{
        block::{Direction, FaceMask, Voxel},
        chunk_index::{at, to_index},
        lighting::{LightChannel, LightLevel},
    },
    error::VoxelError,
};

/// Where the neighbour of a cell lies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighborCell {
    /// Inside the same grid, at this flat index.
    Inside(usize),
    /// In the face-adjacent chunk across `direction`, at this flat index of
    /// that chunk's grid.
    Outside {
        /// Face crossed to reach the neighbour chunk.
        direction: Direction,
        /// Flat index inside the neighbour chunk.
        index: usize,
    },
}

/// Voxel, light and face-visibility arrays of one cubic chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelGrid {
    size: usize,
    voxels: Vec<Voxel>,
    light: Vec<LightLevel>,
    faces: Vec<FaceMask>,
}

impl VoxelGrid {
    /// Creates an all-empty, unlit grid.
    pub fn new(size: usize) -> Self {
        Self::filled(size, Voxel::Empty, LightLevel::DARK)
    }

    /// Creates a grid with every cell set to `voxel` and `light`.
    pub fn filled(size: usize, voxel: Voxel, light: LightLevel) -> Self {
        assert!(size > 0, "chunk size must be positive");
        let volume = size * size * size;
        VoxelGrid {
            size,
            voxels: vec![voxel; volume],
            light: vec![light; volume],
            faces: vec![FaceMask::EMPTY; volume],
        }
    }

    /// Voxels per edge.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total number of cells.
    #[inline]
    pub fn volume(&self) -> usize {
        self.voxels.len()
    }

    /// Flat index of an in-bounds local coordinate.
    #[inline]
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        debug_assert!(x < self.size && y < self.size && z < self.size);
        to_index(x, y, z, self.size)
    }

    /// Local coordinate of a flat index.
    #[inline]
    pub fn at(&self, index: usize) -> Point3<usize> {
        at(index, self.size)
    }

    /// Validates a caller-supplied local coordinate and returns its index.
    pub fn checked_index(&self, local: Point3<i32>) -> Result<usize, VoxelError> {
        let size = self.size as i32;
        let in_range = |v: i32| (0..size).contains(&v);
        if in_range(local.x) && in_range(local.y) && in_range(local.z) {
            Ok(self.index(local.x as usize, local.y as usize, local.z as usize))
        } else {
            Err(VoxelError::out_of_bounds(local, self.size))
        }
    }

    #[inline]
    pub fn voxel(&self, index: usize) -> Voxel {
        self.voxels[index]
    }

    #[inline]
    pub fn set_voxel(&mut self, index: usize, voxel: Voxel) {
        self.voxels[index] = voxel;
    }

    #[inline]
    pub fn light(&self, index: usize) -> LightLevel {
        self.light[index]
    }

    #[inline]
    pub fn set_light(&mut self, index: usize, light: LightLevel) {
        self.light[index] = light;
    }

    /// Light on a single channel.
    #[inline]
    pub fn light_channel(&self, index: usize, channel: LightChannel) -> u8 {
        self.light[index].get(channel)
    }

    /// Sets one channel, leaving the other untouched. Returns `true` if the
    /// stored value changed.
    #[inline]
    pub fn set_light_channel(&mut self, index: usize, channel: LightChannel, level: u8) -> bool {
        let old = self.light[index];
        let new = old.with(channel, level);
        self.light[index] = new;
        old != new
    }

    #[inline]
    pub fn face_mask(&self, index: usize) -> FaceMask {
        self.faces[index]
    }

    /// Replaces every face mask at once.
    ///
    /// # Panics
    /// Panics if `masks` does not hold exactly one entry per cell.
    pub fn set_face_masks(&mut self, masks: Vec<FaceMask>) {
        assert_eq!(
            masks.len(),
            self.volume(),
            "face mask array does not match chunk volume"
        );
        self.faces = masks;
    }

    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    pub fn light_levels(&self) -> &[LightLevel] {
        &self.light
    }

    pub fn face_masks(&self) -> &[FaceMask] {
        &self.faces
    }

    /// Copies voxel and light data from a grid of identical dimensions.
    ///
    /// # Panics
    /// Panics if the grids differ in size.
    pub fn copy_from(&mut self, other: &VoxelGrid) {
        assert_eq!(self.size, other.size, "cannot copy between chunks of different sizes");
        self.voxels.copy_from_slice(&other.voxels);
        self.light.copy_from_slice(&other.light);
        self.faces.copy_from_slice(&other.faces);
    }

    /// Flat indices of the cell layer on face `direction`.
    pub fn face_indices(&self, direction: Direction) -> impl Iterator<Item = usize> + '_ {
        let size = self.size;
        let fixed = if direction.is_positive() { size - 1 } else { 0 };
        let axis = direction.axis();
        (0..size * size).map(move |cell| {
            let (a, b) = (cell % size, cell / size);
            match axis {
                0 => self.index(fixed, a, b),
                1 => self.index(a, fixed, b),
                _ => self.index(a, b, fixed),
            }
        })
    }

    /// Locates the cell across face `direction` of the cell at `index`.
    ///
    /// Out-of-chunk neighbours are wrapped into the adjacent chunk's frame.
    #[inline]
    pub fn neighbor(&self, index: usize, direction: Direction) -> NeighborCell {
        let size = self.size;
        let position = self.at(index);
        let coordinate = [position.x, position.y, position.z][direction.axis()];
        let stride = [1, size, size * size][direction.axis()];

        if direction.is_positive() {
            if coordinate + 1 < size {
                NeighborCell::Inside(index + stride)
            } else {
                NeighborCell::Outside {
                    direction,
                    index: index - coordinate * stride,
                }
            }
        } else if coordinate > 0 {
            NeighborCell::Inside(index - stride)
        } else {
            NeighborCell::Outside {
                direction,
                index: index + (size - 1) * stride,
            }
        }
    }
}
