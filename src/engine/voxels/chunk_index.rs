//! # Chunk Index
//!
//! Coordinate conversions between world space, voxel space, chunk space and
//! flat in-chunk indices, plus the registry mapping chunk coordinates to
//! chunk handles.
//!
//! Voxels are centred on integer coordinates: the voxel `(0, 0, 0)` spans
//! world positions `[-0.5, 0.5)` times the block size on every axis. World
//! positions are offset by half a block before flooring so that a point
//! exactly on a voxel centre never lands on a boundary.

use std::collections::HashMap;

use cgmath::{Point3, Vector3};

use super::chunk::Chunk;
use crate::core::Shared;

/// Shared handle to a chunk. Only the owning thread takes write locks.
pub type ChunkHandle = Shared<Chunk>;

/// Flat index of a local coordinate: `z * size² + y * size + x`.
#[inline]
pub fn to_index(x: usize, y: usize, z: usize, size: usize) -> usize {
    z * size * size + y * size + x
}

/// Inverse of [`to_index`].
#[inline]
pub fn at(index: usize, size: usize) -> Point3<usize> {
    Point3::new(index % size, (index / size) % size, index / (size * size))
}

/// Voxel containing a world-space position.
pub fn world_to_voxel(world: Point3<f32>, block_size: f32) -> Point3<i32> {
    let snap = |v: f32| (v / block_size + 0.5).floor() as i32;
    Point3::new(snap(world.x), snap(world.y), snap(world.z))
}

/// Chunk containing a voxel.
#[inline]
pub fn voxel_to_chunk(voxel: Point3<i32>, size: usize) -> Point3<i32> {
    let size = size as i32;
    Point3::new(
        voxel.x.div_euclid(size),
        voxel.y.div_euclid(size),
        voxel.z.div_euclid(size),
    )
}

/// Local coordinate of a voxel inside its chunk.
#[inline]
pub fn voxel_to_local(voxel: Point3<i32>, size: usize) -> Point3<usize> {
    let size = size as i32;
    Point3::new(
        voxel.x.rem_euclid(size) as usize,
        voxel.y.rem_euclid(size) as usize,
        voxel.z.rem_euclid(size) as usize,
    )
}

/// Chunk containing a world-space position.
pub fn world_to_chunk(world: Point3<f32>, block_size: f32, size: usize) -> Point3<i32> {
    voxel_to_chunk(world_to_voxel(world, block_size), size)
}

/// Voxel coordinate of local `(0, 0, 0)` of a chunk.
#[inline]
pub fn chunk_origin(chunk: Point3<i32>, size: usize) -> Point3<i32> {
    let size = size as i32;
    Point3::new(chunk.x * size, chunk.y * size, chunk.z * size)
}

/// World-space translation of a chunk's local mesh.
pub fn chunk_world_offset(chunk: Point3<i32>, size: usize, block_size: f32) -> Vector3<f32> {
    let origin = chunk_origin(chunk, size);
    Vector3::new(origin.x as f32, origin.y as f32, origin.z as f32) * block_size
}

/// Total order on chunk coordinates, used wherever iteration order must be
/// deterministic.
#[inline]
pub fn chunk_key(position: Point3<i32>) -> (i32, i32, i32) {
    (position.x, position.y, position.z)
}

/// Inverse of [`chunk_key`].
#[inline]
pub fn key_position(key: (i32, i32, i32)) -> Point3<i32> {
    Point3::new(key.0, key.1, key.2)
}

/// Registry of loaded chunks keyed by chunk coordinate.
///
/// Entries are inserted when a chunk is created and removed when it is
/// destroyed. Nothing else mutates the map, so a lookup never returns a
/// handle to a chunk the world has dropped.
#[derive(Default)]
pub struct ChunkIndex {
    chunks: HashMap<Point3<i32>, ChunkHandle>,
}

impl ChunkIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a chunk. Returns the handle it replaced, if any.
    pub fn insert(&mut self, position: Point3<i32>, handle: ChunkHandle) -> Option<ChunkHandle> {
        self.chunks.insert(position, handle)
    }

    pub fn remove(&mut self, position: Point3<i32>) -> Option<ChunkHandle> {
        self.chunks.remove(&position)
    }

    pub fn get(&self, position: Point3<i32>) -> Option<&ChunkHandle> {
        self.chunks.get(&position)
    }

    pub fn contains(&self, position: Point3<i32>) -> bool {
        self.chunks.contains_key(&position)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Every registered coordinate, sorted by [`chunk_key`].
    pub fn positions(&self) -> Vec<Point3<i32>> {
        let mut positions: Vec<_> = self.chunks.keys().copied().collect();
        positions.sort_by_key(|p| chunk_key(*p));
        positions
    }

    /// Registered chunks in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (Point3<i32>, &ChunkHandle)> {
        self.chunks.iter().map(|(position, handle)| (*position, handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::EuclideanSpace;

    #[test]
    fn index_round_trips_for_every_cell() {
        for size in [2, 5, 16] {
            for z in 0..size {
                for y in 0..size {
                    for x in 0..size {
                        let index = to_index(x, y, z, size);
                        assert!(index < size * size * size);
                        assert_eq!(at(index, size), Point3::new(x, y, z));
                    }
                }
            }
        }
    }

    #[test]
    fn x_varies_fastest() {
        assert_eq!(to_index(1, 0, 0, 16), 1);
        assert_eq!(to_index(0, 1, 0, 16), 16);
        assert_eq!(to_index(0, 0, 1, 16), 256);
    }

    #[test]
    fn world_positions_snap_to_voxel_centres() {
        assert_eq!(world_to_voxel(Point3::new(0.49, -0.5, -0.51), 1.0), Point3::new(0, 0, -1));
        assert_eq!(world_to_voxel(Point3::new(2.0, 3.9, 0.0), 2.0), Point3::new(1, 2, 0));
    }

    #[test]
    fn negative_voxels_map_to_negative_chunks() {
        let voxel = Point3::new(-1, 16, -17);
        assert_eq!(voxel_to_chunk(voxel, 16), Point3::new(-1, 1, -2));
        assert_eq!(voxel_to_local(voxel, 16), Point3::new(15, 0, 15));
        assert_eq!(
            chunk_origin(voxel_to_chunk(voxel, 16), 16) + voxel_to_local(voxel, 16).cast::<i32>().unwrap().to_vec(),
            voxel
        );
    }

    #[test]
    fn positions_are_sorted() {
        let mut index = ChunkIndex::new();
        for position in [Point3::new(1, 0, 0), Point3::new(-1, 2, 0), Point3::new(-1, 0, 5)] {
            index.insert(position, Shared::new(Chunk::new(position, 2)));
        }
        assert_eq!(
            index.positions(),
            vec![Point3::new(-1, 0, 5), Point3::new(-1, 2, 0), Point3::new(1, 0, 0)]
        );
        assert!(index.remove(Point3::new(1, 0, 0)).is_some());
        assert!(!index.contains(Point3::new(1, 0, 0)));
    }
}
