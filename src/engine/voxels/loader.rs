//! # Chunk Streaming
//!
//! Decides which chunks should exist around a moving loader position. A
//! [`ChunkLoader`] only produces a [`LoadPlan`]; the engine applies it by
//! calling `create_chunk` / `destroy_chunk` on the world.

use std::collections::HashSet;

use cgmath::Point3;

/// Chunks to create and destroy, each sorted in ascending coordinate order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadPlan {
    pub create: Vec<Point3<i32>>,
    pub destroy: Vec<Point3<i32>>,
}

impl LoadPlan {
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.destroy.is_empty()
    }
}

/// Strategy for choosing the loaded set around a loader.
pub trait ChunkLoader: Send {
    /// Whether `position` should be loaded while the loader sits in
    /// `center_chunk`.
    fn wants(&self, center_chunk: Point3<i32>, position: Point3<i32>) -> bool;

    /// Every chunk that should be loaded around `center_chunk`.
    fn desired(&self, center_chunk: Point3<i32>) -> Vec<Point3<i32>>;

    /// Diffs the desired set against the chunks currently loaded.
    fn plan(&self, center_chunk: Point3<i32>, loaded: &[Point3<i32>]) -> LoadPlan {
        let loaded_set: HashSet<Point3<i32>> = loaded.iter().copied().collect();

        let mut create: Vec<_> = self
            .desired(center_chunk)
            .into_iter()
            .filter(|position| !loaded_set.contains(position))
            .collect();
        let mut destroy: Vec<_> = loaded
            .iter()
            .copied()
            .filter(|&position| !self.wants(center_chunk, position))
            .collect();

        create.sort_by_key(|p| (p.x, p.y, p.z));
        create.dedup();
        destroy.sort_by_key(|p| (p.x, p.y, p.z));
        destroy.dedup();
        LoadPlan { create, destroy }
    }
}

/// Loads the box of chunks within `radius` horizontally and
/// `vertical_radius` vertically of the loader's chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadiusChunkLoader {
    pub radius: i32,
    pub vertical_radius: i32,
}

impl RadiusChunkLoader {
    pub fn new(radius: i32, vertical_radius: i32) -> Self {
        RadiusChunkLoader {
            radius: radius.max(0),
            vertical_radius: vertical_radius.max(0),
        }
    }
}

impl ChunkLoader for RadiusChunkLoader {
    fn wants(&self, center: Point3<i32>, position: Point3<i32>) -> bool {
        (position.x - center.x).abs() <= self.radius
            && (position.z - center.z).abs() <= self.radius
            && (position.y - center.y).abs() <= self.vertical_radius
    }

    fn desired(&self, center: Point3<i32>) -> Vec<Point3<i32>> {
        let r = self.radius;
        let v = self.vertical_radius;
        let mut positions = Vec::with_capacity(((2 * r + 1) * (2 * r + 1) * (2 * v + 1)) as usize);
        for x in -r..=r {
            for y in -v..=v {
                for z in -r..=r {
                    positions.push(Point3::new(center.x + x, center.y + y, center.z + z));
                }
            }
        }
        positions
    }
}
