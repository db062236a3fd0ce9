//! # Terrain Generation
//!
//! Fills a chunk from a 2-D heightfield and an optional 3-D cave volume.
//!
//! Heights are sampled over normalised chunk coordinates: a column at local
//! `(x, z)` samples `(x / (size - 1) + cx, z / (size - 1) + cz)`, and a cell at
//! local `y` is solid while `y / (size - 1) + cy` is below the sample. With
//! samples in `[0, 1]` this puts the whole surface inside chunk row `cy = 0`.

use cgmath::Point3;
use log::debug;
use noise::{NoiseFn, Perlin};
use web_time::Instant;

use super::{block::Voxel, chunk::VoxelGrid, lighting::LightLevel};
use crate::config::TerrainConfig;

/// Terrain height function over normalised chunk coordinates.
///
/// Implementations must be pure: the same inputs always give the same
/// height, which should lie in `[0, 1]`.
pub trait HeightfieldSample: Send + Sync {
    fn sample(&self, fx: f32, fz: f32, chunk_offset: Point3<i32>) -> f32;
}

impl<F> HeightfieldSample for F
where
    F: Fn(f32, f32, Point3<i32>) -> f32 + Send + Sync,
{
    fn sample(&self, fx: f32, fz: f32, chunk_offset: Point3<i32>) -> f32 {
        self(fx, fz, chunk_offset)
    }
}

/// 3-D noise over world voxel coordinates.
pub trait VolumeSample: Send + Sync {
    fn sample(&self, x: f64, y: f64, z: f64) -> f64;
}

impl<F> VolumeSample for F
where
    F: Fn(f64, f64, f64) -> f64 + Send + Sync,
{
    fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        self(x, y, z)
    }
}

/// Constant height everywhere.
#[derive(Debug, Clone, Copy)]
pub struct FlatHeightfield(pub f32);

impl HeightfieldSample for FlatHeightfield {
    fn sample(&self, _fx: f32, _fz: f32, _chunk_offset: Point3<i32>) -> f32 {
        self.0
    }
}

/// Rolling hills from 2-D Perlin noise, remapped to `[0, 1]`.
pub struct PerlinHeightfield {
    noise: Perlin,
    frequency: f64,
}

impl PerlinHeightfield {
    pub fn new(seed: u32, frequency: f64) -> Self {
        PerlinHeightfield {
            noise: Perlin::new(seed),
            frequency,
        }
    }
}

impl HeightfieldSample for PerlinHeightfield {
    fn sample(&self, fx: f32, fz: f32, chunk_offset: Point3<i32>) -> f32 {
        let x = (fx as f64 + chunk_offset.x as f64) * self.frequency;
        let z = (fz as f64 + chunk_offset.z as f64) * self.frequency;
        let value = self.noise.get([x, z]);
        ((value + 1.0) * 0.5).clamp(0.0, 1.0) as f32
    }
}

/// Cave volume from 3-D Perlin noise.
pub struct PerlinCaves {
    noise: Perlin,
    frequency: f64,
}

impl PerlinCaves {
    pub fn new(seed: u32, frequency: f64) -> Self {
        PerlinCaves {
            // Offset seed so caves do not mirror the height noise.
            noise: Perlin::new(seed.wrapping_add(0x9e37_79b9)),
            frequency,
        }
    }
}

impl VolumeSample for PerlinCaves {
    fn sample(&self, x: f64, y: f64, z: f64) -> f64 {
        self.noise
            .get([x * self.frequency, y * self.frequency, z * self.frequency])
    }
}

struct Caves {
    volume: Box<dyn VolumeSample>,
    threshold: f64,
}

/// Produces terrain grids for chunk coordinates.
pub struct TerrainGenerator {
    heightfield: Box<dyn HeightfieldSample>,
    caves: Option<Caves>,
}

impl TerrainGenerator {
    pub fn new(heightfield: impl HeightfieldSample + 'static) -> Self {
        TerrainGenerator {
            heightfield: Box::new(heightfield),
            caves: None,
        }
    }

    /// Carves solid cells where `|volume| < threshold`.
    pub fn with_caves(mut self, volume: impl VolumeSample + 'static, threshold: f64) -> Self {
        self.caves = Some(Caves {
            volume: Box::new(volume),
            threshold,
        });
        self
    }

    /// Perlin hills, plus Perlin caves if enabled.
    pub fn from_config(config: &TerrainConfig) -> Self {
        let generator = TerrainGenerator::new(PerlinHeightfield::new(config.seed, config.frequency));
        if config.caves {
            generator.with_caves(
                PerlinCaves::new(config.seed, config.cave_frequency),
                config.cave_threshold,
            )
        } else {
            generator
        }
    }

    /// Generates the grid of the chunk at `position`.
    pub fn generate(&self, position: Point3<i32>, size: usize) -> VoxelGrid {
        let start = Instant::now();
        let mut grid = generate_terrain(self.heightfield.as_ref(), position, size);

        if let Some(caves) = &self.caves {
            carve_caves(&mut grid, position, caves);
        }

        debug!(
            "Generated terrain for chunk {:?} in {:?}",
            position,
            start.elapsed()
        );
        grid
    }
}

/// Fills a grid from a heightfield.
///
/// Solid cells are `Grass` where the next cell up is above the surface and
/// `Dirt` below that, with no light. Open cells are `Empty` with full sky
/// light.
pub fn generate_terrain(
    heightfield: &dyn HeightfieldSample,
    offset: Point3<i32>,
    size: usize,
) -> VoxelGrid {
    let mut grid = VoxelGrid::new(size);
    let step = 1.0 / (size.max(2) - 1) as f32;
    let normalized = |local: usize, chunk: i32| local as f32 * step + chunk as f32;

    for z in 0..size {
        for x in 0..size {
            let height = heightfield.sample(
                normalized(x, offset.x),
                normalized(z, offset.z),
                offset,
            );

            for y in 0..size {
                let fy = normalized(y, offset.y);
                let index = grid.index(x, y, z);
                if fy < height {
                    let voxel = if fy + step < height {
                        Voxel::Dirt
                    } else {
                        Voxel::Grass
                    };
                    grid.set_voxel(index, voxel);
                    grid.set_light(index, LightLevel::DARK);
                } else {
                    grid.set_voxel(index, Voxel::Empty);
                    grid.set_light(index, LightLevel::SKY);
                }
            }
        }
    }
    grid
}

fn carve_caves(grid: &mut VoxelGrid, position: Point3<i32>, caves: &Caves) {
    let size = grid.size() as i32;
    for index in 0..grid.volume() {
        if grid.voxel(index).is_empty() {
            continue;
        }
        let local = grid.at(index);
        let x = (position.x * size + local.x as i32) as f64;
        let y = (position.y * size + local.y as i32) as f64;
        let z = (position.z * size + local.z as i32) as f64;
        if caves.volume.sample(x, y, z).abs() < caves.threshold {
            grid.set_voxel(index, Voxel::Empty);
            grid.set_light(index, LightLevel::DARK);
        }
    }
}
