//! # Block Module
//!
//! Voxel type definitions, face directions and the per-face material table.

use phf::phf_map;

pub mod block_side;
pub mod block_type;

pub use block_side::{Direction, FaceMask};
pub use block_type::Voxel;

/// The underlying integer type used to store voxel types.
pub type VoxelTypeSize = u8;

/// Texture array layer used for each face of each voxel type.
///
/// Keyed by the voxel's `VoxelTypeSize` tag. The inner array is indexed by
/// [`Direction`] in the order `[Up, Down, Left, Right, Backward, Forward]`.
/// Types missing from the table (such as `Empty`) are never meshed.
pub static MATERIAL_LAYERS: phf::Map<u8, [u32; 6]> = phf_map! {
    1u8 => [1, 1, 1, 1, 1, 1], // Dirt
    2u8 => [3, 1, 2, 2, 2, 2], // Grass (top: 3, bottom: dirt, sides: 2)
    3u8 => [0, 0, 0, 0, 0, 0], // Wood
    4u8 => [5, 5, 5, 5, 5, 5], // Stone
    5u8 => [6, 6, 6, 6, 6, 6], // Lamp
};

/// Returns the texture layer for one face of a voxel type.
pub fn material_layer(voxel: Voxel, direction: Direction) -> u32 {
    MATERIAL_LAYERS
        .get(&(voxel as VoxelTypeSize))
        .map(|layers| layers[direction as usize])
        .unwrap_or(0)
}
