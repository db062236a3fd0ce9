//! Smooth per-vertex lighting.
//!
//! Each face corner averages four cells in the layer just outside the face:
//! the cell straight out from the face, the two edge cells touching the
//! corner and the diagonal cell between them. Each cell contributes the
//! stronger of its block and sky light. Solid cells hold no light, which
//! darkens corners tucked against geometry.

use cgmath::Point3;

use super::face::{FaceBasis, CORNER_SIGNS};
use crate::engine::voxels::{lighting::MAX_LIGHT, neighborhood::ChunkNeighborhood};

/// Triangle split along the lower-left to upper-right diagonal.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 1, 3];
/// Triangle split along the lower-right to upper-left diagonal.
pub const FLIPPED_QUAD_INDICES: [u32; 6] = [0, 1, 3, 0, 3, 2];

/// Sum of the four light samples of each corner, in `0..=60`.
pub fn corner_samples(
    neighborhood: &ChunkNeighborhood,
    position: Point3<i32>,
    basis: &FaceBasis,
) -> [u16; 4] {
    let out = position + basis.normal;
    let sample = |p: Point3<i32>| neighborhood.light(p).brightness() as u16;
    let center = sample(out);

    CORNER_SIGNS.map(|(su, sv)| {
        let edge_u = out + basis.u * su;
        let edge_v = out + basis.v * sv;
        let diagonal = edge_u + basis.v * sv;
        center + sample(edge_u) + sample(edge_v) + sample(diagonal)
    })
}

/// Normalised brightness of a corner sum.
#[inline]
pub fn corner_brightness(sum: u16) -> f32 {
    sum as f32 / 4.0 / MAX_LIGHT as f32
}

/// `true` when corners 0 and 3 are together brighter than corners 1 and 2;
/// the quad is then split along the other diagonal.
#[inline]
pub fn flip_diagonal(samples: [u16; 4]) -> bool {
    samples[0] + samples[3] > samples[1] + samples[2]
}

/// Index pattern for a quad with the given corner samples.
#[inline]
pub fn quad_indices(samples: [u16; 4]) -> [u32; 6] {
    if flip_diagonal(samples) {
        FLIPPED_QUAD_INDICES
    } else {
        QUAD_INDICES
    }
}
