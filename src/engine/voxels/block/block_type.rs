//! # Block Type Module
//!
//! The one-byte voxel type tag stored in every grid cell.

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use super::VoxelTypeSize;
use crate::engine::voxels::lighting::{LightChannel, MAX_LIGHT};

/// Enumerates all voxel types in the world.
///
/// A voxel has no identity beyond its grid position. `FromPrimitive` allows
/// recovering the enum from its stored byte.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, FromPrimitive)]
pub enum Voxel {
    /// Open space. Transparent to light and to face culling.
    #[default]
    Empty = 0,

    /// Plain dirt, used below the terrain surface.
    Dirt = 1,

    /// Dirt with a grass top, generated at the terrain surface.
    Grass = 2,

    /// Wood.
    Wood = 3,

    /// Stone.
    Stone = 4,

    /// A solid block that emits block light at full strength.
    Lamp = 5,
}

impl Voxel {
    /// Every voxel type, in tag order.
    pub const ALL: [Voxel; 6] = [
        Voxel::Empty,
        Voxel::Dirt,
        Voxel::Grass,
        Voxel::Wood,
        Voxel::Stone,
        Voxel::Lamp,
    ];

    /// Converts a stored tag back into a `Voxel`, or `None` for unknown tags.
    pub fn from_tag(tag: VoxelTypeSize) -> Option<Self> {
        Voxel::from_u8(tag)
    }

    /// Returns `true` for `Voxel::Empty`.
    #[inline]
    pub fn is_empty(self) -> bool {
        self == Voxel::Empty
    }

    /// Returns `true` if light and face visibility pass through this voxel.
    #[inline]
    pub fn is_transparent(self) -> bool {
        self.is_empty()
    }

    /// Light level this voxel emits on `channel`.
    #[inline]
    pub fn emission(self, channel: LightChannel) -> u8 {
        match (self, channel) {
            (Voxel::Lamp, LightChannel::Block) => MAX_LIGHT,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for voxel in Voxel::ALL {
            assert_eq!(Voxel::from_tag(voxel as u8), Some(voxel));
        }
        assert_eq!(Voxel::from_tag(200), None);
    }

    #[test]
    fn only_lamps_emit_and_only_on_block_channel() {
        assert_eq!(Voxel::Lamp.emission(LightChannel::Block), MAX_LIGHT);
        assert_eq!(Voxel::Lamp.emission(LightChannel::Sky), 0);
        assert_eq!(Voxel::Dirt.emission(LightChannel::Block), 0);
        assert!(!Voxel::Lamp.is_transparent());
        assert!(Voxel::Empty.is_transparent());
    }
}
