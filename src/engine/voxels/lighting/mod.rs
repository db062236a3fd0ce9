//! # Lighting
//!
//! Two independent 4-bit light channels flood through transparent voxels:
//!
//! * **Block light** spreads from emitting voxels such as lamps.
//! * **Sky light** spreads from open sky. Travelling straight down at full
//!   strength it does not decay, so an unobstructed shaft stays at
//!   [`MAX_LIGHT`] all the way to the ground.
//!
//! Both channels share one packed byte per voxel: the low nibble holds block
//! light and the high nibble holds sky light.
//!
//! Raising light is a breadth-first flood fill (propagation). Lowering it
//! clears every cell that depended on the removed light and then lets the
//! surviving sources flood back in (depropagation). See
//! [`LightPropagationEngine`] for the algorithm.

use crate::engine::voxels::block::Direction;

pub mod propagation;
pub mod queues;

pub use propagation::{unload_transfers, BoundaryTransfer, LightPropagationEngine, ResolveReport};
pub use queues::{ChangeSet, LightQueues};

/// Brightest value either channel can hold.
pub const MAX_LIGHT: u8 = 15;

/// Selects one of the two light channels packed into a [`LightLevel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LightChannel {
    /// Light emitted by blocks, stored in the low nibble.
    Block = 0,
    /// Ambient light from the sky, stored in the high nibble.
    Sky = 1,
}

impl LightChannel {
    /// Both channels, block first.
    pub const ALL: [LightChannel; 2] = [LightChannel::Block, LightChannel::Sky];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    fn shift(self) -> u8 {
        match self {
            LightChannel::Block => 0,
            LightChannel::Sky => 4,
        }
    }
}

/// Block and sky light of one voxel, packed into a byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LightLevel(u8);

impl LightLevel {
    /// Both channels dark.
    pub const DARK: LightLevel = LightLevel(0);
    /// Open air under the sky, no block light.
    pub const SKY: LightLevel = LightLevel(MAX_LIGHT << 4);

    /// Packs two levels. Values above [`MAX_LIGHT`] are clamped.
    pub fn new(block: u8, sky: u8) -> Self {
        LightLevel(block.min(MAX_LIGHT) | (sky.min(MAX_LIGHT) << 4))
    }

    /// Reinterprets a stored byte.
    pub const fn from_packed(packed: u8) -> Self {
        LightLevel(packed)
    }

    /// The stored byte.
    pub const fn packed(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn block(self) -> u8 {
        self.get(LightChannel::Block)
    }

    #[inline]
    pub fn sky(self) -> u8 {
        self.get(LightChannel::Sky)
    }

    #[inline]
    pub fn get(self, channel: LightChannel) -> u8 {
        (self.0 >> channel.shift()) & MAX_LIGHT
    }

    /// Copy with one channel replaced.
    #[inline]
    pub fn with(self, channel: LightChannel, level: u8) -> Self {
        let shift = channel.shift();
        let cleared = self.0 & !(MAX_LIGHT << shift);
        LightLevel(cleared | (level.min(MAX_LIGHT) << shift))
    }

    /// Brightness used for shading: the stronger of the two channels.
    #[inline]
    pub fn brightness(self) -> u8 {
        self.block().max(self.sky())
    }
}

/// How a queued light change is interpreted when it is drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightChangeMode {
    /// Compare with the stored level: brighter values propagate, anything
    /// else depropagates.
    Regular,
    /// The sender already decided the cell must be raised.
    Propagate,
    /// The sender already decided the cell lost a source it relied on.
    Depropagate,
}

/// A queued light-set request against one cell of a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingLightChange {
    /// Flat index inside the owning chunk.
    pub index: usize,
    pub channel: LightChannel,
    pub level: u8,
    pub mode: LightChangeMode,
}

/// Level a neighbour receives from a cell lit at `level` across `direction`.
#[inline]
pub(crate) fn transmitted(level: u8, direction: Direction, channel: LightChannel) -> u8 {
    if channel == LightChannel::Sky && direction == Direction::Down && level == MAX_LIGHT {
        MAX_LIGHT
    } else {
        level.saturating_sub(1)
    }
}

/// Whether a neighbour lit at `neighbor` across `direction` may owe its
/// light to a cell that held `cleared` before being reset.
#[inline]
pub(crate) fn depends(neighbor: u8, cleared: u8, direction: Direction, channel: LightChannel) -> bool {
    neighbor < cleared
        || (channel == LightChannel::Sky
            && direction == Direction::Down
            && cleared == MAX_LIGHT
            && neighbor == MAX_LIGHT)
}
