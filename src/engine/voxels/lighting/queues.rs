use std::collections::VecDeque;

use cgmath::Vector3;

use super::LightChannel;

/// The four per-chunk light work queues plus bookkeeping for one
/// resolution pass.
///
/// Queues are FIFO so that light floods breadth-first. They are kept on the
/// chunk between passes so their allocations are reused.
#[derive(Debug, Default, Clone)]
pub struct LightQueues {
    propagate: [VecDeque<usize>; 2],
    /// Entries carry the level the cell held before it was cleared.
    depropagate: [VecDeque<(usize, u8)>; 2],
    reseeds: Vec<(usize, LightChannel, u8)>,
    changed: bool,
    touched_neighbors: u32,
}

/// What a resolution pass changed in one chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// The chunk's own light array was written.
    pub changed: bool,
    /// Bit `(ox + 1) + 3 * (oy + 1) + 9 * (oz + 1)` is set for every
    /// neighbour chunk offset whose mesh reads one of the changed cells.
    pub touched_neighbors: u32,
}

impl ChangeSet {
    /// Bit of the centre offset, the chunk itself.
    pub const CENTER_BIT: u32 = 1 << 13;

    /// Mask bit for a neighbour offset with components in `-1..=1`.
    #[inline]
    pub fn offset_bit(offset: Vector3<i32>) -> u32 {
        1 << ((offset.x + 1) + 3 * (offset.y + 1) + 9 * (offset.z + 1))
    }

    /// Offsets whose bits are set, excluding the centre.
    pub fn neighbor_offsets(self) -> impl Iterator<Item = Vector3<i32>> {
        let mask = self.touched_neighbors & !Self::CENTER_BIT;
        (0..27).filter(move |&bit| mask & (1 << bit) != 0).map(|bit| {
            Vector3::new(bit % 3 - 1, (bit / 3) % 3 - 1, bit / 9 - 1)
        })
    }
}

impl LightQueues {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push_propagate(&mut self, channel: LightChannel, index: usize) {
        self.propagate[channel.index()].push_back(index);
    }

    #[inline]
    pub fn pop_propagate(&mut self, channel: LightChannel) -> Option<usize> {
        self.propagate[channel.index()].pop_front()
    }

    #[inline]
    pub fn push_depropagate(&mut self, channel: LightChannel, index: usize, cleared: u8) {
        self.depropagate[channel.index()].push_back((index, cleared));
    }

    #[inline]
    pub fn pop_depropagate(&mut self, channel: LightChannel) -> Option<(usize, u8)> {
        self.depropagate[channel.index()].pop_front()
    }

    /// Records a level to re-apply once every depropagation in the pass has
    /// finished.
    pub fn push_reseed(&mut self, index: usize, channel: LightChannel, level: u8) {
        self.reseeds.push((index, channel, level));
    }

    pub fn take_reseeds(&mut self) -> Vec<(usize, LightChannel, u8)> {
        std::mem::take(&mut self.reseeds)
    }

    pub fn has_depropagation(&self) -> bool {
        self.depropagate.iter().any(|queue| !queue.is_empty())
    }

    pub fn has_propagation(&self) -> bool {
        self.propagate.iter().any(|queue| !queue.is_empty()) || !self.reseeds.is_empty()
    }

    pub fn is_idle(&self) -> bool {
        !self.has_depropagation() && !self.has_propagation()
    }

    /// Number of queued cells across all four queues.
    pub fn len(&self) -> usize {
        self.propagate.iter().map(VecDeque::len).sum::<usize>()
            + self.depropagate.iter().map(VecDeque::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records that the cell at `local` changed in a chunk of `size`.
    pub fn mark_changed(&mut self, local: cgmath::Point3<usize>, size: usize) {
        self.changed = true;
        self.touched_neighbors |= boundary_mask(local, size);
    }

    /// Returns and resets the change record.
    pub fn take_changes(&mut self) -> ChangeSet {
        let changes = ChangeSet {
            changed: self.changed,
            touched_neighbors: self.touched_neighbors,
        };
        self.changed = false;
        self.touched_neighbors = 0;
        changes
    }

    /// Drops all queued work.
    pub fn clear(&mut self) {
        for queue in &mut self.propagate {
            queue.clear();
        }
        for queue in &mut self.depropagate {
            queue.clear();
        }
        self.reseeds.clear();
    }
}

/// Mask of neighbour chunk offsets that can see the cell at `local`: every
/// combination of the faces the cell lies on, including edges and corners.
pub fn boundary_mask(local: cgmath::Point3<usize>, size: usize) -> u32 {
    let choices = |coordinate: usize| -> [Option<i32>; 2] {
        let low = (coordinate == 0).then_some(-1);
        let high = (coordinate + 1 == size).then_some(1);
        [low, high]
    };

    let mut mask = 0;
    let xs = choices(local.x);
    let ys = choices(local.y);
    let zs = choices(local.z);
    for ox in std::iter::once(0).chain(xs.into_iter().flatten()) {
        for oy in std::iter::once(0).chain(ys.into_iter().flatten()) {
            for oz in std::iter::once(0).chain(zs.into_iter().flatten()) {
                mask |= ChangeSet::offset_bit(Vector3::new(ox, oy, oz));
            }
        }
    }
    mask
}
