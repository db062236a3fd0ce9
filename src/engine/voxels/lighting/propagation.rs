//! # Light Propagation
//!
//! Breadth-first flood fill over one chunk's light array.
//!
//! The engine borrows a chunk's grid and queues for the duration of one
//! phase. Work that crosses a chunk face is never applied directly: it is
//! written to an outbox of [`BoundaryTransfer`]s that the world delivers to
//! the neighbour chunk once the current chunk has been released. This keeps
//! at most one chunk locked at a time while still letting light ping-pong
//! between chunks until every queue is empty.
//!
//! ## Depropagation
//!
//! A cell that loses light is reset to zero and remembered together with
//! the level it held. Each of its lit neighbours is then either
//!
//! * cleared too, if its level could only have come from this cell, or
//! * queued for propagation, because it is lit by something else and must
//!   flood back into the cleared region.
//!
//! Solid neighbours stop the retraction. Emitting solid neighbours are
//! queued for propagation so they relight the cleared space.

use cgmath::Point3;
use log::trace;

use super::{
    depends, transmitted, LightChangeMode, LightChannel, LightQueues, PendingLightChange,
};
use crate::engine::voxels::{
    block::Direction,
    chunk::{NeighborCell, VoxelGrid},
};

/// How a boundary transfer affects the receiving cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    /// The sender offers this level to the receiving cell.
    Raise(u8),
    /// The sending cell was cleared after holding this level.
    Cleared(u8),
}

/// Light work crossing from one chunk into its face neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryTransfer {
    /// Face of the sending chunk the work crosses.
    pub direction: Direction,
    /// Flat index of the receiving cell in the neighbour chunk.
    pub index: usize,
    pub channel: LightChannel,
    pub kind: TransferKind,
}

impl BoundaryTransfer {
    /// Decides what the receiving chunk must queue, by comparing against its
    /// stored state. Returns `None` when the transfer has no effect.
    pub fn resolve(&self, receiver: &VoxelGrid) -> Option<PendingLightChange> {
        let voxel = receiver.voxel(self.index);
        let current = receiver.light_channel(self.index, self.channel);
        let change = |level, mode| PendingLightChange {
            index: self.index,
            channel: self.channel,
            level,
            mode,
        };

        match self.kind {
            TransferKind::Raise(level) => (voxel.is_transparent() && current < level)
                .then(|| change(level, LightChangeMode::Propagate)),
            TransferKind::Cleared(cleared) => {
                if current == 0 {
                    None
                } else if !voxel.is_transparent() {
                    (voxel.emission(self.channel) > 0)
                        .then(|| change(current, LightChangeMode::Propagate))
                } else if depends(current, cleared, self.direction, self.channel) {
                    Some(change(0, LightChangeMode::Depropagate))
                } else {
                    Some(change(current, LightChangeMode::Propagate))
                }
            }
        }
    }
}

/// Retractions for the neighbour across face `direction` of a chunk that is
/// being unloaded: every lit cell on that face is reported as cleared.
pub fn unload_transfers(grid: &VoxelGrid, direction: Direction) -> Vec<BoundaryTransfer> {
    let mut transfers = Vec::new();
    for index in grid.face_indices(direction) {
        let NeighborCell::Outside { index: target, .. } = grid.neighbor(index, direction) else {
            continue;
        };
        for channel in LightChannel::ALL {
            let level = grid.light_channel(index, channel);
            if level > 0 {
                transfers.push(BoundaryTransfer {
                    direction,
                    index: target,
                    channel,
                    kind: TransferKind::Cleared(level),
                });
            }
        }
    }
    transfers
}

/// Summary of one world-wide light resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveReport {
    /// Voxel edits drained from chunk edit queues.
    pub edits_applied: usize,
    /// Times a chunk was taken off the worklist.
    pub chunks_visited: usize,
    /// Cells popped from light queues.
    pub light_steps: usize,
    /// Boundary transfers delivered to live neighbours.
    pub transfers: usize,
    /// Chunks marked for remeshing, in ascending coordinate order.
    pub dirty_chunks: Vec<Point3<i32>>,
}

/// Runs the flood fill on one chunk.
pub struct LightPropagationEngine<'a> {
    grid: &'a mut VoxelGrid,
    queues: &'a mut LightQueues,
    outbox: &'a mut Vec<BoundaryTransfer>,
    steps: usize,
}

impl<'a> LightPropagationEngine<'a> {
    pub fn new(
        grid: &'a mut VoxelGrid,
        queues: &'a mut LightQueues,
        outbox: &'a mut Vec<BoundaryTransfer>,
    ) -> Self {
        LightPropagationEngine {
            grid,
            queues,
            outbox,
            steps: 0,
        }
    }

    /// Cells popped so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Turns a queued request into queue entries.
    pub fn apply_change(&mut self, change: PendingLightChange) {
        let PendingLightChange {
            index,
            channel,
            level,
            mode,
        } = change;
        let current = self.grid.light_channel(index, channel);

        match mode {
            LightChangeMode::Regular if level > current => {
                self.set(index, channel, level);
                self.queues.push_propagate(channel, index);
            }
            LightChangeMode::Regular => {
                self.set(index, channel, 0);
                self.queues.push_depropagate(channel, index, current);
                if level > 0 {
                    self.queues.push_reseed(index, channel, level);
                }
            }
            LightChangeMode::Propagate => {
                if level > current {
                    self.set(index, channel, level);
                }
                self.queues.push_propagate(channel, index);
            }
            LightChangeMode::Depropagate => {
                if current > 0 {
                    self.set(index, channel, 0);
                    self.queues.push_depropagate(channel, index, current);
                }
            }
        }
    }

    /// Re-applies levels recorded by `Regular` requests that lowered a cell.
    pub fn apply_reseeds(&mut self) {
        for (index, channel, level) in self.queues.take_reseeds() {
            if level > self.grid.light_channel(index, channel) {
                self.set(index, channel, level);
                self.queues.push_propagate(channel, index);
            }
        }
    }

    /// Queues every lit cell of the chunk for propagation.
    pub fn seed_all(&mut self) {
        for channel in LightChannel::ALL {
            for index in 0..self.grid.volume() {
                if self.grid.light_channel(index, channel) > 0 {
                    self.queues.push_propagate(channel, index);
                }
            }
        }
    }

    /// Queues the lit cells on face `direction` of the chunk for propagation.
    pub fn seed_face(&mut self, direction: Direction) {
        for index in self.grid.face_indices(direction) {
            for channel in LightChannel::ALL {
                if self.grid.light_channel(index, channel) > 0 {
                    self.queues.push_propagate(channel, index);
                }
            }
        }
    }

    /// Drains both depropagation queues.
    pub fn depropagate(&mut self) {
        for channel in LightChannel::ALL {
            while let Some((index, cleared)) = self.queues.pop_depropagate(channel) {
                self.steps += 1;
                for direction in Direction::ALL {
                    match self.grid.neighbor(index, direction) {
                        NeighborCell::Inside(neighbor) => {
                            self.retract_into(neighbor, cleared, direction, channel)
                        }
                        NeighborCell::Outside { direction, index } => {
                            trace!("depropagation crosses {:?} face at {}", direction, index);
                            self.outbox.push(BoundaryTransfer {
                                direction,
                                index,
                                channel,
                                kind: TransferKind::Cleared(cleared),
                            });
                        }
                    }
                }
            }
        }
    }

    fn retract_into(&mut self, neighbor: usize, cleared: u8, direction: Direction, channel: LightChannel) {
        let level = self.grid.light_channel(neighbor, channel);
        if level == 0 {
            return;
        }

        let voxel = self.grid.voxel(neighbor);
        if !voxel.is_transparent() {
            if voxel.emission(channel) > 0 {
                self.queues.push_propagate(channel, neighbor);
            }
            return;
        }

        if depends(level, cleared, direction, channel) {
            self.set(neighbor, channel, 0);
            self.queues.push_depropagate(channel, neighbor, level);
        } else {
            self.queues.push_propagate(channel, neighbor);
        }
    }

    /// Drains both propagation queues.
    pub fn propagate(&mut self) {
        for channel in LightChannel::ALL {
            while let Some(index) = self.queues.pop_propagate(channel) {
                let level = self.grid.light_channel(index, channel);
                if level == 0 {
                    continue;
                }
                self.steps += 1;

                for direction in Direction::ALL {
                    let offered = transmitted(level, direction, channel);
                    if offered == 0 {
                        continue;
                    }
                    match self.grid.neighbor(index, direction) {
                        NeighborCell::Inside(neighbor) => {
                            if self.grid.voxel(neighbor).is_transparent()
                                && self.grid.light_channel(neighbor, channel) < offered
                            {
                                self.set(neighbor, channel, offered);
                                self.queues.push_propagate(channel, neighbor);
                            }
                        }
                        NeighborCell::Outside { direction, index } => {
                            self.outbox.push(BoundaryTransfer {
                                direction,
                                index,
                                channel,
                                kind: TransferKind::Raise(offered),
                            });
                        }
                    }
                }
            }
        }
    }

    fn set(&mut self, index: usize, channel: LightChannel, level: u8) {
        if self.grid.set_light_channel(index, channel, level) {
            let size = self.grid.size();
            self.queues.mark_changed(self.grid.at(index), size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::voxels::{block::Voxel, lighting::MAX_LIGHT};

    fn run(grid: &mut VoxelGrid, changes: &[PendingLightChange]) -> Vec<BoundaryTransfer> {
        let mut queues = LightQueues::new();
        let mut outbox = Vec::new();
        let mut engine = LightPropagationEngine::new(grid, &mut queues, &mut outbox);
        for change in changes {
            engine.apply_change(*change);
        }
        engine.depropagate();
        engine.apply_reseeds();
        engine.propagate();
        outbox
    }

    fn block(index: usize, level: u8) -> PendingLightChange {
        PendingLightChange {
            index,
            channel: LightChannel::Block,
            level,
            mode: LightChangeMode::Regular,
        }
    }

    #[test]
    fn block_light_decays_by_manhattan_distance() {
        let mut grid = VoxelGrid::new(16);
        let source = grid.index(8, 8, 8);
        run(&mut grid, &[block(source, MAX_LIGHT)]);

        for index in 0..grid.volume() {
            let p = grid.at(index);
            let distance = p.x.abs_diff(8) + p.y.abs_diff(8) + p.z.abs_diff(8);
            let expected = (MAX_LIGHT as usize).saturating_sub(distance) as u8;
            assert_eq!(grid.light_channel(index, LightChannel::Block), expected, "at {:?}", p);
        }
    }

    #[test]
    fn light_reaching_the_boundary_is_sent_to_the_outbox() {
        let mut grid = VoxelGrid::new(4);
        let source = grid.index(3, 1, 1);
        let outbox = run(&mut grid, &[block(source, 5)]);

        assert!(outbox.contains(&BoundaryTransfer {
            direction: Direction::Right,
            index: grid.index(0, 1, 1),
            channel: LightChannel::Block,
            kind: TransferKind::Raise(4),
        }));
        assert!(outbox.iter().all(|t| t.channel == LightChannel::Block));
    }

    #[test]
    fn solid_voxels_block_light() {
        let mut grid = VoxelGrid::new(8);
        for y in 0..8 {
            for z in 0..8 {
                let wall = grid.index(4, y, z);
                grid.set_voxel(wall, Voxel::Stone);
            }
        }
        let source = grid.index(1, 4, 4);
        run(&mut grid, &[block(source, MAX_LIGHT)]);

        for index in 0..grid.volume() {
            if grid.at(index).x >= 4 {
                assert_eq!(grid.light_channel(index, LightChannel::Block), 0);
            }
        }
    }

    #[test]
    fn lowering_a_source_reseeds_it() {
        let mut grid = VoxelGrid::new(8);
        let source = grid.index(4, 4, 4);
        run(&mut grid, &[block(source, 10)]);
        run(&mut grid, &[block(source, 3)]);

        assert_eq!(grid.light_channel(source, LightChannel::Block), 3);
        assert_eq!(grid.light_channel(grid.index(4, 4, 5), LightChannel::Block), 2);
        assert_eq!(grid.light_channel(grid.index(4, 4, 7), LightChannel::Block), 0);
    }

    #[test]
    fn cleared_transfer_into_dependent_cell_depropagates() {
        let mut receiver = VoxelGrid::new(4);
        let index = receiver.index(0, 1, 1);
        receiver.set_light_channel(index, LightChannel::Block, 6);

        let transfer = |cleared| BoundaryTransfer {
            direction: Direction::Right,
            index,
            channel: LightChannel::Block,
            kind: TransferKind::Cleared(cleared),
        };

        assert_eq!(transfer(7).resolve(&receiver).map(|c| c.mode), Some(LightChangeMode::Depropagate));
        assert_eq!(transfer(6).resolve(&receiver).map(|c| c.mode), Some(LightChangeMode::Propagate));

        receiver.set_voxel(index, Voxel::Dirt);
        assert_eq!(transfer(7).resolve(&receiver), None);
    }

    #[test]
    fn unloading_reports_lit_face_cells_as_cleared() {
        let mut grid = VoxelGrid::new(4);
        let lit = grid.index(3, 2, 1);
        grid.set_light_channel(lit, LightChannel::Block, 9);
        grid.set_light_channel(grid.index(2, 2, 1), LightChannel::Block, 8);

        let transfers = unload_transfers(&grid, Direction::Right);
        assert_eq!(
            transfers,
            vec![BoundaryTransfer {
                direction: Direction::Right,
                index: grid.index(0, 2, 1),
                channel: LightChannel::Block,
                kind: TransferKind::Cleared(9),
            }]
        );
        assert!(unload_transfers(&grid, Direction::Left).is_empty());
    }

    #[test]
    fn raise_transfer_only_brightens() {
        let mut receiver = VoxelGrid::new(4);
        let index = receiver.index(3, 0, 0);
        receiver.set_light_channel(index, LightChannel::Sky, 9);
        let transfer = |level| BoundaryTransfer {
            direction: Direction::Left,
            index,
            channel: LightChannel::Sky,
            kind: TransferKind::Raise(level),
        };

        assert_eq!(transfer(9).resolve(&receiver), None);
        assert_eq!(
            transfer(12).resolve(&receiver),
            Some(PendingLightChange {
                index,
                channel: LightChannel::Sky,
                level: 12,
                mode: LightChangeMode::Propagate,
            })
        );
    }
}
