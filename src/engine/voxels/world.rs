//! # World Module
//!
//! The `World` owns every loaded chunk and is the only place that mutates
//! them. Subsystems receive it explicitly; there is no global instance.
//!
//! ## Edits and light
//!
//! Gameplay never writes voxels directly. [`World::request_edit`] queues a
//! [`PendingEdit`] on the owning chunk, and [`World::resolve_pending`] later
//! applies every queued edit and runs the light flood fill to a fixed point
//! across all affected chunks:
//!
//! 1. Edits are applied per chunk in FIFO order. Each edited cell queues a
//!    `Regular` light request per channel: block light set to the new
//!    voxel's emission, sky light set to zero. A transparent cell on the top
//!    layer of a chunk with nothing live above it is open to the sky and is
//!    set to full sky light instead.
//! 2. Every chunk drains its depropagation work. Retraction that crosses a
//!    face is delivered to the neighbour, which joins the worklist.
//! 3. Every chunk drains its propagation work in the same way.
//! 4. Chunks whose data changed, and neighbours that read the changed cells,
//!    are marked dirty for remeshing.
//!
//! Unloading a chunk retracts the light it spread into its neighbours, and
//! the chunk below it gains open sky, so light always follows the voxels of
//! the chunks that are currently loaded. Sky light in freshly installed
//! terrain is taken as generated.
//!
//! Chunks are visited in ascending coordinate order and each queue is FIFO,
//! so the same sequence of requests always produces the same light arrays.
//! Only one chunk is locked at a time.

use std::collections::BTreeSet;

use cgmath::{Point3, Vector3};
use log::{debug, info, trace};
use web_time::Instant;

use super::{
    block::{Direction, FaceMask, Voxel},
    chunk::{Chunk, PendingEdit, VoxelGrid},
    chunk_index::{
        chunk_key, key_position, to_index, voxel_to_chunk, voxel_to_local, ChunkHandle,
        ChunkIndex,
    },
    lifecycle::ChunkState,
    lighting::{
        queues::boundary_mask, unload_transfers, BoundaryTransfer, ChangeSet, LightChangeMode, LightChannel,
        LightLevel, LightPropagationEngine, PendingLightChange, ResolveReport, MAX_LIGHT,
    },
    neighborhood::{slot_offset, NeighborhoodHandles, NEIGHBORHOOD_CHUNKS},
};
use crate::{
    config::EngineConfig, core::Shared, engine::rendering::meshing::ChunkMesh,
    error::VoxelError,
};

type ChunkKey = (i32, i32, i32);

/// A gameplay request to overwrite one voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoxelEditRequest {
    /// Chunk grid coordinate.
    pub chunk: Point3<i32>,
    /// Coordinate inside the chunk, each component in `[0, chunk_size)`.
    pub local: Point3<i32>,
    pub voxel: Voxel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Depropagate,
    Propagate,
}

/// A voxel world composed of chunks.
pub struct World {
    chunk_size: usize,
    block_size: f32,
    index: ChunkIndex,
    outbox: Vec<BoundaryTransfer>,
}

impl World {
    /// Creates an empty world.
    ///
    /// # Panics
    /// Panics if `chunk_size` is zero.
    pub fn new(chunk_size: usize, block_size: f32) -> Self {
        assert!(chunk_size > 0, "chunk size must be positive");
        World {
            chunk_size,
            block_size,
            index: ChunkIndex::new(),
            outbox: Vec::new(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.chunk_size, config.block_size)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn block_size(&self) -> f32 {
        self.block_size
    }

    /// Handle of a registered chunk.
    pub fn chunk(&self, position: Point3<i32>) -> Option<&ChunkHandle> {
        self.index.get(position)
    }

    /// Registered chunk coordinates in ascending order.
    pub fn positions(&self) -> Vec<Point3<i32>> {
        self.index.positions()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Registers an uninitialised chunk. Returns `false` if one already exists.
    pub fn create_chunk(&mut self, position: Point3<i32>) -> bool {
        if self.index.contains(position) {
            return false;
        }
        self.index
            .insert(position, Shared::new(Chunk::new(position, self.chunk_size)));
        trace!("Created chunk {:?}", position);
        true
    }

    /// Removes a chunk and retracts the light it spread into live neighbours.
    ///
    /// Pending light work of the chunk is settled first. Every lit cell on
    /// its faces is then reported to the neighbour across that face as
    /// cleared, the chunk below gains open sky on its top layer, and the
    /// world is resolved again. Neighbours are marked dirty, since faces that
    /// bordered this chunk are now on the edge of the loaded world.
    pub fn destroy_chunk(&mut self, position: Point3<i32>) -> Option<ChunkHandle> {
        let busy = self.index.get(position)?.read().has_pending_work();
        if busy {
            debug!("Settling light of chunk {:?} before unloading it", position);
            self.resolve_pending();
        }

        let handle = self.index.remove(position)?;
        let retractions: Vec<(Direction, Vec<BoundaryTransfer>)> = {
            let chunk = handle.read();
            if chunk.is_live() {
                Direction::ALL
                    .into_iter()
                    .map(|direction| (direction, unload_transfers(&chunk.grid, direction)))
                    .collect()
            } else {
                Vec::new()
            }
        };

        let mut retracted = false;
        for (direction, transfers) in retractions {
            let Some(neighbor) = self.index.get(position + direction.offset()) else {
                continue;
            };
            let mut chunk = neighbor.write();
            if !chunk.is_live() {
                continue;
            }
            for transfer in transfers {
                // Open sky replaces whatever came down through this face.
                if direction == Direction::Down && transfer.channel == LightChannel::Sky {
                    continue;
                }
                if let Some(change) = transfer.resolve(&chunk.grid) {
                    chunk.queue_light_change(change);
                    retracted = true;
                }
            }
        }
        retracted |= self.open_to_sky(position + Direction::Down.offset());

        for slot in 0..NEIGHBORHOOD_CHUNKS {
            let offset = slot_offset(slot);
            if offset != Vector3::new(0, 0, 0) {
                self.mark_dirty(position + offset);
            }
        }
        if retracted {
            debug!("Retracting light of unloaded chunk {:?}", position);
            self.resolve_pending();
        }
        trace!("Destroyed chunk {:?}", position);
        Some(handle)
    }

    /// Raises every transparent top-layer cell of a live chunk to full sky
    /// light. Returns whether anything was queued.
    fn open_to_sky(&self, position: Point3<i32>) -> bool {
        let Some(handle) = self.index.get(position) else {
            return false;
        };
        let mut chunk = handle.write();
        if !chunk.is_live() {
            return false;
        }
        let dim: Vec<usize> = chunk
            .grid
            .face_indices(Direction::Up)
            .filter(|&index| {
                chunk.grid.voxel(index).is_transparent()
                    && chunk.grid.light_channel(index, LightChannel::Sky) < MAX_LIGHT
            })
            .collect();
        for &index in &dim {
            chunk.queue_light_change(PendingLightChange {
                index,
                channel: LightChannel::Sky,
                level: MAX_LIGHT,
                mode: LightChangeMode::Regular,
            });
        }
        !dim.is_empty()
    }

    fn is_live(&self, position: Point3<i32>) -> bool {
        self.index
            .get(position)
            .is_some_and(|handle| handle.read().is_live())
    }

    /// Creates a chunk and installs `grid` as its terrain in one step.
    pub fn load_chunk(&mut self, position: Point3<i32>, grid: VoxelGrid) -> bool {
        self.create_chunk(position);
        self.install_terrain(position, grid)
    }

    /// Installs generated terrain, seeds light from it and from the facing
    /// layers of live neighbours, and marks the surrounding chunks dirty.
    ///
    /// Returns `false` if the chunk is no longer registered.
    ///
    /// # Panics
    /// Panics if the chunk already holds terrain or the grid size differs.
    pub fn install_terrain(&mut self, position: Point3<i32>, grid: VoxelGrid) -> bool {
        let Some(handle) = self.index.get(position).cloned() else {
            debug!("Dropping terrain for unregistered chunk {:?}", position);
            return false;
        };

        {
            let mut guard = handle.write();
            let chunk = &mut *guard;
            chunk.install_grid(grid);
            let mut engine =
                LightPropagationEngine::new(&mut chunk.grid, &mut chunk.light_queues, &mut self.outbox);
            engine.seed_all();
        }

        for direction in Direction::ALL {
            let neighbor = position + direction.offset();
            let Some(neighbor_handle) = self.index.get(neighbor) else {
                continue;
            };
            let mut guard = neighbor_handle.write();
            let chunk = &mut *guard;
            if !chunk.is_live() {
                continue;
            }
            let mut engine =
                LightPropagationEngine::new(&mut chunk.grid, &mut chunk.light_queues, &mut self.outbox);
            engine.seed_face(direction.opposite());
        }
        self.outbox.clear();

        for slot in 0..NEIGHBORHOOD_CHUNKS {
            self.mark_dirty(position + slot_offset(slot));
        }
        true
    }

    /// Queues a voxel edit on the owning chunk.
    pub fn request_edit(&mut self, request: VoxelEditRequest) -> Result<(), VoxelError> {
        let handle = self
            .index
            .get(request.chunk)
            .ok_or_else(|| VoxelError::chunk_not_loaded(request.chunk))?;
        handle.write().queue_edit(request.local, request.voxel)
    }

    /// Queues a voxel edit addressed by world voxel coordinate.
    pub fn request_edit_at(&mut self, voxel: Point3<i32>, value: Voxel) -> Result<(), VoxelError> {
        let local = voxel_to_local(voxel, self.chunk_size);
        self.request_edit(VoxelEditRequest {
            chunk: voxel_to_chunk(voxel, self.chunk_size),
            local: Point3::new(local.x as i32, local.y as i32, local.z as i32),
            voxel: value,
        })
    }

    /// Queues a `Regular` light-set request for one channel of one cell.
    pub fn request_light_change(
        &mut self,
        chunk: Point3<i32>,
        local: Point3<i32>,
        channel: LightChannel,
        level: u8,
    ) -> Result<(), VoxelError> {
        if level > MAX_LIGHT {
            return Err(VoxelError::InvalidLightLevel { level });
        }
        let handle = self
            .index
            .get(chunk)
            .ok_or_else(|| VoxelError::chunk_not_loaded(chunk))?;
        let mut chunk = handle.write();
        let index = chunk.grid.checked_index(local)?;
        chunk.queue_light_change(PendingLightChange {
            index,
            channel,
            level,
            mode: LightChangeMode::Regular,
        });
        Ok(())
    }

    /// Voxel at a world voxel coordinate.
    pub fn voxel_at(&self, voxel: Point3<i32>) -> Result<Voxel, VoxelError> {
        let (handle, index) = self.locate(voxel)?;
        let chunk = handle.read();
        Ok(chunk.grid.voxel(index))
    }

    /// Light at a world voxel coordinate.
    pub fn light_at(&self, voxel: Point3<i32>) -> Result<LightLevel, VoxelError> {
        let (handle, index) = self.locate(voxel)?;
        let chunk = handle.read();
        Ok(chunk.grid.light(index))
    }

    fn locate(&self, voxel: Point3<i32>) -> Result<(&ChunkHandle, usize), VoxelError> {
        let position = voxel_to_chunk(voxel, self.chunk_size);
        let handle = self
            .index
            .get(position)
            .ok_or_else(|| VoxelError::chunk_not_loaded(position))?;
        let local = voxel_to_local(voxel, self.chunk_size);
        Ok((handle, to_index(local.x, local.y, local.z, self.chunk_size)))
    }

    /// A live chunk has edits or light work waiting.
    pub fn has_pending_work(&self) -> bool {
        self.index.iter().any(|(_, handle)| {
            let chunk = handle.read();
            chunk.is_live() && chunk.has_pending_work()
        })
    }

    /// Marks a live chunk stale. Returns `false` if it is absent or has no
    /// terrain yet.
    pub fn mark_dirty(&self, position: Point3<i32>) -> bool {
        self.index
            .get(position)
            .map(|handle| handle.write().lifecycle.mark_dirty())
            .unwrap_or(false)
    }

    /// Applies queued edits and runs light resolution to a fixed point.
    pub fn resolve_pending(&mut self) -> ResolveReport {
        let start = Instant::now();
        let mut report = ResolveReport::default();
        let mut dirty: BTreeSet<ChunkKey> = BTreeSet::new();
        let mut touched: BTreeSet<ChunkKey> = BTreeSet::new();

        self.apply_edits(&mut report, &mut dirty);

        loop {
            let pending: BTreeSet<ChunkKey> = self
                .index
                .iter()
                .filter(|(_, handle)| {
                    let chunk = handle.read();
                    chunk.is_live() && chunk.has_pending_work()
                })
                .map(|(position, _)| chunk_key(position))
                .collect();
            if pending.is_empty() {
                break;
            }

            let mut worklist = pending.clone();
            while let Some(key) = worklist.pop_first() {
                touched.insert(key);
                self.run_phase(key_position(key), Phase::Depropagate, &mut worklist, &mut report);
            }

            let mut worklist = touched.clone();
            while let Some(key) = worklist.pop_first() {
                touched.insert(key);
                self.run_phase(key_position(key), Phase::Propagate, &mut worklist, &mut report);
            }
        }

        for key in &touched {
            let Some(handle) = self.index.get(key_position(*key)) else {
                continue;
            };
            let changes = handle.write().light_queues.take_changes();
            if changes.changed {
                dirty.insert(*key);
            }
            for offset in changes.neighbor_offsets() {
                dirty.insert(chunk_key(key_position(*key) + offset));
            }
        }

        for key in dirty {
            let position = key_position(key);
            if self.mark_dirty(position) {
                report.dirty_chunks.push(position);
            }
        }

        if report.edits_applied > 0 || report.light_steps > 0 {
            debug!(
                "Resolved {} edits and {} light steps over {} chunk visits in {:?}",
                report.edits_applied,
                report.light_steps,
                report.chunks_visited,
                start.elapsed()
            );
        }
        report
    }

    fn apply_edits(&mut self, report: &mut ResolveReport, dirty: &mut BTreeSet<ChunkKey>) {
        for position in self.index.positions() {
            let Some(handle) = self.index.get(position) else {
                continue;
            };
            let open_sky = !self.is_live(position + Direction::Up.offset());
            let mut guard = handle.write();
            let chunk = &mut *guard;
            if !chunk.is_live() || chunk.pending_edits.is_empty() {
                continue;
            }

            let size = chunk.size();
            while let Some(PendingEdit { index, voxel }) = chunk.pending_edits.pop_front() {
                report.edits_applied += 1;
                if chunk.grid.voxel(index) == voxel {
                    continue;
                }
                chunk.grid.set_voxel(index, voxel);
                let sky_source =
                    open_sky && voxel.is_transparent() && chunk.grid.at(index).y == size - 1;
                for channel in LightChannel::ALL {
                    let level = match channel {
                        LightChannel::Sky if sky_source => MAX_LIGHT,
                        _ => voxel.emission(channel),
                    };
                    chunk.pending_light.push_back(PendingLightChange {
                        index,
                        channel,
                        level,
                        mode: LightChangeMode::Regular,
                    });
                }

                let touched = ChangeSet {
                    changed: true,
                    touched_neighbors: boundary_mask(chunk.grid.at(index), size),
                };
                dirty.insert(chunk_key(position));
                for offset in touched.neighbor_offsets() {
                    dirty.insert(chunk_key(position + offset));
                }
            }
        }
    }

    fn run_phase(
        &mut self,
        position: Point3<i32>,
        phase: Phase,
        worklist: &mut BTreeSet<ChunkKey>,
        report: &mut ResolveReport,
    ) {
        let Some(handle) = self.index.get(position).cloned() else {
            return;
        };
        report.chunks_visited += 1;

        let mut outbox = std::mem::take(&mut self.outbox);
        let live = {
            let mut guard = handle.write();
            let chunk = &mut *guard;
            if chunk.is_live() {
                let mut engine = LightPropagationEngine::new(
                    &mut chunk.grid,
                    &mut chunk.light_queues,
                    &mut outbox,
                );
                while let Some(change) = chunk.pending_light.pop_front() {
                    engine.apply_change(change);
                }
                engine.depropagate();
                if phase == Phase::Propagate {
                    engine.apply_reseeds();
                    engine.propagate();
                }
                report.light_steps += engine.steps();
            }
            chunk.is_live()
        };

        if live {
            self.deliver(position, &mut outbox, worklist, report);
        }
        outbox.clear();
        self.outbox = outbox;
    }

    /// Hands boundary transfers to the neighbours they cross into, one
    /// neighbour lock at a time.
    fn deliver(
        &self,
        from: Point3<i32>,
        outbox: &mut Vec<BoundaryTransfer>,
        worklist: &mut BTreeSet<ChunkKey>,
        report: &mut ResolveReport,
    ) {
        if outbox.is_empty() {
            return;
        }

        for direction in Direction::ALL {
            let mut transfers = outbox.iter().filter(|t| t.direction == direction).peekable();
            if transfers.peek().is_none() {
                continue;
            }

            let target = from + direction.offset();
            let Some(handle) = self.index.get(target) else {
                debug!(
                    "Light leaving chunk {:?} through {:?} stops at unloaded chunk {:?}",
                    from, direction, target
                );
                continue;
            };
            let mut chunk = handle.write();
            if !chunk.is_live() {
                debug!(
                    "Light leaving chunk {:?} stops at chunk {:?} without terrain",
                    from, target
                );
                continue;
            }

            let mut queued = false;
            for transfer in transfers {
                if let Some(change) = transfer.resolve(&chunk.grid) {
                    chunk.queue_light_change(change);
                    report.transfers += 1;
                    queued = true;
                }
            }
            if queued {
                worklist.insert(chunk_key(target));
            }
        }
        outbox.clear();
    }

    /// Moves a dirty chunk to `Remeshing` and returns the captured revision.
    pub fn begin_remesh(&self, position: Point3<i32>) -> Option<u64> {
        let handle = self.index.get(position)?;
        let mut chunk = handle.write();
        if chunk.state() != ChunkState::Dirty {
            return None;
        }
        chunk.lifecycle.begin_remesh()
    }

    /// Handles of the live chunks in the 3×3×3 block around `position`.
    pub fn neighborhood_handles(&self, position: Point3<i32>) -> NeighborhoodHandles {
        let chunks = (0..NEIGHBORHOOD_CHUNKS)
            .map(|slot| {
                self.index
                    .get(position + slot_offset(slot))
                    .filter(|handle| handle.read().is_live())
                    .cloned()
            })
            .collect();
        NeighborhoodHandles {
            position,
            size: self.chunk_size,
            chunks,
        }
    }

    /// Stores the result of a remesh if it was built from the current
    /// revision. Returns `false` for stale results.
    pub fn apply_surface(
        &self,
        position: Point3<i32>,
        revision: u64,
        face_masks: Vec<FaceMask>,
        mesh: ChunkMesh,
    ) -> bool {
        let Some(handle) = self.index.get(position) else {
            debug!("Dropping mesh for unloaded chunk {:?}", position);
            return false;
        };
        let mut chunk = handle.write();
        if !chunk.lifecycle.finish_remesh(revision) {
            debug!(
                "Dropping stale mesh for chunk {:?} (revision {}, current {})",
                position,
                revision,
                chunk.lifecycle.revision()
            );
            return false;
        }
        chunk.grid.set_face_masks(face_masks);
        chunk.mesh = mesh;
        true
    }

    /// Number of chunks in each lifecycle state, for logging.
    pub fn state_counts(&self) -> [(ChunkState, usize); 5] {
        let mut counts = [
            (ChunkState::Uninitialized, 0),
            (ChunkState::Generating, 0),
            (ChunkState::Dirty, 0),
            (ChunkState::Remeshing, 0),
            (ChunkState::Ready, 0),
        ];
        for (_, handle) in self.index.iter() {
            let state = handle.read().state();
            if let Some(entry) = counts.iter_mut().find(|(s, _)| *s == state) {
                entry.1 += 1;
            }
        }
        counts
    }

    /// Logs a one-line summary of chunk states.
    pub fn log_summary(&self) {
        let counts = self.state_counts();
        info!(
            "World: {} chunks ({:?})",
            self.len(),
            counts.iter().filter(|(_, n)| *n > 0).collect::<Vec<_>>()
        );
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("chunk_size", &self.chunk_size)
            .field("block_size", &self.block_size)
            .field("chunks", &self.index.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dark_world(size: usize, chunks: &[Point3<i32>]) -> World {
        let mut world = World::new(size, 1.0);
        for &position in chunks {
            assert!(world.load_chunk(position, VoxelGrid::new(size)));
        }
        world
    }

    #[test]
    fn edits_are_deferred_until_resolution() {
        let mut world = dark_world(8, &[Point3::new(0, 0, 0)]);
        world.request_edit_at(Point3::new(2, 3, 4), Voxel::Stone).unwrap();
        assert_eq!(world.voxel_at(Point3::new(2, 3, 4)), Ok(Voxel::Empty));

        let report = world.resolve_pending();
        assert_eq!(report.edits_applied, 1);
        assert_eq!(world.voxel_at(Point3::new(2, 3, 4)), Ok(Voxel::Stone));
    }

    #[test]
    fn boundary_api_rejects_bad_requests() {
        let mut world = dark_world(8, &[Point3::new(0, 0, 0)]);

        let out_of_bounds = world.request_edit(VoxelEditRequest {
            chunk: Point3::new(0, 0, 0),
            local: Point3::new(0, 8, 0),
            voxel: Voxel::Dirt,
        });
        assert_eq!(out_of_bounds, Err(VoxelError::OutOfBounds { x: 0, y: 8, z: 0, size: 8 }));

        let missing = world.request_edit_at(Point3::new(-1, 0, 0), Voxel::Dirt);
        assert_eq!(missing, Err(VoxelError::ChunkNotLoaded { x: -1, y: 0, z: 0 }));

        let too_bright =
            world.request_light_change(Point3::new(0, 0, 0), Point3::new(1, 1, 1), LightChannel::Block, 16);
        assert_eq!(too_bright, Err(VoxelError::InvalidLightLevel { level: 16 }));
    }

    #[test]
    fn light_crosses_into_live_neighbours_only() {
        let mut world = dark_world(8, &[Point3::new(0, 0, 0), Point3::new(1, 0, 0)]);
        world.create_chunk(Point3::new(-1, 0, 0));

        world.request_edit_at(Point3::new(7, 4, 4), Voxel::Lamp).unwrap();
        world.resolve_pending();

        assert_eq!(world.light_at(Point3::new(8, 4, 4)).unwrap().block(), 14);
        assert_eq!(world.light_at(Point3::new(10, 4, 4)).unwrap().block(), 12);
        assert_eq!(world.light_at(Point3::new(0, 4, 4)).unwrap().block(), 8);
        assert_eq!(world.light_at(Point3::new(-1, 4, 4)).unwrap().block(), 0);
    }

    #[test]
    fn edits_mark_the_chunk_and_facing_neighbours_dirty() {
        let mut world = dark_world(4, &[Point3::new(0, 0, 0), Point3::new(-1, 0, 0), Point3::new(1, 0, 0)]);
        for position in world.positions() {
            let revision = world.begin_remesh(position).unwrap();
            assert!(world.apply_surface(position, revision, vec![FaceMask::EMPTY; 64], ChunkMesh::default()));
        }

        world.request_edit_at(Point3::new(0, 1, 1), Voxel::Stone).unwrap();
        let report = world.resolve_pending();

        assert!(report.dirty_chunks.contains(&Point3::new(0, 0, 0)));
        assert!(report.dirty_chunks.contains(&Point3::new(-1, 0, 0)));
        assert!(!report.dirty_chunks.contains(&Point3::new(1, 0, 0)));
    }

    #[test]
    fn stale_surface_is_dropped() {
        let mut world = dark_world(4, &[Point3::new(0, 0, 0)]);
        let position = Point3::new(0, 0, 0);
        let revision = world.begin_remesh(position).unwrap();

        world.request_edit_at(Point3::new(1, 1, 1), Voxel::Dirt).unwrap();
        world.resolve_pending();

        assert!(!world.apply_surface(position, revision, vec![FaceMask::ALL; 64], ChunkMesh::default()));
        assert_eq!(world.chunk(position).unwrap().read().state(), ChunkState::Dirty);
    }

    #[test]
    #[should_panic(expected = "initialised twice")]
    fn installing_terrain_twice_panics() {
        let mut world = dark_world(4, &[Point3::new(0, 0, 0)]);
        world.install_terrain(Point3::new(0, 0, 0), VoxelGrid::new(4));
    }

    #[test]
    fn destroy_settles_pending_light_then_retracts_it() {
        let mut world = dark_world(4, &[Point3::new(0, 0, 0), Point3::new(1, 0, 0)]);
        world.request_edit_at(Point3::new(3, 1, 1), Voxel::Lamp).unwrap();
        assert!(world.destroy_chunk(Point3::new(0, 0, 0)).is_some());

        assert!(world.chunk(Point3::new(0, 0, 0)).is_none());
        assert!(!world.has_pending_work());
        for x in 4..8 {
            assert_eq!(world.light_at(Point3::new(x, 1, 1)).unwrap().block(), 0);
        }
    }

    #[test]
    fn destroy_keeps_light_from_surviving_sources() {
        let mut world = dark_world(4, &[Point3::new(0, 0, 0), Point3::new(1, 0, 0)]);
        world.request_edit_at(Point3::new(2, 1, 1), Voxel::Lamp).unwrap();
        world.request_edit_at(Point3::new(6, 1, 1), Voxel::Lamp).unwrap();
        world.resolve_pending();
        assert_eq!(world.light_at(Point3::new(4, 1, 1)).unwrap().block(), 13);

        world.destroy_chunk(Point3::new(0, 0, 0));
        assert_eq!(world.light_at(Point3::new(4, 1, 1)).unwrap().block(), 13);
        assert_eq!(world.light_at(Point3::new(5, 1, 1)).unwrap().block(), 14);
    }

    #[test]
    fn opened_top_cell_without_chunk_above_sees_the_sky() {
        let mut world = World::new(4, 1.0);
        let mut grid = VoxelGrid::filled(4, Voxel::Empty, LightLevel::SKY);
        for index in grid.face_indices(Direction::Up).collect::<Vec<_>>() {
            grid.set_voxel(index, Voxel::Stone);
            grid.set_light(index, LightLevel::DARK);
        }
        assert!(world.load_chunk(Point3::new(0, 0, 0), grid));
        world.resolve_pending();

        world.request_edit_at(Point3::new(1, 3, 1), Voxel::Empty).unwrap();
        world.resolve_pending();
        assert_eq!(world.light_at(Point3::new(1, 3, 1)).unwrap().sky(), MAX_LIGHT);

        // Under a live chunk the same edit only receives what the chunk above offers.
        let mut covered = dark_world(4, &[Point3::new(0, 0, 0), Point3::new(0, 1, 0)]);
        covered.request_edit_at(Point3::new(1, 3, 1), Voxel::Stone).unwrap();
        covered.resolve_pending();
        covered.request_edit_at(Point3::new(1, 3, 1), Voxel::Empty).unwrap();
        covered.resolve_pending();
        assert_eq!(covered.light_at(Point3::new(1, 3, 1)).unwrap().sky(), 0);
    }

    #[test]
    fn unloading_the_chunk_above_opens_the_sky() {
        let mut world = World::new(4, 1.0);
        assert!(world.load_chunk(Point3::new(0, 0, 0), VoxelGrid::filled(4, Voxel::Empty, LightLevel::DARK)));
        assert!(world.load_chunk(Point3::new(0, 1, 0), VoxelGrid::filled(4, Voxel::Stone, LightLevel::DARK)));
        world.resolve_pending();
        assert_eq!(world.light_at(Point3::new(2, 0, 2)).unwrap().sky(), 0);

        world.destroy_chunk(Point3::new(0, 1, 0));
        for y in 0..4 {
            assert_eq!(world.light_at(Point3::new(2, y, 2)).unwrap().sky(), MAX_LIGHT);
        }
    }
}
