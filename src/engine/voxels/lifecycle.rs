//! # Chunk Lifecycle
//!
//! Each chunk moves through a small state machine:
//!
//! ```text
//! Uninitialized -> Generating -> Dirty -> Remeshing -> Ready
//!                                  ^          |          |
//!                                  +----------+----------+
//! ```
//!
//! Any change to a live chunk's voxels, light or neighbourhood sends it back
//! to `Dirty` and bumps its revision. A remesh result is only accepted if it
//! was started at the current revision, so meshes built from stale data are
//! dropped rather than shown.
//!
//! [`ChunkLifecycleManager`] advances chunks through the stages, either by
//! producing tasks for the worker pool or synchronously with
//! [`ChunkLifecycleManager::run_blocking`].

use std::sync::Arc;

use log::{debug, info};
use web_time::Instant;

use super::{
    terrain::TerrainGenerator, tasks::chunk_generation_task::ChunkGenerationTask, world::World,
};
use crate::engine::{
    rendering::{
        meshing::{build_chunk_surface, MeshBuilder},
        tasks::chunk_mesh_generation_task::ChunkMeshGenerationTask,
        MeshConsumer,
    },
    task_management::task::Task,
};

/// Stage of a chunk in the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ChunkState {
    /// Registered, waiting for terrain.
    #[default]
    Uninitialized,
    /// Terrain is being generated.
    Generating,
    /// Visibility and mesh are stale.
    Dirty,
    /// A remesh is in flight.
    Remeshing,
    /// Mesh matches the current data.
    Ready,
}

/// State plus revision counter of one chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkLifecycle {
    state: ChunkState,
    revision: u64,
}

impl ChunkLifecycle {
    pub fn state(&self) -> ChunkState {
        self.state
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Terrain is installed.
    pub fn is_live(&self) -> bool {
        matches!(
            self.state,
            ChunkState::Dirty | ChunkState::Remeshing | ChunkState::Ready
        )
    }

    /// # Panics
    /// Panics unless the chunk is `Uninitialized`.
    pub fn begin_generation(&mut self) {
        assert_eq!(
            self.state,
            ChunkState::Uninitialized,
            "chunk generation started twice"
        );
        self.state = ChunkState::Generating;
    }

    /// Moves a freshly generated or directly installed chunk to `Dirty`.
    ///
    /// # Panics
    /// Panics if the chunk already holds terrain.
    pub fn finish_generation(&mut self) {
        assert!(
            matches!(self.state, ChunkState::Uninitialized | ChunkState::Generating),
            "chunk initialised twice (state {:?})",
            self.state
        );
        self.state = ChunkState::Dirty;
        self.revision += 1;
    }

    /// Marks a live chunk stale. Returns `false` for chunks without terrain.
    pub fn mark_dirty(&mut self) -> bool {
        if !self.is_live() {
            return false;
        }
        self.state = ChunkState::Dirty;
        self.revision += 1;
        true
    }

    /// Starts a remesh of a dirty chunk, returning the revision it captures.
    pub fn begin_remesh(&mut self) -> Option<u64> {
        if self.state != ChunkState::Dirty {
            return None;
        }
        self.state = ChunkState::Remeshing;
        Some(self.revision)
    }

    /// Accepts a remesh result. Returns `false` if the result is stale.
    pub fn finish_remesh(&mut self, revision: u64) -> bool {
        if self.state != ChunkState::Remeshing || revision != self.revision {
            return false;
        }
        self.state = ChunkState::Ready;
        true
    }
}

/// Totals from one [`ChunkLifecycleManager::run_blocking`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub chunks_generated: usize,
    pub chunks_meshed: usize,
    pub light_steps: usize,
    pub edits_applied: usize,
}

/// Orders terrain generation, light resolution and remeshing.
pub struct ChunkLifecycleManager {
    generator: Arc<TerrainGenerator>,
    mesh_builder: MeshBuilder,
}

impl ChunkLifecycleManager {
    pub fn new(generator: TerrainGenerator, mesh_builder: MeshBuilder) -> Self {
        ChunkLifecycleManager {
            generator: Arc::new(generator),
            mesh_builder,
        }
    }

    pub fn generator(&self) -> &TerrainGenerator {
        &self.generator
    }

    pub fn mesh_builder(&self) -> &MeshBuilder {
        &self.mesh_builder
    }

    /// Moves every `Uninitialized` chunk to `Generating` and returns one
    /// generation task per chunk, in ascending coordinate order.
    pub fn schedule_generation(&self, world: &World) -> Vec<Box<dyn Task + Send>> {
        let mut tasks: Vec<Box<dyn Task + Send>> = Vec::new();
        for position in world.positions() {
            let Some(handle) = world.chunk(position) else {
                continue;
            };
            let mut chunk = handle.write();
            if chunk.state() != ChunkState::Uninitialized {
                continue;
            }
            chunk.lifecycle.begin_generation();
            tasks.push(Box::new(ChunkGenerationTask::new(
                handle.clone(),
                position,
                world.chunk_size(),
                self.generator.clone(),
            )));
        }
        if !tasks.is_empty() {
            debug!("Scheduled terrain generation for {} chunks", tasks.len());
        }
        tasks
    }

    /// Moves every `Dirty` chunk to `Remeshing` and returns one mesh task per
    /// chunk, in ascending coordinate order.
    pub fn schedule_remesh(&self, world: &World) -> Vec<Box<dyn Task + Send>> {
        let mut tasks: Vec<Box<dyn Task + Send>> = Vec::new();
        for position in world.positions() {
            let Some(revision) = world.begin_remesh(position) else {
                continue;
            };
            tasks.push(Box::new(ChunkMeshGenerationTask::new(
                position,
                revision,
                world.neighborhood_handles(position),
                self.mesh_builder.clone(),
            )));
        }
        if !tasks.is_empty() {
            debug!("Scheduled remesh for {} chunks", tasks.len());
        }
        tasks
    }

    /// Runs every stage on the calling thread until no chunk has work left.
    pub fn run_blocking(&self, world: &mut World, consumer: &mut dyn MeshConsumer) -> PipelineReport {
        let start = Instant::now();
        let mut report = PipelineReport::default();

        loop {
            let mut progressed = false;

            for position in world.positions() {
                let claimed = world.chunk(position).is_some_and(|handle| {
                    let mut chunk = handle.write();
                    if chunk.state() != ChunkState::Uninitialized {
                        return false;
                    }
                    chunk.lifecycle.begin_generation();
                    true
                });
                if !claimed {
                    continue;
                }
                let grid = self.generator.generate(position, world.chunk_size());
                world.install_terrain(position, grid);
                report.chunks_generated += 1;
                progressed = true;
            }

            let resolved = world.resolve_pending();
            report.light_steps += resolved.light_steps;
            report.edits_applied += resolved.edits_applied;

            for position in world.positions() {
                let Some(revision) = world.begin_remesh(position) else {
                    continue;
                };
                let handles = world.neighborhood_handles(position);
                let surface = build_chunk_surface(&handles, &self.mesh_builder);
                if world.apply_surface(position, revision, surface.face_masks, surface.mesh.clone()) {
                    consumer.apply_mesh(position, &surface.mesh);
                    report.chunks_meshed += 1;
                }
                progressed = true;
            }

            if !progressed && !world.has_pending_work() {
                break;
            }
        }

        info!(
            "Blocking pipeline finished in {:?}: {} generated, {} meshed, {} light steps",
            start.elapsed(),
            report.chunks_generated,
            report.chunks_meshed,
            report.light_steps
        );
        report
    }
}
