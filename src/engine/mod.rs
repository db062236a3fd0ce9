//! # Engine Module
//!
//! Ties the voxel world, the lifecycle stages and the worker pool together.
//!
//! ## Key Components
//!
//! * `Engine` - owns the world and drives it one tick at a time
//! * `rendering` - face meshing with smooth lighting and mesh consumers
//! * `task_management` - worker threads for generation and meshing
//! * `voxels` - voxel storage, lighting, terrain and chunk lifecycle
//!
//! ## Tick Order
//!
//! 1. Stream chunks around the loader position
//! 2. Apply completed task results
//! 3. Schedule terrain generation for new chunks
//! 4. Resolve pending edits and light
//! 5. Schedule remeshing of dirty chunks
//! 6. Hand queued tasks to free workers

pub mod rendering;
pub mod task_management;
pub mod voxels;

use std::time::Duration;

use cgmath::Point3;
use log::{debug, info, warn};

use rendering::MeshConsumer;
use task_management::{task::TaskContext, TaskManager};
use voxels::{
    block::Voxel,
    chunk_index::world_to_chunk,
    lifecycle::{ChunkLifecycleManager, ChunkState},
    lighting::ResolveReport,
    loader::{ChunkLoader, RadiusChunkLoader},
    terrain::TerrainGenerator,
    world::World,
};

use crate::{
    config::EngineConfig,
    error::{ConfigError, VoxelError},
};

/// How long `run_until_idle` blocks waiting for a worker before ticking again.
const IDLE_WAIT: Duration = Duration::from_millis(5);

/// What one [`Engine::tick`] did.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub chunks_created: usize,
    pub chunks_destroyed: usize,
    pub results_applied: usize,
    pub generation_scheduled: usize,
    pub remesh_scheduled: usize,
    pub resolve: ResolveReport,
}

/// A streaming voxel world driven by the host loop.
pub struct Engine<C: MeshConsumer> {
    config: EngineConfig,
    world: World,
    lifecycle: ChunkLifecycleManager,
    task_manager: TaskManager,
    loader: Box<dyn ChunkLoader>,
    consumer: C,
    /// Chunk the loader was in when the load plan was last applied.
    loader_chunk: Option<Point3<i32>>,
}

impl<C: MeshConsumer> Engine<C> {
    /// Builds an engine with the terrain described by `config.terrain`.
    pub fn new(config: EngineConfig, consumer: C) -> Result<Self, ConfigError> {
        config.validate()?;
        let generator = TerrainGenerator::from_config(&config.terrain);
        Self::with_generator(config, generator, consumer)
    }

    /// Builds an engine with a custom terrain generator.
    pub fn with_generator(
        config: EngineConfig,
        generator: TerrainGenerator,
        consumer: C,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let world = World::from_config(&config);
        let lifecycle = ChunkLifecycleManager::new(
            generator,
            rendering::MeshBuilder::new(config.block_size),
        );
        let task_manager = TaskManager::new(config.worker_count);
        let loader = Box::new(RadiusChunkLoader::new(
            config.load_radius,
            config.vertical_load_radius,
        ));

        info!(
            "Engine ready: chunk size {}, block size {}, load radius {}/{}, {} workers",
            config.chunk_size,
            config.block_size,
            config.load_radius,
            config.vertical_load_radius,
            config.worker_count
        );

        Ok(Engine {
            config,
            world,
            lifecycle,
            task_manager,
            loader,
            consumer,
            loader_chunk: None,
        })
    }

    /// Replaces the streaming strategy. The next tick replans.
    pub fn with_loader(mut self, loader: Box<dyn ChunkLoader>) -> Self {
        self.loader = loader;
        self.loader_chunk = None;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct world access for hosts that load or edit chunks themselves.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn consumer(&self) -> &C {
        &self.consumer
    }

    pub fn consumer_mut(&mut self) -> &mut C {
        &mut self.consumer
    }

    /// Queues a voxel write at a world voxel coordinate. It is applied on the
    /// next tick.
    pub fn request_edit_at(&mut self, voxel: Point3<i32>, value: Voxel) -> Result<(), VoxelError> {
        self.world.request_edit_at(voxel, value)
    }

    /// Advances the world by one step. `loader_position` is in world units.
    pub fn tick(&mut self, loader_position: Point3<f32>) -> TickReport {
        let mut report = TickReport::default();

        let center = world_to_chunk(
            loader_position,
            self.config.block_size,
            self.config.chunk_size,
        );
        if self.loader_chunk != Some(center) {
            self.stream(center, &mut report);
            self.loader_chunk = Some(center);
        }

        report.results_applied = self.apply_results(None);

        let generation = self.lifecycle.schedule_generation(&self.world);
        report.generation_scheduled = generation.len();
        self.task_manager.publish_all(generation);

        report.resolve = self.world.resolve_pending();

        let remesh = self.lifecycle.schedule_remesh(&self.world);
        report.remesh_scheduled = remesh.len();
        self.task_manager.publish_all(remesh);

        self.task_manager.process_queued_tasks();
        report
    }

    /// Ticks until no chunk, edit or task has work left, or `max_ticks` is
    /// reached. Returns the number of ticks run.
    pub fn run_until_idle(&mut self, loader_position: Point3<f32>, max_ticks: usize) -> usize {
        for ticks in 1..=max_ticks {
            self.tick(loader_position);
            if self.is_idle() {
                debug!("Engine idle after {} ticks", ticks);
                return ticks;
            }
            if self.task_manager.in_flight() > 0 {
                self.apply_results(Some(IDLE_WAIT));
            }
        }
        warn!("Engine still busy after {} ticks", max_ticks);
        max_ticks
    }

    /// Every chunk is meshed against its current data and nothing is queued.
    pub fn is_idle(&self) -> bool {
        self.task_manager.is_idle()
            && !self.world.has_pending_work()
            && self
                .world
                .state_counts()
                .iter()
                .all(|(state, count)| *state == ChunkState::Ready || *count == 0)
    }

    fn stream(&mut self, center: Point3<i32>, report: &mut TickReport) {
        let plan = self.loader.plan(center, &self.world.positions());
        if plan.is_empty() {
            return;
        }
        info!(
            "Streaming around chunk {:?}: {} to create, {} to destroy",
            center,
            plan.create.len(),
            plan.destroy.len()
        );

        for position in plan.destroy {
            if self.world.destroy_chunk(position).is_some() {
                self.consumer.remove_mesh(position);
                report.chunks_destroyed += 1;
            }
        }
        for position in plan.create {
            if self.world.create_chunk(position) {
                report.chunks_created += 1;
            }
        }
    }

    fn apply_results(&mut self, wait: Option<Duration>) -> usize {
        let mut context = TaskContext {
            world: &mut self.world,
            consumer: &mut self.consumer,
        };
        match wait {
            Some(timeout) => self.task_manager.wait_for_results(&mut context, timeout),
            None => self.task_manager.process_completed_tasks(&mut context),
        }
    }
}
