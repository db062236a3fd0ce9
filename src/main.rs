//! # Voxel World Demo
//!
//! Streams a small world around a moving loader, places a lamp and digs a
//! shaft, then logs mesh statistics.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- [config.json]
//! ```

use std::process::ExitCode;

use cgmath::Point3;
use log::{error, info};
use voxel_world::{
    engine::{rendering::MeshCollector, voxels::block::Voxel, Engine},
    init_logger, EngineConfig,
};

const MAX_TICKS: usize = 10_000;

fn main() -> ExitCode {
    init_logger();
    info!("Logger initialized");

    let config = match std::env::args().nth(1) {
        Some(path) => match EngineConfig::from_file(&path) {
            Ok(config) => config,
            Err(err) => {
                error!("Failed to load {}: {}", path, err);
                return ExitCode::FAILURE;
            }
        },
        None => EngineConfig::default(),
    };

    let mut engine = match Engine::new(config, MeshCollector::new()) {
        Ok(engine) => engine,
        Err(err) => {
            error!("Invalid configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let origin = Point3::new(0.0, 0.0, 0.0);
    let ticks = engine.run_until_idle(origin, MAX_TICKS);
    info!("Initial world settled after {} ticks", ticks);
    log_meshes(&engine);

    let size = engine.config().chunk_size as i32;
    let lamp = Point3::new(size / 2, size / 2, size / 2);
    let edits = [(lamp, Voxel::Lamp)]
        .into_iter()
        .chain((0..size).map(|y| (Point3::new(1, y, 1), Voxel::Empty)));
    for (position, voxel) in edits {
        if let Err(err) = engine.request_edit_at(position, voxel) {
            error!("Edit at {:?} rejected: {}", position, err);
        }
    }
    let ticks = engine.run_until_idle(origin, MAX_TICKS);
    info!("Edits settled after {} ticks", ticks);
    match engine.world().light_at(lamp) {
        Ok(light) => info!("Light at lamp: block {}, sky {}", light.block(), light.sky()),
        Err(err) => error!("Lamp lookup failed: {}", err),
    }

    // Walk two chunks east.
    let block_size = engine.config().block_size;
    let east = Point3::new(2.0 * size as f32 * block_size, 0.0, 0.0);
    let ticks = engine.run_until_idle(east, MAX_TICKS);
    info!("Streamed east in {} ticks", ticks);
    log_meshes(&engine);
    engine.world().log_summary();

    ExitCode::SUCCESS
}

fn log_meshes(engine: &Engine<MeshCollector>) {
    let meshes = engine.consumer();
    info!(
        "{} chunk meshes ({} applied, {} removed), {} quads",
        meshes.len(),
        meshes.applied(),
        meshes.removed(),
        meshes.total_quads()
    );
}
