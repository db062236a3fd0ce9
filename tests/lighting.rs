//! Light propagation scenarios run through the public `World` API: decay
//! from a lamp, undecayed sky shafts, retraction when sources or chunks
//! disappear and hand-off across chunk faces.

use std::collections::{HashMap, VecDeque};

use cgmath::Point3;
use voxel_world::engine::voxels::{
    block::{Direction, Voxel},
    chunk::VoxelGrid,
    lighting::{LightChannel, LightLevel, MAX_LIGHT},
    world::World,
};

fn p(x: i32, y: i32, z: i32) -> Point3<i32> {
    Point3::new(x, y, z)
}

/// A world whose chunks are all empty and unlit.
fn dark_world(size: usize, chunks: &[Point3<i32>]) -> World {
    let mut world = World::new(size, 1.0);
    for &position in chunks {
        assert!(world.load_chunk(position, VoxelGrid::new(size)));
    }
    world
}

fn block(world: &World, voxel: Point3<i32>) -> u8 {
    world.light_at(voxel).unwrap().block()
}

fn sky(world: &World, voxel: Point3<i32>) -> u8 {
    world.light_at(voxel).unwrap().sky()
}

fn manhattan(a: Point3<i32>, b: Point3<i32>) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs() + (a.z - b.z).abs()
}

fn cells(extent: Point3<i32>) -> impl Iterator<Item = Point3<i32>> {
    cells_between(p(0, 0, 0), extent)
}

/// Cells of the box `[min, max)`.
fn cells_between(min: Point3<i32>, max: Point3<i32>) -> impl Iterator<Item = Point3<i32>> {
    (min.z..max.z).flat_map(move |z| {
        (min.y..max.y).flat_map(move |y| (min.x..max.x).map(move |x| p(x, y, z)))
    })
}

/// Light of one channel computed from scratch over the box `[min, max)`.
///
/// Lamps seed block light. Sky light enters every transparent cell of the
/// top layer at full strength and keeps that strength going straight down.
fn reference_light(
    world: &World,
    min: Point3<i32>,
    max: Point3<i32>,
    channel: LightChannel,
) -> HashMap<Point3<i32>, u8> {
    let mut light = HashMap::new();
    let mut queue = VecDeque::new();
    for cell in cells_between(min, max) {
        let voxel = world.voxel_at(cell).unwrap();
        let level = match channel {
            LightChannel::Sky if cell.y == max.y - 1 && voxel.is_transparent() => MAX_LIGHT,
            _ => voxel.emission(channel),
        };
        light.insert(cell, level);
        if level > 0 {
            queue.push_back(cell);
        }
    }

    while let Some(cell) = queue.pop_front() {
        let level = light[&cell];
        for direction in Direction::ALL {
            let offered = if channel == LightChannel::Sky
                && direction == Direction::Down
                && level == MAX_LIGHT
            {
                MAX_LIGHT
            } else {
                level.saturating_sub(1)
            };
            let neighbor = cell + direction.offset();
            let inside = (min.x..max.x).contains(&neighbor.x)
                && (min.y..max.y).contains(&neighbor.y)
                && (min.z..max.z).contains(&neighbor.z);
            if offered == 0 || !inside || !world.voxel_at(neighbor).unwrap().is_transparent() {
                continue;
            }
            if light[&neighbor] < offered {
                light.insert(neighbor, offered);
                queue.push_back(neighbor);
            }
        }
    }
    light
}

fn reference_block_light(world: &World, extent: Point3<i32>) -> HashMap<Point3<i32>, u8> {
    reference_light(world, p(0, 0, 0), extent, LightChannel::Block)
}

/// A world of open-air chunks lit by the sky, with nothing loaded above.
fn sky_world(size: usize, chunks: &[Point3<i32>]) -> World {
    let mut world = World::new(size, 1.0);
    for &position in chunks {
        assert!(world.load_chunk(position, VoxelGrid::filled(size, Voxel::Empty, LightLevel::SKY)));
    }
    world.resolve_pending();
    world
}

#[test]
fn lamp_light_decays_one_level_per_step() {
    let mut world = dark_world(16, &[p(0, 0, 0)]);
    let lamp = p(8, 8, 8);
    world.request_edit_at(lamp, Voxel::Lamp).unwrap();
    world.resolve_pending();

    assert_eq!(block(&world, lamp), MAX_LIGHT);
    assert_eq!(block(&world, p(8, 8, 7)), 14);
    assert_eq!(block(&world, p(8, 8, 6)), 13);
    assert_eq!(block(&world, p(0, 8, 15)), 0);
    assert_eq!(block(&world, p(15, 15, 15)), 0);

    for cell in cells(p(16, 16, 16)) {
        let expected = (MAX_LIGHT as i32 - manhattan(cell, lamp)).max(0) as u8;
        assert_eq!(block(&world, cell), expected, "block light at {:?}", cell);
        assert_eq!(sky(&world, cell), 0);
    }
}

#[test]
fn open_sky_column_does_not_decay_downward() {
    let mut world = dark_world(16, &[p(0, 0, 0)]);
    world
        .request_light_change(p(0, 0, 0), p(8, 15, 8), LightChannel::Sky, MAX_LIGHT)
        .unwrap();
    world.resolve_pending();

    for y in 0..16 {
        assert_eq!(sky(&world, p(8, y, 8)), MAX_LIGHT, "column at y = {}", y);
        assert_eq!(sky(&world, p(9, y, 8)), 14, "first lateral step at y = {}", y);
        assert_eq!(sky(&world, p(10, y, 8)), 13, "second lateral step at y = {}", y);
        assert_eq!(sky(&world, p(11, y, 8)), 12, "third lateral step at y = {}", y);
        assert_eq!(block(&world, p(8, y, 8)), 0);
    }
}

#[test]
fn removing_a_lamp_leaves_no_residual_light() {
    let mut world = dark_world(16, &[p(0, 0, 0)]);
    let lamp = p(8, 8, 8);
    world.request_edit_at(lamp, Voxel::Lamp).unwrap();
    world.resolve_pending();
    assert_eq!(block(&world, p(8, 8, 1)), 8);

    world.request_edit_at(lamp, Voxel::Empty).unwrap();
    world.resolve_pending();

    for cell in cells(p(16, 16, 16)) {
        assert_eq!(block(&world, cell), 0, "residual light at {:?}", cell);
    }
}

#[test]
fn removing_a_lamp_under_open_sky_restores_ambient_light() {
    let mut world = World::new(16, 1.0);
    assert!(world.load_chunk(p(0, 0, 0), VoxelGrid::filled(16, Voxel::Empty, LightLevel::SKY)));
    world.resolve_pending();

    let lamp = p(8, 8, 8);
    world.request_edit_at(lamp, Voxel::Lamp).unwrap();
    world.resolve_pending();

    // The lamp shades the shaft below it; the shaft is lit sideways.
    assert_eq!(sky(&world, lamp), 0);
    assert_eq!(sky(&world, p(8, 7, 8)), 14);
    assert_eq!(sky(&world, p(8, 0, 8)), 14);
    assert_eq!(sky(&world, p(8, 9, 8)), MAX_LIGHT);
    assert_eq!(block(&world, p(8, 7, 8)), 14);

    world.request_edit_at(lamp, Voxel::Empty).unwrap();
    world.resolve_pending();

    for cell in cells(p(16, 16, 16)) {
        assert_eq!(block(&world, cell), 0, "block light at {:?}", cell);
        assert_eq!(sky(&world, cell), MAX_LIGHT, "sky light at {:?}", cell);
    }
}

#[test]
fn lowering_a_light_source_settles_at_the_new_level() {
    let mut world = dark_world(16, &[p(0, 0, 0)]);
    let chunk = p(0, 0, 0);
    let source = p(8, 8, 8);
    world.request_light_change(chunk, source, LightChannel::Block, 15).unwrap();
    world.resolve_pending();
    assert_eq!(block(&world, p(8, 8, 2)), 9);

    world.request_light_change(chunk, source, LightChannel::Block, 5).unwrap();
    world.resolve_pending();

    assert_eq!(block(&world, source), 5);
    assert_eq!(block(&world, p(8, 8, 6)), 3);
    assert_eq!(block(&world, p(8, 8, 2)), 0);
}

#[test]
fn light_crossing_a_chunk_face_matches_a_single_large_chunk() {
    let mut split = dark_world(8, &[p(0, 0, 0), p(1, 0, 0)]);
    let mut whole = dark_world(16, &[p(0, 0, 0)]);

    for world in [&mut split, &mut whole] {
        world.request_edit_at(p(6, 3, 4), Voxel::Lamp).unwrap();
        world.request_edit_at(p(8, 3, 5), Voxel::Stone).unwrap();
        world.resolve_pending();
    }

    for cell in cells(p(16, 8, 8)) {
        assert_eq!(block(&split, cell), block(&whole, cell), "block light at {:?}", cell);
    }
    assert_eq!(block(&split, p(8, 3, 4)), 13);
    assert_eq!(block(&split, p(8, 3, 5)), 0);
}

#[test]
fn chunk_loaded_later_is_lit_from_its_neighbour() {
    let mut world = dark_world(8, &[p(0, 0, 0)]);
    world.request_edit_at(p(7, 4, 4), Voxel::Lamp).unwrap();
    world.resolve_pending();
    assert!(world.light_at(p(8, 4, 4)).is_err());

    assert!(world.load_chunk(p(1, 0, 0), VoxelGrid::new(8)));
    world.resolve_pending();

    assert_eq!(block(&world, p(8, 4, 4)), 14);
    assert_eq!(block(&world, p(10, 4, 4)), 12);
    assert_eq!(block(&world, p(15, 4, 4)), 7);
}

#[test]
fn depropagation_matches_a_from_scratch_recompute() {
    let extent = p(16, 8, 8);
    let mut world = dark_world(8, &[p(0, 0, 0), p(1, 0, 0)]);
    let mut rng = fastrand::Rng::with_seed(0x5eed);

    for step in 0..80 {
        let cell = p(rng.i32(0..extent.x), rng.i32(0..extent.y), rng.i32(0..extent.z));
        let voxel = match rng.u8(0..10) {
            0..=3 => Voxel::Empty,
            4..=6 => Voxel::Stone,
            _ => Voxel::Lamp,
        };
        world.request_edit_at(cell, voxel).unwrap();
        world.resolve_pending();

        let reference = reference_block_light(&world, extent);
        for cell in cells(extent) {
            assert_eq!(
                block(&world, cell),
                reference[&cell],
                "step {}: block light at {:?}",
                step,
                cell
            );
        }
    }
}

#[test]
fn batched_edits_match_a_from_scratch_recompute() {
    let extent = p(16, 8, 8);
    let mut world = dark_world(8, &[p(0, 0, 0), p(1, 0, 0)]);
    let mut rng = fastrand::Rng::with_seed(42);

    for _ in 0..6 {
        for _ in 0..12 {
            let cell = p(rng.i32(0..extent.x), rng.i32(0..extent.y), rng.i32(0..extent.z));
            let voxel = if rng.bool() { Voxel::Lamp } else { Voxel::Empty };
            world.request_edit_at(cell, voxel).unwrap();
        }
        world.resolve_pending();

        let reference = reference_block_light(&world, extent);
        for cell in cells(extent) {
            assert_eq!(block(&world, cell), reference[&cell], "block light at {:?}", cell);
        }
    }
}

#[test]
fn same_edit_sequence_gives_identical_light() {
    let run = || {
        let mut world = dark_world(8, &[p(0, 0, 0), p(0, 0, 1)]);
        let mut rng = fastrand::Rng::with_seed(99);
        for _ in 0..40 {
            let cell = p(rng.i32(0..8), rng.i32(0..8), rng.i32(0..16));
            let voxel = Voxel::ALL[rng.usize(0..Voxel::ALL.len())];
            world.request_edit_at(cell, voxel).unwrap();
            if rng.bool() {
                world.resolve_pending();
            }
        }
        world.resolve_pending();
        world
            .positions()
            .into_iter()
            .map(|position| {
                let handle = world.chunk(position).unwrap();
                let chunk = handle.read();
                chunk.grid().light_levels().to_vec()
            })
            .collect::<Vec<_>>()
    };

    assert_eq!(run(), run());
}

#[test]
fn reopening_the_top_of_a_shaft_restores_full_sky_light() {
    let mut world = sky_world(16, &[p(0, 0, 0)]);
    let top = p(8, 15, 8);

    world.request_edit_at(top, Voxel::Stone).unwrap();
    world.resolve_pending();
    assert_eq!(sky(&world, top), 0);
    assert_eq!(sky(&world, p(8, 14, 8)), 14);
    assert_eq!(sky(&world, p(8, 0, 8)), 14);

    world.request_edit_at(top, Voxel::Empty).unwrap();
    world.resolve_pending();
    for y in 0..16 {
        assert_eq!(sky(&world, p(8, y, 8)), MAX_LIGHT, "column at y = {}", y);
    }
}

#[test]
fn sky_light_matches_a_from_scratch_recompute() {
    let extent = p(16, 8, 8);
    let mut world = sky_world(8, &[p(0, 0, 0), p(1, 0, 0)]);
    let mut rng = fastrand::Rng::with_seed(0x5c1e);

    for step in 0..120 {
        // Half of the edits land on the top layer, where the sky enters.
        let y = if rng.bool() { extent.y - 1 } else { rng.i32(0..extent.y) };
        let cell = p(rng.i32(0..extent.x), y, rng.i32(0..extent.z));
        let voxel = match rng.u8(0..10) {
            0..=4 => Voxel::Empty,
            5..=8 => Voxel::Stone,
            _ => Voxel::Lamp,
        };
        world.request_edit_at(cell, voxel).unwrap();
        // Some edits are left queued and resolved with the next ones.
        if rng.u8(0..3) == 0 {
            continue;
        }
        world.resolve_pending();

        let reference = reference_light(&world, p(0, 0, 0), extent, LightChannel::Sky);
        for cell in cells(extent) {
            assert_eq!(sky(&world, cell), reference[&cell], "step {}: sky light at {:?}", step, cell);
        }
    }
}

#[test]
fn unloading_a_chunk_retracts_the_light_it_spread() {
    let mut world = dark_world(8, &[p(0, 0, 0), p(1, 0, 0)]);
    world.request_edit_at(p(7, 4, 4), Voxel::Lamp).unwrap();
    world.resolve_pending();
    assert_eq!(block(&world, p(8, 4, 4)), 14);

    assert!(world.destroy_chunk(p(0, 0, 0)).is_some());
    world.resolve_pending();
    for cell in cells_between(p(8, 0, 0), p(16, 8, 8)) {
        assert_eq!(block(&world, cell), 0, "residual light at {:?}", cell);
    }
}

#[test]
fn unloading_leaves_neighbours_as_if_recomputed() {
    let mut rng = fastrand::Rng::with_seed(0xdead);
    for _ in 0..5 {
        let mut world = dark_world(8, &[p(0, 0, 0), p(1, 0, 0), p(2, 0, 0)]);
        for _ in 0..30 {
            let cell = p(rng.i32(0..24), rng.i32(0..8), rng.i32(0..8));
            let voxel = if rng.u8(0..3) == 0 { Voxel::Lamp } else { Voxel::Stone };
            world.request_edit_at(cell, voxel).unwrap();
        }
        world.resolve_pending();

        assert!(world.destroy_chunk(p(1, 0, 0)).is_some());
        for (min, max) in [(p(0, 0, 0), p(8, 8, 8)), (p(16, 0, 0), p(24, 8, 8))] {
            let reference = reference_light(&world, min, max, LightChannel::Block);
            for cell in cells_between(min, max) {
                assert_eq!(block(&world, cell), reference[&cell], "block light at {:?}", cell);
            }
        }
    }
}

