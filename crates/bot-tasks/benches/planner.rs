use std::collections::{BTreeMap, BTreeSet};

use bot_core::{Blackboard, SplitMix64};
use bot_tasks::planner::planning_region;
use bot_tasks::{plan, PlannerInput, StructureTarget, StructureView, TargetGrid};
use bot_world::{AssetTable, Chunk, Position, RegionSnapshot, Vec3, World};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const FLOOR_Y: i32 = 63;

fn flat_world() -> World {
    let mut world = World::new();
    for cx in -1..=1 {
        for cz in -1..=1 {
            let mut chunk = Chunk::filled(0);
            for x in 0..16 {
                for z in 0..16 {
                    chunk.set(x, FLOOR_Y, z, 1);
                }
            }
            world.load_chunk((cx, cz), chunk);
        }
    }
    world
}

fn bench_plan(c: &mut Criterion) {
    let mut world = flat_world();
    let assets = AssetTable::vanilla();
    let available = BTreeSet::from(["minecraft:stone".to_string()]);
    let others = [Vec3::new(-8.0, 64.0, -8.0), Vec3::new(8.0, 64.0, 8.0)];

    // A 16x8x16 stone cube whose lower half is already built, so the
    // frontier has to cross the finished part first.
    let size = Position::new(16, 8, 16);
    let start = Position::new(-8, FLOOR_Y + 1, -8);
    let palette = BTreeMap::from([(0, "minecraft:stone".to_string())]);
    let target = StructureTarget::new(start, TargetGrid::new(size, 0), palette)
        .expect("valid palette");
    for x in 0..size.x {
        for y in 0..size.y / 2 {
            for z in 0..size.z {
                world.set_block(start + Position::new(x, y, z), 1);
            }
        }
    }

    let mut bb = Blackboard::new();
    target.store(&mut bb);
    let structure = StructureView::read(&bb).expect("structure keys");
    let (min, max) = planning_region(&structure);

    c.bench_function("bot-tasks/plan(16x8x16)", |b| {
        let mut rng = SplitMix64::new(7);
        b.iter(|| {
            let region = RegionSnapshot::capture(&world, min, max);
            let input = PlannerInput {
                structure: &structure,
                available: &available,
                player: Position::new(0, FLOOR_Y + 1, 0),
                other_players: &others,
            };
            black_box(plan(&input, &region, &assets, &mut rng));
        })
    });
}

criterion_group!(benches, bench_plan);
criterion_main!(benches);
