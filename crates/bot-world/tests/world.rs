use std::io::Write;
use std::thread;

use bot_world::{
    AssetMetadata, AssetTable, Chunk, Position, SharedWorld, World, CHUNK_HEIGHT,
};

#[test]
fn unloaded_cells_are_unknown_not_air() {
    let mut world = World::new();
    world.load_chunk((0, 0), Chunk::filled(0));

    assert_eq!(world.get_block(Position::new(3, 64, 3)), Some(0));
    assert_eq!(world.get_block(Position::new(16, 64, 3)), None);
    assert_eq!(world.get_block(Position::new(3, CHUNK_HEIGHT, 3)), None);
    assert!(!world.set_block(Position::new(-1, 64, 0), 1));
}

#[test]
fn negative_coordinates_land_in_the_right_chunk() {
    let mut world = World::new();
    world.load_chunk((-1, -1), Chunk::filled(0));

    let pos = Position::new(-1, 70, -16);
    assert_eq!(World::chunk_coord(pos), (-1, -1));
    assert!(world.set_block(pos, 8));
    assert_eq!(world.get_block(pos), Some(8));
    assert_eq!(world.find_blocks(8), vec![pos]);
}

#[test]
fn shared_world_serialises_writers() {
    let world = SharedWorld::default();
    world.with_lock(|w| w.load_chunk((0, 0), Chunk::filled(0)));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let world = world.clone();
            thread::spawn(move || {
                for y in 0..10 {
                    world.with_lock(|w| w.set_block(Position::new(i, y, 0), 1));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let count = world.read(|w| w.find_blocks(1).len());
    assert_eq!(count, 40);
}

#[test]
fn asset_table_loads_from_yaml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "blockstates:\n  - {{ id: 0, name: \"minecraft:air\", air: true }}\n  - {{ id: 2, name: \"minecraft:chest\" }}\nitems:\n  9: \"minecraft:bread\""
    )
    .unwrap();

    let table = AssetTable::load(file.path()).unwrap();
    assert_eq!(table.blockstate(2).map(|b| b.name()), Some("minecraft:chest"));
    assert_eq!(table.item_name(9), Some("minecraft:bread"));
    assert!(AssetTable::load(&file.path().with_extension("missing")).is_err());
}

#[test]
fn vanilla_table_has_matching_block_items() {
    let table = AssetTable::vanilla();
    let stone = table.blockstate_by_name("minecraft:stone").unwrap();
    assert_eq!(table.item_by_name("minecraft:stone"), Some(stone.id as i32));
    assert_eq!(table.is_air(table.air_id()), Some(true));
}
