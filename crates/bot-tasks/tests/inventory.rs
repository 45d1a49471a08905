mod common;

use bot_core::Status;
use bot_tasks::inventory_tasks::{
    close_container, get_blocks_available_in_inventory, get_some_food, open_container,
    swap_chests_inventory, swap_items_in_container,
};
use bot_tasks::{keys, ItemFilter};
use bot_world::{Intent, InventoryTable, Position, SimSettings, Slot, INVENTORY_HOTBAR_START};

use common::{harness, BREAD, DIRT, FLOOR_Y, STONE};

const Y: i32 = FLOOR_Y + 1;
const STONE_ITEM: i32 = STONE as i32;
const DIRT_ITEM: i32 = DIRT as i32;

fn count_of(slots: &[Slot], item: i32) -> u32 {
    slots
        .iter()
        .filter_map(|s| match s {
            Slot::Filled(stack) if stack.item == item => Some(u32::from(stack.count)),
            _ => None,
        })
        .sum()
}

#[test]
fn sweep_without_matching_items_changes_nothing() {
    let mut h = harness(SimSettings::default());
    let chests = [
        Position::new(5, Y, 5),
        Position::new(6, Y, 5),
        Position::new(7, Y, 5),
    ];
    for chest in chests {
        h.place_chest(chest, vec![Slot::of(DIRT_ITEM, 16), Slot::of(BREAD, 3)]);
    }
    h.give(9, DIRT_ITEM, 4);
    let player_before = h.player_slots();
    let chests_before: Vec<_> = chests.iter().map(|p| h.chest_contents(*p)).collect();

    let filter = ItemFilter::Only("minecraft:stone".to_string());
    assert_eq!(swap_chests_inventory(&mut h.client, &filter, true), Ok(Status::Success));

    assert_eq!(h.sent_swaps(), 0);
    let opened = h
        .tap
        .sent()
        .iter()
        .filter(|i| matches!(i, Intent::UseBlock { .. }))
        .count();
    assert_eq!(opened, 3);
    assert_eq!(h.player_slots(), player_before);
    let chests_after: Vec<_> = chests.iter().map(|p| h.chest_contents(*p)).collect();
    assert_eq!(chests_after, chests_before);
    assert_eq!(h.inventory.read(InventoryTable::first_opened_window_id), None);
}

#[test]
fn refill_takes_matching_stacks_and_leaves_food() {
    let mut h = harness(SimSettings::default());
    let chest = Position::new(5, Y, 5);
    h.place_chest(
        chest,
        vec![Slot::of(STONE_ITEM, 32), Slot::of(BREAD, 2), Slot::of(DIRT_ITEM, 8)],
    );

    let filter = ItemFilter::Except("minecraft:bread".to_string());
    assert_eq!(swap_chests_inventory(&mut h.client, &filter, true), Ok(Status::Success));

    let player = h.player_slots();
    assert_eq!(count_of(&player, STONE_ITEM), 32);
    assert_eq!(count_of(&player, DIRT_ITEM), 8);
    assert_eq!(count_of(&player, BREAD), 0);
    let contents = h.chest_contents(chest);
    assert_eq!(count_of(&contents, BREAD), 2);
    assert_eq!(count_of(&contents, STONE_ITEM), 0);
    assert_eq!(h.sent_swaps(), 2);
}

#[test]
fn store_moves_player_items_into_a_chest() {
    let mut h = harness(SimSettings::default());
    let chest = Position::new(5, Y, 5);
    h.place_chest(chest, Vec::new());
    h.give(9, DIRT_ITEM, 20);
    h.give(INVENTORY_HOTBAR_START, STONE_ITEM, 5);

    assert_eq!(
        swap_chests_inventory(&mut h.client, &ItemFilter::Any, false),
        Ok(Status::Success)
    );

    let player = h.player_slots();
    assert!(player.iter().all(Slot::is_empty));
    let contents = h.chest_contents(chest);
    assert_eq!(count_of(&contents, DIRT_ITEM), 20);
    assert_eq!(count_of(&contents, STONE_ITEM), 5);
}

#[test]
fn sweep_with_no_chests_succeeds() {
    let mut h = harness(SimSettings::default());
    assert_eq!(
        swap_chests_inventory(&mut h.client, &ItemFilter::Any, true),
        Ok(Status::Success)
    );
    assert!(h.tap.sent().is_empty());
    assert_eq!(
        keys::WORLD_CHESTS_POS.get(h.client.blackboard()).cloned(),
        Ok(Vec::new())
    );
}

#[test]
fn food_lands_in_the_first_hotbar_slot() {
    let mut h = harness(SimSettings::default());
    h.place_chest(Position::new(5, Y, 5), vec![Slot::Empty, Slot::of(BREAD, 6)]);

    assert_eq!(get_some_food(&mut h.client, "minecraft:bread"), Ok(Status::Success));

    let hand = h
        .inventory
        .read(|inv| inv.player_inventory().slot(INVENTORY_HOTBAR_START).cloned());
    assert_eq!(hand, Some(Slot::of(BREAD, 6)));
    assert_eq!(h.inventory.read(InventoryTable::first_opened_window_id), None);
}

#[test]
fn no_food_anywhere_is_a_failure() {
    let mut h = harness(SimSettings::default());
    h.place_chest(Position::new(5, Y, 5), vec![Slot::of(DIRT_ITEM, 1)]);
    assert_eq!(get_some_food(&mut h.client, "minecraft:bread"), Ok(Status::Failure));
    assert_eq!(get_some_food(&mut h.client, "minecraft:cake"), Ok(Status::Failure));
}

#[test]
fn block_list_reflects_storage_and_hotbar() {
    let mut h = harness(SimSettings::default());
    assert_eq!(get_blocks_available_in_inventory(&mut h.client), Ok(Status::Failure));
    assert_eq!(
        keys::INVENTORY_BLOCK_LIST.get(h.client.blackboard()).map(|s| s.len()),
        Ok(0)
    );

    h.give(12, STONE_ITEM, 3);
    h.give(40, DIRT_ITEM, 1);
    assert_eq!(get_blocks_available_in_inventory(&mut h.client), Ok(Status::Success));
    let names: Vec<String> = keys::INVENTORY_BLOCK_LIST
        .get(h.client.blackboard())
        .unwrap()
        .iter()
        .cloned()
        .collect();
    assert_eq!(names, ["minecraft:dirt", "minecraft:stone"]);
}

#[test]
fn open_swap_close_round() {
    let mut h = harness(SimSettings::default());
    let chest = Position::new(5, Y, 5);
    h.place_chest(chest, vec![Slot::of(STONE_ITEM, 10)]);

    assert_eq!(open_container(&mut h.client, chest), Ok(Status::Success));
    let window = h
        .inventory
        .read(InventoryTable::first_opened_window_id)
        .unwrap();
    // Only one container at a time.
    assert_eq!(open_container(&mut h.client, chest), Ok(Status::Failure));

    // Chest slot 0 into the first player storage slot (window slot 27).
    assert_eq!(
        swap_items_in_container(&mut h.client, window, 0, 27),
        Ok(Status::Success)
    );
    assert_eq!(
        swap_items_in_container(&mut h.client, window, 0, 500),
        Ok(Status::Failure)
    );
    assert_eq!(close_container(&mut h.client, window), Ok(Status::Success));

    let stored = h
        .inventory
        .read(|inv| inv.player_inventory().slot(9).cloned());
    assert_eq!(stored, Some(Slot::of(STONE_ITEM, 10)));
    assert_eq!(h.chest_contents(chest)[0], Slot::Empty);
}

#[test]
fn lost_open_request_skips_the_chest() {
    let mut h = common::harness_with(
        SimSettings {
            drop_rate: 1.0,
            ..SimSettings::default()
        },
        bot_tasks::AgentConfig {
            confirm_timeout_ms: 100,
            ..bot_tasks::AgentConfig::default()
        },
    );
    h.place_chest(Position::new(5, Y, 5), vec![Slot::of(STONE_ITEM, 10)]);

    assert_eq!(
        swap_chests_inventory(&mut h.client, &ItemFilter::Any, true),
        Ok(Status::Success)
    );
    assert_eq!(count_of(&h.player_slots(), STONE_ITEM), 0);
    assert_eq!(h.sent_swaps(), 0);
}

#[test]
fn chest_tasks_stop_once_shutdown_is_requested() {
    let mut h = harness(SimSettings::default());
    let chest = Position::new(5, Y, 5);
    let stacks: Vec<Slot> = (0..20).map(|_| Slot::of(STONE_ITEM, 64)).collect();
    h.place_chest(chest, stacks);
    h.place_chest(Position::new(6, Y, 5), vec![Slot::of(BREAD, 1)]);
    let before = h.chest_contents(chest);

    h.client.request_shutdown();
    assert_eq!(
        swap_chests_inventory(&mut h.client, &ItemFilter::Any, true),
        Ok(Status::Failure)
    );
    assert_eq!(
        get_some_food(&mut h.client, "minecraft:bread"),
        Ok(Status::Failure)
    );

    assert!(h.tap.sent().is_empty());
    assert_eq!(h.chest_contents(chest), before);
}
