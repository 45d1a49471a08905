//! Leaves that change blocks: dig, place, and picking the right item first.

use std::ops::Range;
use std::sync::Arc;

use bot_core::{Status, TaskResult};
use bot_world::{
    Face, Intent, Position, Slot, SlotIndex, INVENTORY_HOTBAR_START, INVENTORY_OFFHAND_INDEX,
    INVENTORY_STORAGE_START, PLAYER_INVENTORY_ID,
};

use crate::client::BehaviourClient;
use crate::confirm::{send_and_confirm, settle, TaskFailure};
use crate::keys;

pub const CHEST_NAME: &str = "minecraft:chest";

/// Store every loaded chest position under `World.ChestsPos`.
pub fn get_all_chests_around(c: &mut BehaviourClient) -> TaskResult {
    let chest = c.assets().blockstate_by_name(CHEST_NAME).map(|b| b.id);
    let chests = match chest {
        Some(id) => c.world().read(|w| w.find_blocks(id)),
        None => Vec::new(),
    };
    tracing::debug!(agent = %c.name(), count = chests.len(), "chests found");
    keys::WORLD_CHESTS_POS.set(c.blackboard_mut(), chests);
    Ok(Status::Success)
}

/// Break the block at `position` and wait until the world shows air there.
pub fn dig(c: &mut BehaviourClient, position: Position, face: Face) -> TaskResult {
    let outcome = try_dig(c, position, face);
    Ok(settle(c, "dig", outcome))
}

pub(crate) fn try_dig(
    c: &mut BehaviourClient,
    position: Position,
    face: Face,
) -> Result<(), TaskFailure> {
    let current = c
        .world()
        .read(|w| w.get_block(position))
        .ok_or_else(|| TaskFailure::impossible(format!("block at {position} is not loaded")))?;
    if c.assets().is_air(current) == Some(true) {
        return Ok(());
    }

    send_and_confirm(c, Intent::Dig { position, face }, "dig", move |c| {
        c.world()
            .read(|w| w.get_block(position))
            .is_some_and(|id| c.assets().is_air(id) == Some(true))
    })?;
    tracing::debug!(agent = %c.name(), %position, "block dug");
    Ok(())
}

/// Make `item_name` the held item, selecting a hotbar slot or swapping it in
/// from storage.
pub fn set_item_in_hand(c: &mut BehaviourClient, item_name: &str) -> TaskResult {
    let outcome = try_set_item_in_hand(c, item_name);
    Ok(settle(c, "set item in hand", outcome))
}

pub(crate) fn try_set_item_in_hand(
    c: &mut BehaviourClient,
    item_name: &str,
) -> Result<(), TaskFailure> {
    let item = c
        .assets()
        .item_by_name(item_name)
        .ok_or_else(|| TaskFailure::impossible(format!("unknown item {item_name}")))?;

    let (in_hand, hotbar, storage, selected) = c.inventory().read(|inv| {
        let player = inv.player_inventory();
        let find = |range: Range<SlotIndex>| {
            range
                .into_iter()
                .find(|i| player.slot(*i).and_then(Slot::item) == Some(item))
        };
        (
            inv.item_in_hand() == Some(item),
            find(INVENTORY_HOTBAR_START..INVENTORY_OFFHAND_INDEX),
            find(INVENTORY_STORAGE_START..INVENTORY_HOTBAR_START),
            inv.selected_hotbar(),
        )
    });

    if in_hand {
        return Ok(());
    }

    if let Some(slot) = hotbar {
        let index = (slot - INVENTORY_HOTBAR_START) as u8;
        send_and_confirm(c, Intent::SelectHotbar { index }, "select hotbar", move |c| {
            c.inventory().read(|inv| inv.selected_hotbar() == index)
        })?;
        return Ok(());
    }

    if let Some(slot) = storage {
        let intent = Intent::ClickSwap {
            window: PLAYER_INVENTORY_ID,
            source: slot,
            destination: INVENTORY_HOTBAR_START + selected as SlotIndex,
        };
        send_and_confirm(c, intent, "swap into hand", move |c| {
            c.inventory().read(|inv| inv.item_in_hand() == Some(item))
        })?;
        return Ok(());
    }

    Err(TaskFailure::impossible(format!(
        "no {item_name} in inventory"
    )))
}

/// Place `item_name` at `position`, clicking `face` of the anchor block.
///
/// Without `wait_confirmation` the task succeeds as soon as the intent is sent.
pub fn place_block(
    c: &mut BehaviourClient,
    item_name: &str,
    position: Position,
    face: Face,
    wait_confirmation: bool,
) -> TaskResult {
    let outcome = try_place_block(c, item_name, position, face, wait_confirmation);
    Ok(settle(c, "place block", outcome))
}

fn try_place_block(
    c: &mut BehaviourClient,
    item_name: &str,
    position: Position,
    face: Face,
    wait_confirmation: bool,
) -> Result<(), TaskFailure> {
    let assets = Arc::clone(&c.handles().assets);
    let placed = assets
        .blockstate_by_name(item_name)
        .map(|b| b.id)
        .ok_or_else(|| TaskFailure::impossible(format!("{item_name} is not a block")))?;
    let current = c
        .world()
        .read(|w| w.get_block(position))
        .ok_or_else(|| TaskFailure::impossible(format!("block at {position} is not loaded")))?;
    if current == placed {
        return Ok(());
    }
    if assets.is_air(current) != Some(true) {
        return Err(TaskFailure::impossible(format!("{position} is occupied")));
    }

    try_set_item_in_hand(c, item_name)?;

    let intent = Intent::PlaceBlock { position, face };
    if !wait_confirmation {
        c.send(intent)?;
        return Ok(());
    }
    send_and_confirm(c, intent, "place block", move |c| {
        c.world().read(|w| w.get_block(position)) == Some(placed)
    })?;
    tracing::debug!(agent = %c.name(), %position, item = item_name, "block placed");
    Ok(())
}
