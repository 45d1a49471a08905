//! Container and inventory leaves. Every slot change goes through
//! [`send_and_confirm`] and is only trusted once the server has applied it.

use std::collections::BTreeSet;
use std::sync::Arc;

use bot_core::{DeterministicRng, Status, TaskResult};
use bot_world::{
    AssetMetadata, Face, Intent, InventoryTable, Position, Slot, SlotIndex, WindowId,
    INVENTORY_HOTBAR_START, INVENTORY_OFFHAND_INDEX, INVENTORY_STORAGE_START,
};
use serde::{Deserialize, Serialize};

use crate::client::BehaviourClient;
use crate::confirm::{await_confirmation, send_and_confirm, settle, TaskFailure};
use crate::keys;
use crate::world_tasks::get_all_chests_around;

/// Which items a chest sweep moves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemFilter {
    Any,
    Only(String),
    Except(String),
}

impl ItemFilter {
    pub fn accepts(&self, name: &str) -> bool {
        match self {
            ItemFilter::Any => true,
            ItemFilter::Only(only) => only == name,
            ItemFilter::Except(except) => except != name,
        }
    }
}

/// Right-click the container at `position` and wait for its window.
pub fn open_container(c: &mut BehaviourClient, position: Position) -> TaskResult {
    let outcome = try_open_container(c, position).map(|_| ());
    Ok(settle(c, "open container", outcome))
}

pub(crate) fn try_open_container(
    c: &mut BehaviourClient,
    position: Position,
) -> Result<WindowId, TaskFailure> {
    if c.world().read(|w| w.get_block(position)).is_none() {
        return Err(TaskFailure::impossible(format!(
            "container at {position} is not loaded"
        )));
    }
    if let Some(open) = c.inventory().read(InventoryTable::first_opened_window_id) {
        return Err(TaskFailure::impossible(format!("window {open} is already open")));
    }

    let intent = Intent::UseBlock {
        position,
        face: Face::Top,
    };
    send_and_confirm(c, intent, "open container", |c| {
        c.inventory().read(|inv| inv.first_opened_window_id().is_some())
    })?;
    c.inventory()
        .read(InventoryTable::first_opened_window_id)
        .ok_or_else(|| TaskFailure::impossible("container closed right after opening"))
}

pub fn close_container(c: &mut BehaviourClient, window: WindowId) -> TaskResult {
    let outcome = try_close_container(c, window);
    Ok(settle(c, "close container", outcome))
}

pub(crate) fn try_close_container(
    c: &mut BehaviourClient,
    window: WindowId,
) -> Result<(), TaskFailure> {
    send_and_confirm(c, Intent::CloseWindow { window }, "close container", move |c| {
        c.inventory().read(|inv| inv.window(window).is_none())
    })?;
    Ok(())
}

/// Exchange two slots of an open window.
pub fn swap_items_in_container(
    c: &mut BehaviourClient,
    window: WindowId,
    source: SlotIndex,
    destination: SlotIndex,
) -> TaskResult {
    let outcome = try_swap_items(c, window, source, destination);
    Ok(settle(c, "swap items in container", outcome))
}

pub(crate) fn try_swap_items(
    c: &mut BehaviourClient,
    window: WindowId,
    source: SlotIndex,
    destination: SlotIndex,
) -> Result<(), TaskFailure> {
    let before = c.inventory().read(|inv| {
        let w = inv.window(window)?;
        Some((w.slot(source)?.clone(), w.slot(destination)?.clone()))
    });
    let (src, dst) = before.ok_or_else(|| {
        TaskFailure::impossible(format!("slots {source}/{destination} not in window {window}"))
    })?;

    let intent = Intent::ClickSwap {
        window,
        source,
        destination,
    };
    send_and_confirm(c, intent, "swap items", move |c| {
        c.inventory().read(|inv| {
            inv.window(window).is_some_and(|w| {
                w.slot(destination) == Some(&src) && w.slot(source) == Some(&dst)
            })
        })
    })?;
    Ok(())
}

struct Transfer {
    sources: Vec<SlotIndex>,
    destinations: Vec<SlotIndex>,
}

fn plan_transfer(
    inv: &InventoryTable,
    window: WindowId,
    filter: &ItemFilter,
    take_from_chest: bool,
    assets: &dyn AssetMetadata,
) -> Option<Transfer> {
    let w = inv.window(window)?;
    let matches = |slot: &Slot| {
        slot.item()
            .and_then(|id| assets.item_name(id))
            .is_some_and(|name| filter.accepts(name))
    };
    let mut sources = Vec::new();
    let mut destinations = Vec::new();
    for (&index, slot) in w.slots() {
        let in_chest = w.is_container_slot(index);
        let from_side = in_chest == take_from_chest;
        if from_side && matches(slot) {
            sources.push(index);
        } else if !from_side && slot.is_empty() {
            destinations.push(index);
        }
    }
    Some(Transfer {
        sources,
        destinations,
    })
}

/// Move matching items between the player and every loaded chest, one
/// confirmed swap at a time, visiting chests in random order.
///
/// Succeeds once no chest has anything left to give (or room left to take),
/// or as soon as the player side is full (or empty). Fails on an unconfirmed
/// swap, and before touching the next chest once shutdown was requested.
pub fn swap_chests_inventory(
    c: &mut BehaviourClient,
    filter: &ItemFilter,
    take_from_chest: bool,
) -> TaskResult {
    get_all_chests_around(c)?;
    let mut chests = keys::WORLD_CHESTS_POS.get(c.blackboard())?.clone();
    let assets = Arc::clone(&c.handles().assets);

    loop {
        if c.should_stop() {
            return Ok(settle(c, "swap chests inventory", Err(TaskFailure::ShuttingDown)));
        }
        if chests.is_empty() {
            tracing::debug!(agent = %c.name(), "every chest visited");
            return Ok(Status::Success);
        }
        let pick = c.rng().next_index(chests.len());
        let chest = chests[pick];

        let window = match try_open_container(c, chest) {
            Ok(window) => window,
            Err(failure) => {
                tracing::debug!(agent = %c.name(), %chest, %failure, "skipping chest");
                chests.remove(pick);
                continue;
            }
        };

        let transfer = c.inventory().read(|inv| {
            plan_transfer(inv, window, filter, take_from_chest, assets.as_ref())
        });
        let Some(Transfer {
            sources,
            destinations,
        }) = transfer
        else {
            chests.remove(pick);
            continue;
        };

        let swapped = if !sources.is_empty() && !destinations.is_empty() {
            let src = sources[c.rng().next_index(sources.len())];
            let dst = destinations[c.rng().next_index(destinations.len())];
            Some(try_swap_items(c, window, src, dst))
        } else {
            None
        };

        if let Err(failure) = try_close_container(c, window) {
            return Ok(settle(c, "swap chests inventory", Err(failure)));
        }

        let (chest_side, player_side) = if take_from_chest {
            (&sources, &destinations)
        } else {
            (&destinations, &sources)
        };
        if chest_side.is_empty() {
            chests.remove(pick);
            continue;
        }
        if player_side.is_empty() {
            tracing::debug!(agent = %c.name(), take_from_chest, "player side exhausted");
            return Ok(Status::Success);
        }
        if let Some(Err(failure)) = swapped {
            return Ok(settle(c, "swap chests inventory", Err(failure)));
        }
    }
}

/// Take one `food_name` from a random chest into the first hotbar slot.
/// Fails when no chest has any.
pub fn get_some_food(c: &mut BehaviourClient, food_name: &str) -> TaskResult {
    let Some(food) = c.assets().item_by_name(food_name) else {
        let failure = TaskFailure::impossible(format!("unknown item {food_name}"));
        return Ok(settle(c, "get some food", Err(failure)));
    };
    get_all_chests_around(c)?;
    let mut chests = keys::WORLD_CHESTS_POS.get(c.blackboard())?.clone();
    c.rng().shuffle(&mut chests);

    for chest in chests {
        if c.should_stop() {
            return Ok(settle(c, "get some food", Err(TaskFailure::ShuttingDown)));
        }
        let Ok(window) = try_open_container(c, chest) else {
            continue;
        };

        let found = c.inventory().read(|inv| {
            let w = inv.window(window)?;
            let sources: Vec<SlotIndex> = w
                .slots()
                .iter()
                .filter(|(i, s)| w.is_container_slot(**i) && s.item() == Some(food))
                .map(|(i, _)| *i)
                .collect();
            // Player slot 36, the first hotbar slot, seen from this window.
            let hand = w.first_player_slot() + (INVENTORY_HOTBAR_START - INVENTORY_STORAGE_START);
            Some((sources, hand))
        });

        let taken = match found {
            Some((sources, hand)) if !sources.is_empty() => {
                let src = sources[c.rng().next_index(sources.len())];
                try_swap_items(c, window, src, hand).is_ok()
            }
            _ => false,
        };

        if let Err(failure) = try_close_container(c, window) {
            return Ok(settle(c, "get some food", Err(failure)));
        }
        if !taken {
            continue;
        }

        let outcome = await_confirmation(c, move |c| {
            c.inventory().read(|inv| {
                inv.player_inventory()
                    .slot(INVENTORY_HOTBAR_START)
                    .and_then(Slot::item)
                    == Some(food)
            })
        });
        if !outcome.is_confirmed() {
            let failure = TaskFailure::Timeout {
                what: "food in hotbar".to_string(),
                elapsed: outcome.elapsed(),
            };
            return Ok(settle(c, "get some food", Err(failure)));
        }
        return Ok(Status::Success);
    }

    let failure = TaskFailure::impossible(format!("no chest holds {food_name}"));
    Ok(settle(c, "get some food", Err(failure)))
}

/// Names of every item in the player's storage and hotbar, stored under
/// `Inventory.block_list`. Fails when there are none.
pub fn get_blocks_available_in_inventory(c: &mut BehaviourClient) -> TaskResult {
    let assets = Arc::clone(&c.handles().assets);
    let names: BTreeSet<String> = c.inventory().read(|inv| {
        inv.player_inventory()
            .slots()
            .range(INVENTORY_STORAGE_START..INVENTORY_OFFHAND_INDEX)
            .filter_map(|(_, slot)| slot.item())
            .filter_map(|id| assets.item_name(id).map(str::to_string))
            .collect()
    });
    let found = !names.is_empty();
    tracing::debug!(agent = %c.name(), count = names.len(), "blocks in inventory");
    keys::INVENTORY_BLOCK_LIST.set(c.blackboard_mut(), names);
    Ok(Status::from(found))
}
