use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::block::ItemId;

pub type WindowId = i16;
pub type SlotIndex = i16;

pub const PLAYER_INVENTORY_ID: WindowId = 0;
pub const INVENTORY_STORAGE_START: SlotIndex = 9;
pub const INVENTORY_HOTBAR_START: SlotIndex = 36;
pub const INVENTORY_OFFHAND_INDEX: SlotIndex = 45;

/// Player-owned slots shown at the bottom of any container window (storage + hotbar).
const PLAYER_SLOTS_IN_CONTAINER: SlotIndex = INVENTORY_OFFHAND_INDEX - INVENTORY_STORAGE_START;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: ItemId,
    pub count: u8,
    #[serde(default)]
    pub metadata: Option<String>,
}

impl ItemStack {
    pub fn new(item: ItemId, count: u8) -> Self {
        Self {
            item,
            count,
            metadata: None,
        }
    }
}

/// One inventory cell. An empty slot is still present in its window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    #[default]
    Empty,
    Filled(ItemStack),
}

impl Slot {
    pub fn of(item: ItemId, count: u8) -> Self {
        Slot::Filled(ItemStack::new(item, count))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    pub fn item(&self) -> Option<ItemId> {
        match self {
            Slot::Empty => None,
            Slot::Filled(stack) => Some(stack.item),
        }
    }

    /// Remove one item, emptying the slot on the last one.
    pub fn take_one(&mut self) -> Option<ItemId> {
        let Slot::Filled(stack) = self else {
            return None;
        };
        let item = stack.item;
        if stack.count <= 1 {
            *self = Slot::Empty;
        } else {
            stack.count -= 1;
        }
        Some(item)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    PlayerInventory,
    Container { rows: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    id: WindowId,
    kind: WindowKind,
    slots: BTreeMap<SlotIndex, Slot>,
    first_player_slot: SlotIndex,
}

impl Window {
    /// Crafting, armor, storage, hotbar and offhand slots, all empty.
    pub fn player_inventory() -> Self {
        Self {
            id: PLAYER_INVENTORY_ID,
            kind: WindowKind::PlayerInventory,
            slots: (0..=INVENTORY_OFFHAND_INDEX).map(|i| (i, Slot::Empty)).collect(),
            first_player_slot: INVENTORY_STORAGE_START,
        }
    }

    /// `rows * 9` container slots followed by the 36 player slots.
    pub fn container(id: WindowId, rows: u8) -> Self {
        let first_player_slot = rows as SlotIndex * 9;
        Self {
            id,
            kind: WindowKind::Container { rows },
            slots: (0..first_player_slot + PLAYER_SLOTS_IN_CONTAINER)
                .map(|i| (i, Slot::Empty))
                .collect(),
            first_player_slot,
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn kind(&self) -> WindowKind {
        self.kind
    }

    pub fn first_player_slot(&self) -> SlotIndex {
        self.first_player_slot
    }

    pub fn slots(&self) -> &BTreeMap<SlotIndex, Slot> {
        &self.slots
    }

    pub fn slot(&self, index: SlotIndex) -> Option<&Slot> {
        self.slots.get(&index)
    }

    pub fn slot_mut(&mut self, index: SlotIndex) -> Option<&mut Slot> {
        self.slots.get_mut(&index)
    }

    pub fn set_slot(&mut self, index: SlotIndex, slot: Slot) -> bool {
        match self.slots.get_mut(&index) {
            Some(s) => {
                *s = slot;
                true
            }
            None => false,
        }
    }

    /// Container-side slot indices, i.e. everything before the player section.
    pub fn is_container_slot(&self, index: SlotIndex) -> bool {
        index >= 0 && index < self.first_player_slot
    }

    /// Player inventory index mirrored by a player-section slot of this window.
    pub fn to_player_slot(&self, index: SlotIndex) -> Option<SlotIndex> {
        match self.kind {
            WindowKind::PlayerInventory => Some(index),
            WindowKind::Container { .. } if index >= self.first_player_slot => {
                Some(index - self.first_player_slot + INVENTORY_STORAGE_START)
            }
            WindowKind::Container { .. } => None,
        }
    }
}

/// The always-present player inventory plus any open container windows.
#[derive(Debug, Clone)]
pub struct InventoryTable {
    player: Window,
    windows: BTreeMap<WindowId, Window>,
    selected_hotbar: u8,
}

impl Default for InventoryTable {
    fn default() -> Self {
        Self {
            player: Window::player_inventory(),
            windows: BTreeMap::new(),
            selected_hotbar: 0,
        }
    }
}

impl InventoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn player_inventory(&self) -> &Window {
        &self.player
    }

    pub fn player_inventory_mut(&mut self) -> &mut Window {
        &mut self.player
    }

    pub fn window(&self, id: WindowId) -> Option<&Window> {
        if id == PLAYER_INVENTORY_ID {
            Some(&self.player)
        } else {
            self.windows.get(&id)
        }
    }

    /// Lowest id among open non-player windows.
    pub fn first_opened_window_id(&self) -> Option<WindowId> {
        self.windows.keys().next().copied()
    }

    /// Opens `window` with its player section copied from the player inventory.
    pub fn open_window(&mut self, mut window: Window) {
        let first = window.first_player_slot();
        for i in 0..PLAYER_SLOTS_IN_CONTAINER {
            let mirrored = self
                .player
                .slot(INVENTORY_STORAGE_START + i)
                .cloned()
                .unwrap_or_default();
            window.set_slot(first + i, mirrored);
        }
        self.windows.insert(window.id(), window);
    }

    pub fn close_window(&mut self, id: WindowId) -> Option<Window> {
        self.windows.remove(&id)
    }

    /// Set a slot in any window. Player-section slots of a container are
    /// mirrored into the player inventory, as the server does.
    pub fn set_slot(&mut self, window: WindowId, index: SlotIndex, slot: Slot) -> bool {
        if window == PLAYER_INVENTORY_ID {
            let ok = self.player.set_slot(index, slot.clone());
            if ok {
                self.mirror_into_containers(index, &slot);
            }
            return ok;
        }
        let Some(w) = self.windows.get_mut(&window) else {
            return false;
        };
        if !w.set_slot(index, slot.clone()) {
            return false;
        }
        if let Some(player_index) = w.to_player_slot(index) {
            self.player.set_slot(player_index, slot);
        }
        true
    }

    fn mirror_into_containers(&mut self, player_index: SlotIndex, slot: &Slot) {
        if !(INVENTORY_STORAGE_START..INVENTORY_OFFHAND_INDEX).contains(&player_index) {
            return;
        }
        for w in self.windows.values_mut() {
            let index = player_index - INVENTORY_STORAGE_START + w.first_player_slot();
            w.set_slot(index, slot.clone());
        }
    }

    pub fn selected_hotbar(&self) -> u8 {
        self.selected_hotbar
    }

    pub fn set_selected_hotbar(&mut self, index: u8) {
        self.selected_hotbar = index.min(8);
    }

    pub fn item_in_hand(&self) -> Option<ItemId> {
        self.player
            .slot(INVENTORY_HOTBAR_START + self.selected_hotbar as SlotIndex)
            .and_then(Slot::item)
    }
}
