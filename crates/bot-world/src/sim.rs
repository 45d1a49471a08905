//! In-process authoritative server.
//!
//! [`LoopbackSession`] queues intents on a channel; [`SimServer`] drains it and
//! applies the effects to the shared tables, optionally late or not at all.
//! Tests pump the server by hand, the binary runs it on its own thread.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bot_core::{DeterministicRng, SplitMix64};
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use serde::{Deserialize, Serialize};

use crate::block::{AssetMetadata, BlockstateId};
use crate::inventory::{
    InventoryTable, ItemStack, Slot, SlotIndex, Window, WindowId, INVENTORY_HOTBAR_START,
    INVENTORY_OFFHAND_INDEX, INVENTORY_STORAGE_START, PLAYER_INVENTORY_ID,
};
use crate::position::Position;
use crate::session::{Intent, NetworkSession, SessionError};
use crate::shared::{Shared, SharedEntities, SharedInventory, SharedWorld};

pub const CHEST_ROWS: u8 = 3;
const CHEST_SLOTS: usize = CHEST_ROWS as usize * 9;
const MAX_STACK: u8 = 64;

/// Chest contents keyed by block position. Shared between the servers of
/// every agent that sees the same world.
pub type ContainerStore = Shared<HashMap<Position, Vec<Slot>>>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    /// Pumps between receiving an intent and applying it.
    pub delay_pumps: u32,
    /// Probability in `[0, 1]` that an intent is silently lost.
    pub drop_rate: f64,
    pub seed: u64,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            delay_pumps: 0,
            drop_rate: 0.0,
            seed: 0,
        }
    }
}

/// Outbound side handed to the agent.
#[derive(Debug)]
pub struct LoopbackSession {
    name: String,
    tx: Sender<Intent>,
    connected: AtomicBool,
}

impl NetworkSession for LoopbackSession {
    fn send_intent(&self, intent: Intent) -> Result<(), SessionError> {
        if !self.is_connected() {
            return Err(SessionError::Disconnected);
        }
        let disconnecting = intent == Intent::Disconnect;
        self.tx
            .send(intent)
            .map_err(|_| SessionError::Disconnected)?;
        if disconnecting {
            self.connected.store(false, Ordering::SeqCst);
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

struct Pending {
    due: u64,
    intent: Intent,
}

/// The authoritative side for one connection.
pub struct SimServer {
    name: String,
    rx: Receiver<Intent>,
    world: SharedWorld,
    entities: SharedEntities,
    inventory: SharedInventory,
    containers: ContainerStore,
    assets: Arc<dyn AssetMetadata>,
    settings: SimSettings,
    rng: SplitMix64,
    pending: VecDeque<Pending>,
    pumps: u64,
    open: Option<(WindowId, Position)>,
    next_window_id: WindowId,
    applied: u64,
    dropped: u64,
    session_gone: bool,
}

/// Wire a session to a server over an unbounded channel.
pub fn loopback(
    name: impl Into<String>,
    world: SharedWorld,
    entities: SharedEntities,
    inventory: SharedInventory,
    containers: ContainerStore,
    assets: Arc<dyn AssetMetadata>,
    settings: SimSettings,
) -> (LoopbackSession, SimServer) {
    let name = name.into();
    let (tx, rx) = unbounded();
    let session = LoopbackSession {
        name: name.clone(),
        tx,
        connected: AtomicBool::new(true),
    };
    let server = SimServer {
        name,
        rx,
        world,
        entities,
        inventory,
        containers,
        assets,
        rng: SplitMix64::new(settings.seed),
        settings,
        pending: VecDeque::new(),
        pumps: 0,
        open: None,
        next_window_id: 1,
        applied: 0,
        dropped: 0,
        session_gone: false,
    };
    (session, server)
}

impl SimServer {
    /// Receive everything queued, then apply what is due. Returns the number
    /// of intents applied.
    pub fn pump(&mut self) -> usize {
        loop {
            match self.rx.try_recv() {
                Ok(intent) => self.receive(intent),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.session_gone = true;
                    break;
                }
            }
        }
        self.pumps += 1;

        let mut applied = 0;
        while self.pending.front().is_some_and(|p| p.due < self.pumps) {
            if let Some(p) = self.pending.pop_front() {
                self.apply(p.intent);
                applied += 1;
            }
        }
        applied
    }

    fn receive(&mut self, intent: Intent) {
        if self.settings.drop_rate > 0.0 && self.rng.next_f64() < self.settings.drop_rate {
            self.dropped += 1;
            tracing::debug!(server = %self.name, ?intent, "intent dropped");
            return;
        }
        self.pending.push_back(Pending {
            due: self.pumps + u64::from(self.settings.delay_pumps),
            intent,
        });
    }

    /// Pump every `period` until `shutdown` is raised or the session is gone.
    pub fn run(mut self, shutdown: Arc<AtomicBool>, period: Duration) -> SimStats {
        tracing::info!(server = %self.name, "loopback server started");
        while !shutdown.load(Ordering::SeqCst) {
            self.pump();
            if self.session_gone && self.pending.is_empty() {
                break;
            }
            std::thread::sleep(period);
        }
        let stats = self.stats();
        tracing::info!(server = %self.name, applied = stats.applied, dropped = stats.dropped, "loopback server stopped");
        stats
    }

    pub fn stats(&self) -> SimStats {
        SimStats {
            applied: self.applied,
            dropped: self.dropped,
        }
    }

    pub fn containers(&self) -> &ContainerStore {
        &self.containers
    }

    fn apply(&mut self, intent: Intent) {
        self.applied += 1;
        tracing::trace!(server = %self.name, ?intent, "applying intent");
        match intent {
            Intent::Dig { position, .. } => self.dig(position),
            Intent::PlaceBlock { position, .. } => self.place(position),
            Intent::UseBlock { position, .. } => self.use_block(position),
            Intent::ClickSwap {
                window,
                source,
                destination,
            } => self.click_swap(window, source, destination),
            Intent::CloseWindow { window } => self.close_window(window),
            Intent::SelectHotbar { index } => self
                .inventory
                .with_lock(|inv| inv.set_selected_hotbar(index)),
            Intent::Chat { message } => {
                tracing::info!(player = %self.name, %message, "chat");
            }
            Intent::Disconnect => {
                let id = self.entities.read(|e| e.local_player().map(|p| p.id));
                if let Some(id) = id {
                    self.entities.with_lock(|e| e.remove(id));
                }
            }
        }
    }

    fn dig(&mut self, position: Position) {
        let Some(air) = self.air_id() else { return };
        let removed = self.world.with_lock(|w| match w.get_block(position) {
            Some(id) if id != air => {
                w.set_block(position, air);
                Some(id)
            }
            _ => None,
        });
        let Some(removed) = removed else { return };
        let item = self
            .assets
            .blockstate(removed)
            .and_then(|b| self.assets.item_by_name(b.name()));
        if let Some(item) = item {
            self.inventory.with_lock(|inv| {
                let slots = inv.player_inventory().slots();
                let target = slots
                    .range(INVENTORY_STORAGE_START..INVENTORY_OFFHAND_INDEX)
                    .find(|(_, s)| matches!(s, Slot::Filled(st) if st.item == item && st.count < MAX_STACK))
                    .or_else(|| {
                        slots
                            .range(INVENTORY_STORAGE_START..INVENTORY_OFFHAND_INDEX)
                            .find(|(_, s)| s.is_empty())
                    })
                    .map(|(i, s)| (*i, s.clone()));
                if let Some((index, slot)) = target {
                    let next = match slot {
                        Slot::Filled(mut st) => {
                            st.count += 1;
                            Slot::Filled(st)
                        }
                        Slot::Empty => Slot::Filled(ItemStack::new(item, 1)),
                    };
                    inv.set_slot(PLAYER_INVENTORY_ID, index, next);
                }
            });
        }
    }

    fn place(&mut self, position: Position) {
        let held = self.inventory.read(|inv| {
            let index = INVENTORY_HOTBAR_START + inv.selected_hotbar() as SlotIndex;
            inv.item_in_hand().map(|item| (index, item))
        });
        let Some((hand_slot, item)) = held else { return };
        let Some(block) = self
            .assets
            .item_name(item)
            .and_then(|name| self.assets.blockstate_by_name(name))
            .map(|b| b.id)
        else {
            return;
        };
        let assets = &self.assets;
        let placed = self.world.with_lock(|w| match w.get_block(position) {
            Some(id) if assets.is_air(id) == Some(true) => w.set_block(position, block),
            _ => false,
        });
        if placed {
            self.inventory.with_lock(|inv| {
                let mut slot = inv
                    .player_inventory()
                    .slot(hand_slot)
                    .cloned()
                    .unwrap_or_default();
                slot.take_one();
                inv.set_slot(PLAYER_INVENTORY_ID, hand_slot, slot);
            });
        }
    }

    fn use_block(&mut self, position: Position) {
        if self.open.is_some() {
            return;
        }
        let is_chest = self
            .world
            .read(|w| w.get_block(position))
            .and_then(|id| self.assets.blockstate(id))
            .is_some_and(|b| b.name() == "minecraft:chest");
        if !is_chest {
            return;
        }
        let contents = self.containers.with_lock(|store| {
            store
                .entry(position)
                .or_insert_with(|| vec![Slot::Empty; CHEST_SLOTS])
                .clone()
        });
        let id = self.next_window_id;
        self.next_window_id = if id >= 100 { 1 } else { id + 1 };
        let mut window = Window::container(id, CHEST_ROWS);
        for (i, slot) in contents.into_iter().enumerate() {
            window.set_slot(i as SlotIndex, slot);
        }
        self.inventory.with_lock(|inv| inv.open_window(window));
        self.open = Some((id, position));
    }

    /// Container-side slots are read from and written back to the shared
    /// store while its lock is held. Lock order: containers, then inventory.
    fn click_swap(&mut self, window: WindowId, source: SlotIndex, destination: SlotIndex) {
        let chest = self
            .open
            .and_then(|(id, position)| (id == window).then_some(position));
        let Some(position) = chest else {
            self.inventory
                .with_lock(|inv| swap_window_slots(inv, window, source, destination));
            return;
        };
        let inventory = &self.inventory;
        self.containers.with_lock(|store| {
            let contents = store
                .entry(position)
                .or_insert_with(|| vec![Slot::Empty; CHEST_SLOTS]);
            inventory.with_lock(|inv| {
                for (i, slot) in contents.iter().enumerate() {
                    inv.set_slot(window, i as SlotIndex, slot.clone());
                }
                swap_window_slots(inv, window, source, destination);
                for (i, slot) in contents.iter_mut().enumerate() {
                    let current = inv.window(window).and_then(|w| w.slot(i as SlotIndex));
                    if let Some(current) = current {
                        *slot = current.clone();
                    }
                }
            });
        });
    }

    fn close_window(&mut self, window: WindowId) {
        self.inventory.with_lock(|inv| inv.close_window(window));
        if self.open.is_some_and(|(id, _)| id == window) {
            self.open = None;
        }
    }

    fn air_id(&self) -> Option<BlockstateId> {
        self.assets.blockstate_by_name("minecraft:air").map(|b| b.id)
    }
}

fn swap_window_slots(
    inv: &mut InventoryTable,
    window: WindowId,
    source: SlotIndex,
    destination: SlotIndex,
) {
    let Some(w) = inv.window(window) else { return };
    let (Some(a), Some(b)) = (w.slot(source).cloned(), w.slot(destination).cloned()) else {
        return;
    };
    inv.set_slot(window, source, b);
    inv.set_slot(window, destination, a);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimStats {
    pub applied: u64,
    pub dropped: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::AssetTable;
    use crate::chunk::Chunk;

    fn setup(settings: SimSettings) -> (LoopbackSession, SimServer, SharedWorld, SharedInventory) {
        let world = SharedWorld::default();
        world.with_lock(|w| w.load_chunk((0, 0), Chunk::filled(0)));
        let inventory = SharedInventory::default();
        let (session, server) = loopback(
            "tester",
            world.clone(),
            SharedEntities::default(),
            inventory.clone(),
            ContainerStore::default(),
            Arc::new(AssetTable::vanilla()),
            settings,
        );
        (session, server, world, inventory)
    }

    #[test]
    fn delayed_intents_apply_after_the_configured_pumps() {
        let (session, mut server, world, _) = setup(SimSettings {
            delay_pumps: 2,
            ..SimSettings::default()
        });
        let pos = Position::new(1, 1, 1);
        world.with_lock(|w| w.set_block(pos, 1));
        session
            .send_intent(Intent::Dig {
                position: pos,
                face: crate::position::Face::Top,
            })
            .unwrap();

        assert_eq!(server.pump(), 0);
        assert_eq!(server.pump(), 0);
        assert_eq!(server.pump(), 1);
        assert_eq!(world.read(|w| w.get_block(pos)), Some(0));
    }

    #[test]
    fn full_drop_rate_loses_everything() {
        let (session, mut server, _, inventory) = setup(SimSettings {
            drop_rate: 1.0,
            ..SimSettings::default()
        });
        session.send_intent(Intent::SelectHotbar { index: 4 }).unwrap();
        server.pump();
        assert_eq!(inventory.read(|i| i.selected_hotbar()), 0);
        assert_eq!(server.stats().dropped, 1);
    }

    #[test]
    fn digging_collects_the_block_item() {
        let (session, mut server, world, inventory) = setup(SimSettings::default());
        let pos = Position::new(2, 5, 2);
        world.with_lock(|w| w.set_block(pos, 3));
        session
            .send_intent(Intent::Dig {
                position: pos,
                face: crate::position::Face::Top,
            })
            .unwrap();
        server.pump();
        let slot = inventory.read(|i| i.player_inventory().slot(INVENTORY_STORAGE_START).cloned());
        assert_eq!(slot, Some(Slot::of(3, 1)));
    }

    #[test]
    fn two_agents_cannot_take_the_same_chest_stack() {
        let world = SharedWorld::default();
        world.with_lock(|w| w.load_chunk((0, 0), Chunk::filled(0)));
        let chest = Position::new(3, 4, 3);
        world.with_lock(|w| w.set_block(chest, 8));
        let containers = ContainerStore::default();
        let mut stocked = vec![Slot::Empty; CHEST_SLOTS];
        stocked[0] = Slot::of(1, 64);
        containers.with_lock(|store| store.insert(chest, stocked));
        let assets: Arc<dyn AssetMetadata> = Arc::new(AssetTable::vanilla());

        let mut agents: Vec<_> = ["a", "b"]
            .into_iter()
            .map(|name| {
                let inventory = SharedInventory::default();
                let (session, server) = loopback(
                    name,
                    world.clone(),
                    SharedEntities::default(),
                    inventory.clone(),
                    containers.clone(),
                    Arc::clone(&assets),
                    SimSettings::default(),
                );
                (session, server, inventory)
            })
            .collect();

        for (session, server, _) in &mut agents {
            session
                .send_intent(Intent::UseBlock {
                    position: chest,
                    face: crate::position::Face::Top,
                })
                .unwrap();
            server.pump();
        }
        for (session, server, inventory) in &mut agents {
            let window = inventory.read(|i| i.first_opened_window_id()).unwrap();
            session
                .send_intent(Intent::ClickSwap {
                    window,
                    source: 0,
                    destination: 27,
                })
                .unwrap();
            server.pump();
            session.send_intent(Intent::CloseWindow { window }).unwrap();
            server.pump();
        }

        let held: Vec<_> = agents
            .iter()
            .map(|(_, _, inventory)| {
                inventory.read(|i| i.player_inventory().slot(INVENTORY_STORAGE_START).cloned())
            })
            .collect();
        assert_eq!(held, vec![Some(Slot::of(1, 64)), Some(Slot::Empty)]);
        let left = containers.read(|store| store.get(&chest).map(|c| c[0].clone()));
        assert_eq!(left, Some(Slot::Empty));
    }
}
