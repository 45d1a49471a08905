#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bot_tasks::{AgentConfig, BehaviourClient, ManualScheduler, SessionHandles};
use bot_world::{
    loopback, AssetMetadata, AssetTable, BlockstateId, Chunk, ContainerStore, Entity, Intent,
    LoopbackSession, NetworkSession, Position, SessionError, SharedEntities, SharedInventory,
    SharedWorld, SimSettings, Slot, Vec3,
};

pub const AIR: BlockstateId = 0;
pub const STONE: BlockstateId = 1;
pub const DIRT: BlockstateId = 2;
pub const CHEST: BlockstateId = 8;
pub const BREAD: i32 = 500;
pub const FLOOR_Y: i32 = 63;
pub const QUANTUM: Duration = Duration::from_millis(10);

/// Forwards to the loopback server and keeps a copy of every intent sent.
pub struct TapSession {
    inner: LoopbackSession,
    sent: Mutex<Vec<Intent>>,
}

impl TapSession {
    pub fn sent(&self) -> Vec<Intent> {
        self.sent.lock().unwrap().clone()
    }
}

impl NetworkSession for TapSession {
    fn send_intent(&self, intent: Intent) -> Result<(), SessionError> {
        self.inner.send_intent(intent.clone())?;
        self.sent.lock().unwrap().push(intent);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

pub struct Harness {
    pub client: BehaviourClient,
    pub tap: Arc<TapSession>,
    pub world: SharedWorld,
    pub entities: SharedEntities,
    pub inventory: SharedInventory,
    pub containers: ContainerStore,
}

/// Nine air chunks around the origin with a stone floor at `FLOOR_Y`.
pub fn flat_world() -> SharedWorld {
    let world = SharedWorld::default();
    world.with_lock(|w| {
        for cx in -1..=1 {
            for cz in -1..=1 {
                let mut chunk = Chunk::filled(AIR);
                for x in 0..16 {
                    for z in 0..16 {
                        chunk.set(x, FLOOR_Y, z, STONE);
                    }
                }
                w.load_chunk((cx, cz), chunk);
            }
        }
    });
    world
}

pub fn assets() -> Arc<dyn AssetMetadata> {
    Arc::new(AssetTable::vanilla())
}

/// A client whose yields pump an in-process server.
pub fn harness(settings: SimSettings) -> Harness {
    harness_with(settings, AgentConfig::default())
}

pub fn harness_with(settings: SimSettings, config: AgentConfig) -> Harness {
    let world = flat_world();
    let entities = SharedEntities::default();
    entities.with_lock(|e| e.set_local_player(Entity::player(1, Vec3::new(0.5, 64.0, 0.5))));
    let inventory = SharedInventory::default();
    let containers = ContainerStore::default();
    let assets = assets();

    let (session, mut server) = loopback(
        "tester",
        world.clone(),
        entities.clone(),
        inventory.clone(),
        containers.clone(),
        Arc::clone(&assets),
        settings,
    );
    let scheduler = ManualScheduler::new(QUANTUM).on_yield(move |_| {
        server.pump();
    });
    let tap = Arc::new(TapSession {
        inner: session,
        sent: Mutex::new(Vec::new()),
    });
    let handles = SessionHandles {
        world: world.clone(),
        entities: entities.clone(),
        inventory: inventory.clone(),
        assets,
        session: Arc::clone(&tap) as Arc<dyn NetworkSession>,
    };
    let client = BehaviourClient::new("tester", 1, handles, Box::new(scheduler), config);
    Harness {
        client,
        tap,
        world,
        entities,
        inventory,
        containers,
    }
}

impl Harness {
    pub fn set_block(&self, pos: Position, id: BlockstateId) {
        assert!(self.world.with_lock(|w| w.set_block(pos, id)));
    }

    pub fn block(&self, pos: Position) -> Option<BlockstateId> {
        self.world.read(|w| w.get_block(pos))
    }

    /// A chest block at `pos` whose first slots hold `contents`.
    pub fn place_chest(&self, pos: Position, contents: Vec<Slot>) {
        self.set_block(pos, CHEST);
        let mut slots = vec![Slot::Empty; 27];
        for (i, slot) in contents.into_iter().enumerate() {
            slots[i] = slot;
        }
        self.containers.with_lock(|store| store.insert(pos, slots));
    }

    pub fn chest_contents(&self, pos: Position) -> Vec<Slot> {
        self.containers
            .read(|store| store.get(&pos).cloned().unwrap_or_default())
    }

    pub fn give(&self, slot: i16, item: i32, count: u8) {
        self.inventory
            .with_lock(|inv| inv.set_slot(bot_world::PLAYER_INVENTORY_ID, slot, Slot::of(item, count)));
    }

    pub fn sent_swaps(&self) -> usize {
        self.tap
            .sent()
            .iter()
            .filter(|i| matches!(i, Intent::ClickSwap { .. }))
            .count()
    }

    pub fn player_slots(&self) -> Vec<Slot> {
        self.inventory
            .read(|inv| inv.player_inventory().slots().values().cloned().collect())
    }
}
