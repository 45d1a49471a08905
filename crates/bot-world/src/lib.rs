//! Server-authoritative game state as seen by the agents.
//!
//! The network-receiving thread is the only writer of real game data. Agents
//! read through [`Shared::with_lock`] and copy out what they need; nothing in
//! this crate hands out a guard that could outlive the closure.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod block;
pub mod chunk;
pub mod entity;
pub mod inventory;
pub mod position;
pub mod region;
pub mod session;
pub mod shared;
pub mod sim;
pub mod world;

pub use block::{AssetError, AssetMetadata, AssetTable, Blockstate, BlockstateId, ItemId};
pub use chunk::{Chunk, ChunkCoord, CHUNK_HEIGHT, CHUNK_WIDTH};
pub use entity::{Entity, EntityId, EntityKind, EntityTable};
pub use inventory::{
    InventoryTable, ItemStack, Slot, SlotIndex, Window, WindowId, WindowKind,
    INVENTORY_HOTBAR_START, INVENTORY_OFFHAND_INDEX, INVENTORY_STORAGE_START,
    PLAYER_INVENTORY_ID,
};
pub use position::{Face, Position, Vec3, NEIGHBOURS};
pub use region::RegionSnapshot;
pub use session::{Intent, NetworkSession, RecordingSession, SessionError};
pub use shared::{Shared, SharedEntities, SharedInventory, SharedWorld};
pub use sim::{loopback, ContainerStore, LoopbackSession, SimServer, SimSettings, SimStats};
pub use world::World;
