use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type BlockstateId = u32;
pub type ItemId = i32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blockstate {
    pub id: BlockstateId,
    pub name: String,
    #[serde(default)]
    pub air: bool,
}

impl Blockstate {
    pub fn is_air(&self) -> bool {
        self.air
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Read-only block and item metadata.
///
/// Passed explicitly to whoever needs names; there is no process-wide table.
pub trait AssetMetadata: Send + Sync {
    fn blockstate(&self, id: BlockstateId) -> Option<&Blockstate>;

    fn blockstate_by_name(&self, name: &str) -> Option<&Blockstate>;

    fn item_name(&self, id: ItemId) -> Option<&str>;

    fn item_by_name(&self, name: &str) -> Option<ItemId>;

    fn is_air(&self, id: BlockstateId) -> Option<bool> {
        self.blockstate(id).map(Blockstate::is_air)
    }
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read asset table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse asset table: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("asset table has no air blockstate")]
    NoAir,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AssetFile {
    blockstates: Vec<Blockstate>,
    #[serde(default)]
    items: BTreeMap<ItemId, String>,
}

/// In-memory [`AssetMetadata`] loaded from YAML or built in code.
#[derive(Debug, Clone)]
pub struct AssetTable {
    blockstates: HashMap<BlockstateId, Blockstate>,
    blocks_by_name: HashMap<String, BlockstateId>,
    items: BTreeMap<ItemId, String>,
    items_by_name: HashMap<String, ItemId>,
    air: BlockstateId,
}

impl AssetTable {
    pub fn new(
        blockstates: impl IntoIterator<Item = Blockstate>,
        items: impl IntoIterator<Item = (ItemId, String)>,
    ) -> Result<Self, AssetError> {
        let blockstates: HashMap<_, _> = blockstates.into_iter().map(|b| (b.id, b)).collect();
        let air = blockstates
            .values()
            .filter(|b| b.air)
            .map(|b| b.id)
            .min()
            .ok_or(AssetError::NoAir)?;
        let blocks_by_name = blockstates
            .values()
            .map(|b| (b.name.clone(), b.id))
            .collect();
        let items: BTreeMap<_, _> = items.into_iter().collect();
        let items_by_name = items.iter().map(|(id, n)| (n.clone(), *id)).collect();
        Ok(Self {
            blockstates,
            blocks_by_name,
            items,
            items_by_name,
            air,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, AssetError> {
        let file: AssetFile = serde_yaml::from_str(content)?;
        Self::new(file.blockstates, file.items)
    }

    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let content = std::fs::read_to_string(path).map_err(|source| AssetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// A small vanilla-like palette: every solid block also exists as an item
    /// with the same name, plus a few non-block items.
    pub fn vanilla() -> Self {
        const BLOCKS: [&str; 9] = [
            "minecraft:stone",
            "minecraft:dirt",
            "minecraft:cobblestone",
            "minecraft:oak_planks",
            "minecraft:glass",
            "minecraft:sand",
            "minecraft:white_wool",
            "minecraft:chest",
            "minecraft:scaffolding",
        ];
        let mut blockstates = vec![Blockstate {
            id: 0,
            name: "minecraft:air".to_string(),
            air: true,
        }];
        let mut items = Vec::new();
        for (i, name) in BLOCKS.iter().enumerate() {
            let id = i as u32 + 1;
            blockstates.push(Blockstate {
                id,
                name: name.to_string(),
                air: false,
            });
            items.push((id as ItemId, name.to_string()));
        }
        items.push((500, "minecraft:bread".to_string()));
        items.push((501, "minecraft:cooked_beef".to_string()));
        match Self::new(blockstates, items) {
            Ok(table) => table,
            Err(_) => unreachable!("vanilla table contains air"),
        }
    }

    pub fn air_id(&self) -> BlockstateId {
        self.air
    }

    pub fn len(&self) -> usize {
        self.blockstates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blockstates.is_empty()
    }
}

impl AssetMetadata for AssetTable {
    fn blockstate(&self, id: BlockstateId) -> Option<&Blockstate> {
        self.blockstates.get(&id)
    }

    fn blockstate_by_name(&self, name: &str) -> Option<&Blockstate> {
        self.blocks_by_name
            .get(name)
            .and_then(|id| self.blockstates.get(id))
    }

    fn item_name(&self, id: ItemId) -> Option<&str> {
        self.items.get(&id).map(String::as_str)
    }

    fn item_by_name(&self, name: &str) -> Option<ItemId> {
        self.items_by_name.get(name).copied()
    }
}
