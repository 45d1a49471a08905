//! Run configuration, loaded from .blockbot/config.yaml

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bot_tasks::AgentConfig;
use bot_world::{Position, SimSettings, Vec3};
use serde::{Deserialize, Serialize};

pub const CONFIG_PATH: &str = ".blockbot/config.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Structure file (relative to project root)
    #[serde(default = "default_structure")]
    pub structure: PathBuf,

    /// World position of the structure's minimum corner
    #[serde(default = "default_offset")]
    pub offset: Position,

    /// Scaffolding block whose bottom layers are not part of the build
    pub temp_block: Option<String>,

    /// Asset table; the built-in vanilla subset when unset
    pub assets: Option<PathBuf>,

    /// Tree description; the stock map-creation tree when unset
    pub tree: Option<PathBuf>,

    #[serde(default = "default_agents")]
    pub agents: Vec<AgentSpec>,

    /// Settings shared by every agent
    pub agent: AgentConfig,

    pub server: ServerConfig,

    pub world: WorldConfig,

    pub chests: Vec<ChestConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub name: String,
    pub spawn: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// How often each loopback server applies queued intents
    #[serde(default = "default_pump_interval_ms")]
    pub pump_interval_ms: u64,

    /// Latency and loss applied to every connection
    pub link: SimSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Chunks loaded around the origin, in each direction
    #[serde(default = "default_chunk_radius")]
    pub chunk_radius: i32,

    #[serde(default = "default_floor_y")]
    pub floor_y: i32,

    #[serde(default = "default_floor_block")]
    pub floor_block: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChestConfig {
    pub position: Position,
    #[serde(default)]
    pub items: Vec<ItemConfig>,
}

/// One chest slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemConfig {
    pub name: String,
    #[serde(default = "default_count")]
    pub count: u8,
}

fn default_structure() -> PathBuf {
    PathBuf::from("structure.yaml")
}

fn default_offset() -> Position {
    Position::new(0, 64, 0)
}

fn default_agents() -> Vec<AgentSpec> {
    vec![AgentSpec {
        name: "builder".to_string(),
        spawn: Vec3::new(0.5, 64.0, 0.5),
    }]
}

fn default_pump_interval_ms() -> u64 {
    5
}

fn default_chunk_radius() -> i32 {
    2
}

fn default_floor_y() -> i32 {
    63
}

fn default_floor_block() -> String {
    "minecraft:stone".to_string()
}

fn default_count() -> u8 {
    64
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            structure: default_structure(),
            offset: default_offset(),
            temp_block: None,
            assets: None,
            tree: None,
            agents: default_agents(),
            agent: AgentConfig::default(),
            server: ServerConfig::default(),
            world: WorldConfig::default(),
            chests: Vec::new(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            pump_interval_ms: default_pump_interval_ms(),
            link: SimSettings::default(),
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_radius: default_chunk_radius(),
            floor_y: default_floor_y(),
            floor_block: default_floor_block(),
        }
    }
}

impl RunConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        Ok(config)
    }

    /// Load from project root (looks for .blockbot/config.yaml)
    pub fn load_from_project(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(CONFIG_PATH);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve paths relative to project root
    pub fn resolve_paths(&mut self, project_root: &Path) {
        self.structure = project_root.join(&self.structure);
        self.assets = self.assets.as_ref().map(|p| project_root.join(p));
        self.tree = self.tree.as_ref().map(|p| project_root.join(p));
    }

    pub fn pump_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.server.pump_interval_ms)
    }
}
