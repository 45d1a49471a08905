//! Per-agent tuning, loaded from YAML.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config from {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Deadline for a single confirmation wait.
    #[serde(default = "default_confirm_timeout_ms")]
    pub confirm_timeout_ms: u64,

    /// Length of one scheduling quantum, i.e. one `yield_now`.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Root seed for every random tie-break the agent makes.
    pub seed: u64,

    /// Idle time between two ticks of the tree.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Stop after this many ticks. `None` runs until shutdown.
    pub max_ticks: Option<u64>,

    /// Item the chest tasks leave alone when restocking building blocks.
    #[serde(default = "default_food_name")]
    pub food_name: String,
}

fn default_confirm_timeout_ms() -> u64 {
    10_000
}

fn default_poll_interval_ms() -> u64 {
    10
}

fn default_tick_interval_ms() -> u64 {
    50
}

fn default_food_name() -> String {
    "minecraft:bread".to_string()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            confirm_timeout_ms: default_confirm_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            seed: 0,
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: None,
            food_name: default_food_name(),
        }
    }
}

impl AgentConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Like [`AgentConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_millis(self.confirm_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "seed: 42\nmax_ticks: 5").unwrap();

        let config = AgentConfig::load(file.path()).unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.max_ticks, Some(5));
        assert_eq!(config.confirm_timeout(), Duration::from_secs(10));
        assert_eq!(config.poll_interval_ms, 10);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AgentConfig::load_or_default(&dir.path().join("agent.yaml")).unwrap();
        assert_eq!(config, AgentConfig::default());
        assert!(matches!(
            AgentConfig::load(&dir.path().join("agent.yaml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
