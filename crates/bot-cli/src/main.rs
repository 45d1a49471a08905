//! blockbot - building agents against an in-process world.
//!
//! Single binary that provides:
//! - `blockbot run` - build the configured structure
//! - `blockbot inspect` - block counts and warnings for a structure file
//! - `blockbot tree` - print or validate a tree description
//! - `blockbot init` - write a starter project

mod config;
mod setup;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bot_tasks::{map_creation_spec, task_registry, StructureTarget};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{RunConfig, CONFIG_PATH};

#[derive(Parser)]
#[command(name = "blockbot")]
#[command(about = "Behaviour-tree building agents", version)]
struct Cli {
    /// Project root directory
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    /// Config file (defaults to .blockbot/config.yaml under the project)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the configured structure
    Run {
        /// Stop every agent after this many ticks
        #[arg(long)]
        max_ticks: Option<u64>,

        /// Override the agents' seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show what a structure needs
    Inspect {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the tree description, or check a file against the leaf registry
    Tree {
        file: Option<PathBuf>,
    },

    /// Initialize a new project
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    if cli.log_json {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).with_target(false).init();
    }

    let project_root = match cli.project {
        Some(root) => root,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match cli.command {
        Commands::Run { max_ticks, seed } => {
            let mut config = load_config(&project_root, cli.config.as_deref())?;
            if max_ticks.is_some() {
                config.agent.max_ticks = max_ticks;
            }
            if let Some(seed) = seed {
                config.agent.seed = seed;
            }
            run(&config)
        }
        Commands::Inspect { json } => {
            let config = load_config(&project_root, cli.config.as_deref())?;
            inspect(&config, json)
        }
        Commands::Tree { file } => tree(file.as_deref()),
        Commands::Init => init_project(&project_root),
    }
}

fn load_config(project_root: &Path, explicit: Option<&Path>) -> Result<RunConfig> {
    let mut config = match explicit {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::load_from_project(project_root)?,
    };
    config.resolve_paths(project_root);
    Ok(config)
}

fn run(config: &RunConfig) -> Result<()> {
    let report = setup::run(config)?;

    println!("Run finished");
    println!("============");
    for agent in &report.agents {
        match &agent.outcome {
            Ok(summary) => println!(
                "  {}: {} ticks, stopped by {:?}, last status {:?} ({} intents applied, {} dropped)",
                agent.name,
                summary.ticks,
                summary.reason,
                summary.last_status,
                agent.server.applied,
                agent.server.dropped,
            ),
            Err(violation) => println!("  {}: aborted: {violation}", agent.name),
        }
    }
    println!();
    let c = report.completion;
    if c.is_complete() {
        println!("Structure complete");
    } else {
        println!(
            "Structure incomplete: {} missing, {} wrong, {} additional",
            c.missing, c.wrong, c.additional
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct StructureSummary {
    start: [i32; 3],
    end: [i32; 3],
    size: [i32; 3],
    blocks: std::collections::BTreeMap<String, usize>,
    floating: Vec<([i32; 3], String)>,
}

impl StructureSummary {
    fn of(target: &StructureTarget) -> Self {
        let xyz = |p: bot_world::Position| [p.x, p.y, p.z];
        Self {
            start: xyz(target.start()),
            end: xyz(target.end()),
            size: xyz(target.size()),
            blocks: target.block_counts(),
            floating: target
                .floating_blocks()
                .into_iter()
                .map(|(p, name)| (xyz(p), name))
                .collect(),
        }
    }
}

fn inspect(config: &RunConfig, json: bool) -> Result<()> {
    let target = setup::load_structure(config)?;
    let summary = StructureSummary::of(&target);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Structure {}", config.structure.display());
    println!("  start: {}", target.start());
    println!("  end:   {}", target.end());
    println!("  size:  {}", target.size());
    println!();
    println!("Blocks needed:");
    for (name, count) in &summary.blocks {
        println!("  {count:>6}  {name}");
    }
    if !summary.floating.is_empty() {
        println!();
        println!("Blocks with nothing to be placed against: {}", summary.floating.len());
        for ([x, y, z], name) in summary.floating.iter().take(10) {
            println!("  {x} {y} {z}  {name}");
        }
        if summary.floating.len() > 10 {
            println!("  ... and {} more", summary.floating.len() - 10);
        }
    }
    Ok(())
}

fn tree(file: Option<&Path>) -> Result<()> {
    let Some(path) = file else {
        print!("{}", serde_yaml::to_string(&map_creation_spec())?);
        return Ok(());
    };

    let tree = setup::load_tree(Some(path))?;
    println!("{}: ok (root `{}`)", path.display(), tree.root_label());
    println!();
    println!("Available leaves:");
    let registry = task_registry();
    for name in registry.names() {
        println!("  {name}");
    }
    Ok(())
}

const STARTER_CONFIG: &str = r#"# blockbot run configuration

structure: structure.yaml
offset: { x: 0, y: 64, z: 0 }
temp_block: "minecraft:scaffolding"

agents:
  - { name: builder, spawn: { x: 0.5, y: 64.0, z: 0.5 } }

agent:
  seed: 1
  confirm_timeout_ms: 10000
  poll_interval_ms: 10
  tick_interval_ms: 50

server:
  pump_interval_ms: 5
  link: { delay_pumps: 2, drop_rate: 0.0 }

chests:
  - position: { x: -3, y: 64, z: -3 }
    items:
      - { name: "minecraft:stone" }
      - { name: "minecraft:oak_planks" }
      - { name: "minecraft:bread", count: 8 }
"#;

const STARTER_STRUCTURE: &str = r#"# Three-block wall on a scaffolding layer
palette: ["minecraft:scaffolding", "minecraft:stone", "minecraft:oak_planks"]
blocks:
  - { pos: [0, 0, 0], state: 0 }
  - { pos: [1, 0, 0], state: 0 }
  - { pos: [2, 0, 0], state: 0 }
  - { pos: [0, 1, 0], state: 1 }
  - { pos: [1, 1, 0], state: 2 }
  - { pos: [2, 1, 0], state: 1 }
"#;

fn init_project(project_root: &Path) -> Result<()> {
    let config_path = project_root.join(CONFIG_PATH);
    if let Some(dir) = config_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    if !config_path.exists() {
        std::fs::write(&config_path, STARTER_CONFIG)?;
    }

    let structure_path = project_root.join("structure.yaml");
    if !structure_path.exists() {
        std::fs::write(&structure_path, STARTER_STRUCTURE)?;
    }

    println!("Initialized blockbot project at {}", project_root.display());
    println!();
    println!("Created:");
    println!("  {CONFIG_PATH} - run configuration");
    println!("  structure.yaml - target structure");
    println!();
    println!("Next steps:");
    println!("  1. blockbot inspect");
    println!("  2. blockbot run");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starter_files_parse() {
        let config: RunConfig = serde_yaml::from_str(STARTER_CONFIG).unwrap();
        assert_eq!(config.chests[0].items.len(), 3);
        assert_eq!(config.server.link.delay_pumps, 2);

        let file = bot_tasks::StructureFile::from_yaml(STARTER_STRUCTURE).unwrap();
        let mut target =
            StructureTarget::from_file(&file, bot_world::Position::new(0, 64, 0)).unwrap();
        assert_eq!(target.trim_temp_layers("minecraft:scaffolding"), 1);
        assert_eq!(target.block_counts().values().sum::<usize>(), 3);
        assert!(target.floating_blocks().is_empty());
    }

    #[test]
    fn init_then_load() {
        let dir = tempfile::tempdir().unwrap();
        init_project(dir.path()).unwrap();
        let config = load_config(dir.path(), None).unwrap();
        assert_eq!(config.structure, dir.path().join("structure.yaml"));
        let target = setup::load_structure(&config).unwrap();
        assert_eq!(target.size(), bot_world::Position::new(3, 1, 1));
    }

    #[test]
    fn stock_tree_round_trips_through_yaml() {
        let yaml = serde_yaml::to_string(&map_creation_spec()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map_creation.yaml");
        std::fs::write(&path, yaml).unwrap();
        assert!(setup::load_tree(Some(&path)).is_ok());
    }

    #[test]
    fn demo_project_loads() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/two_builders");
        let config = load_config(&root, Some(&root.join("config.yaml"))).unwrap();
        assert_eq!(config.agents.len(), 2);

        let target = setup::load_structure(&config).unwrap();
        assert_eq!(target.size(), bot_world::Position::new(3, 2, 3));
        assert!(target.floating_blocks().is_empty());
        assert!(setup::load_tree(config.tree.as_deref()).is_ok());
    }

    #[test]
    fn cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
        let cli = Cli::parse_from(["blockbot", "-v", "run", "--max-ticks", "10"]);
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Run {
                max_ticks: Some(10),
                seed: None
            }
        ));
    }
}
