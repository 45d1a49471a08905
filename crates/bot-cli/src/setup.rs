//! Assemble a run: world, chests, target structure and tree, then one
//! loopback server thread and one agent thread per configured builder.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::{anyhow, bail, Context, Result};
use bot_bt::{BehaviourTree, TreeSpec};
use bot_core::rng::derive_seed;
use bot_core::{Blackboard, ContractViolation};
use bot_tasks::world_tasks::CHEST_NAME;
use bot_tasks::{
    map_creation_spec, task_registry, AgentRunner, BehaviourClient, CompletionReport,
    RealtimeScheduler, RunSummary, SessionHandles, StructureFile, StructureTarget, StructureView,
};
use bot_world::{
    loopback, AssetMetadata, AssetTable, Chunk, ContainerStore, Entity, RegionSnapshot,
    SharedEntities, SharedInventory, SharedWorld, SimSettings, SimStats, Slot, CHUNK_WIDTH,
};

use crate::config::{AgentSpec, RunConfig};

const CHEST_SLOTS: usize = 27;

pub fn load_assets(config: &RunConfig) -> Result<Arc<dyn AssetMetadata>> {
    let table = match &config.assets {
        Some(path) => AssetTable::load(path)
            .with_context(|| format!("Failed to load assets from {}", path.display()))?,
        None => AssetTable::vanilla(),
    };
    Ok(Arc::new(table))
}

/// Read the structure file, place it at the configured offset and drop
/// scaffolding-only bottom layers.
pub fn load_structure(config: &RunConfig) -> Result<StructureTarget> {
    let file = StructureFile::load(&config.structure)
        .with_context(|| format!("Failed to load structure {}", config.structure.display()))?;
    let mut target = StructureTarget::from_file(&file, config.offset)?;
    if let Some(temp) = &config.temp_block {
        target.trim_temp_layers(temp);
    }
    for (position, block) in target.floating_blocks() {
        tracing::warn!(%position, %block, "block has no neighbour to be placed against");
    }
    Ok(target)
}

pub fn load_tree(path: Option<&Path>) -> Result<BehaviourTree<BehaviourClient>> {
    let (name, spec) = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read tree from {}", path.display()))?;
            let spec: TreeSpec = serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse tree from {}", path.display()))?;
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "tree".to_string());
            (name, spec)
        }
        None => ("map_creation".to_string(), map_creation_spec()),
    };
    Ok(BehaviourTree::from_spec(name, &spec, &task_registry())?)
}

/// Air chunks around the origin with a one-block floor.
pub fn build_world(config: &RunConfig, assets: &dyn AssetMetadata) -> Result<SharedWorld> {
    let air = assets
        .blockstate_by_name("minecraft:air")
        .ok_or_else(|| anyhow!("asset table has no minecraft:air"))?
        .id;
    let floor = assets
        .blockstate_by_name(&config.world.floor_block)
        .ok_or_else(|| anyhow!("unknown floor block {}", config.world.floor_block))?
        .id;

    let mut chunk = Chunk::filled(air);
    for x in 0..CHUNK_WIDTH {
        for z in 0..CHUNK_WIDTH {
            if !chunk.set(x, config.world.floor_y, z, floor) {
                bail!("floor height {} is outside the world", config.world.floor_y);
            }
        }
    }

    let radius = config.world.chunk_radius;
    let world = SharedWorld::default();
    world.with_lock(|w| {
        for cx in -radius..=radius {
            for cz in -radius..=radius {
                w.load_chunk((cx, cz), chunk.clone());
            }
        }
    });
    Ok(world)
}

/// Place every configured chest and fill its slots in order.
pub fn stock_chests(
    config: &RunConfig,
    assets: &dyn AssetMetadata,
    world: &SharedWorld,
) -> Result<ContainerStore> {
    let chest = assets
        .blockstate_by_name(CHEST_NAME)
        .ok_or_else(|| anyhow!("asset table has no {CHEST_NAME}"))?
        .id;
    let containers = ContainerStore::default();

    for spec in &config.chests {
        if spec.items.len() > CHEST_SLOTS {
            bail!(
                "chest at {} lists {} stacks, it holds {CHEST_SLOTS}",
                spec.position,
                spec.items.len()
            );
        }
        let mut slots = vec![Slot::Empty; CHEST_SLOTS];
        for (slot, item) in slots.iter_mut().zip(&spec.items) {
            let id = assets
                .item_by_name(&item.name)
                .ok_or_else(|| anyhow!("unknown item {} in chest at {}", item.name, spec.position))?;
            *slot = Slot::of(id, item.count);
        }
        if !world.with_lock(|w| w.set_block(spec.position, chest)) {
            bail!("chest at {} is outside the loaded world", spec.position);
        }
        containers.with_lock(|store| store.insert(spec.position, slots));
    }
    Ok(containers)
}

/// The entity table agent `index` starts with: itself plus every other builder.
pub fn entities_for(agents: &[AgentSpec], index: usize) -> SharedEntities {
    let entities = SharedEntities::default();
    entities.with_lock(|table| {
        for (i, agent) in agents.iter().enumerate() {
            let entity = Entity::player(i as i32 + 1, agent.spawn);
            if i == index {
                table.set_local_player(entity);
            } else {
                table.upsert(entity);
            }
        }
    });
    entities
}

#[derive(Debug)]
pub struct AgentReport {
    pub name: String,
    pub outcome: Result<RunSummary, ContractViolation>,
    pub server: SimStats,
}

#[derive(Debug)]
pub struct RunReport {
    pub agents: Vec<AgentReport>,
    pub completion: CompletionReport,
}

pub fn run(config: &RunConfig) -> Result<RunReport> {
    if config.agents.is_empty() {
        bail!("no agents configured");
    }
    let assets = load_assets(config)?;
    let structure = load_structure(config)?;
    let tree = Arc::new(load_tree(config.tree.as_deref())?);
    let world = build_world(config, assets.as_ref())?;
    let containers = stock_chests(config, assets.as_ref(), &world)?;

    tracing::info!(
        agents = config.agents.len(),
        start = %structure.start(),
        end = %structure.end(),
        tree = %tree.name(),
        "Starting run"
    );

    let stop_servers = Arc::new(AtomicBool::new(false));
    let mut servers = Vec::with_capacity(config.agents.len());
    let mut agents = Vec::with_capacity(config.agents.len());

    for (index, spec) in config.agents.iter().enumerate() {
        let entities = entities_for(&config.agents, index);
        let inventory = SharedInventory::default();
        let link = SimSettings {
            seed: derive_seed(config.server.link.seed, index as u64, 1),
            ..config.server.link
        };
        let (session, server) = loopback(
            &spec.name,
            world.clone(),
            entities.clone(),
            inventory.clone(),
            containers.clone(),
            Arc::clone(&assets),
            link,
        );

        let flag = Arc::clone(&stop_servers);
        let period = config.pump_interval();
        let server = thread::Builder::new()
            .name(format!("server-{}", spec.name))
            .spawn(move || server.run(flag, period))
            .with_context(|| format!("Failed to spawn server for {}", spec.name))?;
        servers.push(server);

        let handles = SessionHandles {
            world: world.clone(),
            entities,
            inventory,
            assets: Arc::clone(&assets),
            session: Arc::new(session),
        };
        let scheduler = RealtimeScheduler::new(config.agent.poll_interval());
        let mut client = BehaviourClient::new(
            spec.name.clone(),
            index as u64,
            handles,
            Box::new(scheduler),
            config.agent.clone(),
        );
        structure.store(client.blackboard_mut());
        let agent = AgentRunner::new(client, Arc::clone(&tree))
            .spawn()
            .with_context(|| format!("Failed to spawn agent {}", spec.name))?;
        agents.push(agent);
    }

    let joined = join_run(agents, servers, &stop_servers)?;
    let reports = joined
        .into_iter()
        .map(|((client, outcome), server)| AgentReport {
            name: client.name().to_string(),
            outcome,
            server,
        })
        .collect();

    let mut blackboard = Blackboard::new();
    structure.store(&mut blackboard);
    let view = StructureView::read(&blackboard)?;
    let region = world.read(|w| RegionSnapshot::capture(w, view.start, view.end));
    let completion = CompletionReport::measure(&view, &region, assets.as_ref());

    Ok(RunReport {
        agents: reports,
        completion,
    })
}

/// Join every agent, raise `stop_servers`, then join every server. A panicked
/// thread is reported only after all of them have been joined.
fn join_run<A, S>(
    agents: Vec<JoinHandle<A>>,
    servers: Vec<JoinHandle<S>>,
    stop_servers: &AtomicBool,
) -> Result<Vec<(A, S)>> {
    let agents: Vec<_> = agents.into_iter().map(JoinHandle::join).collect();
    stop_servers.store(true, Ordering::SeqCst);
    let servers: Vec<_> = servers.into_iter().map(JoinHandle::join).collect();

    let mut joined = Vec::with_capacity(agents.len());
    for (index, (agent, server)) in agents.into_iter().zip(servers).enumerate() {
        let agent = agent.map_err(|_| anyhow!("agent thread {index} panicked"))?;
        let server = server.map_err(|_| anyhow!("server thread {index} panicked"))?;
        joined.push((agent, server));
    }
    Ok(joined)
}
