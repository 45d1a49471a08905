use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bot_core::rng::derive_seed;
use bot_core::{Blackboard, SplitMix64};
use bot_world::{
    AssetMetadata, Intent, NetworkSession, SessionError, SharedEntities, SharedInventory,
    SharedWorld,
};

use crate::config::AgentConfig;
use crate::scheduler::Scheduler;

/// Handles an agent borrows from its connection. Cloning shares the same tables.
#[derive(Clone)]
pub struct SessionHandles {
    pub world: SharedWorld,
    pub entities: SharedEntities,
    pub inventory: SharedInventory,
    pub assets: Arc<dyn AssetMetadata>,
    pub session: Arc<dyn NetworkSession>,
}

/// Everything one tree run works with: its own blackboard and rng, the shared
/// tables, the outbound session and the scheduler that implements `yield_now`.
///
/// Shared tables are only reachable through their closure accessors, and
/// [`BehaviourClient::yield_now`] needs `&mut self`, so yielding from inside a
/// lock scope does not compile.
pub struct BehaviourClient {
    name: String,
    agent_id: u64,
    blackboard: Blackboard,
    handles: SessionHandles,
    scheduler: Box<dyn Scheduler>,
    rng: SplitMix64,
    shutdown: Arc<AtomicBool>,
    config: AgentConfig,
}

impl BehaviourClient {
    pub fn new(
        name: impl Into<String>,
        agent_id: u64,
        handles: SessionHandles,
        scheduler: Box<dyn Scheduler>,
        config: AgentConfig,
    ) -> Self {
        let rng = SplitMix64::new(derive_seed(config.seed, agent_id, 0));
        Self {
            name: name.into(),
            agent_id,
            blackboard: Blackboard::new(),
            handles,
            scheduler,
            rng,
            shutdown: Arc::new(AtomicBool::new(false)),
            config,
        }
    }

    /// Share a shutdown flag with other agents or the host.
    pub fn with_shutdown(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = flag;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn agent_id(&self) -> u64 {
        self.agent_id
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn blackboard_mut(&mut self) -> &mut Blackboard {
        &mut self.blackboard
    }

    pub fn world(&self) -> &SharedWorld {
        &self.handles.world
    }

    pub fn entities(&self) -> &SharedEntities {
        &self.handles.entities
    }

    pub fn inventory(&self) -> &SharedInventory {
        &self.handles.inventory
    }

    pub fn assets(&self) -> &dyn AssetMetadata {
        self.handles.assets.as_ref()
    }

    pub fn handles(&self) -> &SessionHandles {
        &self.handles
    }

    pub fn rng(&mut self) -> &mut SplitMix64 {
        &mut self.rng
    }

    pub fn send(&self, intent: Intent) -> Result<(), SessionError> {
        tracing::trace!(agent = %self.name, ?intent, "sending intent");
        self.handles.session.send_intent(intent)
    }

    pub fn is_connected(&self) -> bool {
        self.handles.session.is_connected()
    }

    /// Hand control back to the scheduler for one quantum.
    pub fn yield_now(&mut self) {
        self.scheduler.yield_now();
    }

    /// Yield repeatedly until at least `duration` has passed.
    pub fn idle(&mut self, duration: Duration) {
        let start = self.now();
        while self.now() - start < duration {
            self.yield_now();
        }
    }

    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    pub fn should_stop(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }
}

impl std::fmt::Debug for BehaviourClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviourClient")
            .field("name", &self.name)
            .field("agent_id", &self.agent_id)
            .field("blackboard", &self.blackboard)
            .finish_non_exhaustive()
    }
}
