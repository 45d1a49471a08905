use std::sync::Arc;
use std::thread::{self, JoinHandle};

use bot_bt::BehaviourTree;
use bot_core::{ContractViolation, Status};

use crate::client::BehaviourClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Shutdown,
    Disconnected,
    TickBudget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub last_status: Option<Status>,
    pub reason: StopReason,
}

/// Drives one agent: tick, idle, repeat until told to stop.
pub struct AgentRunner {
    client: BehaviourClient,
    tree: Arc<BehaviourTree<BehaviourClient>>,
}

impl AgentRunner {
    pub fn new(client: BehaviourClient, tree: Arc<BehaviourTree<BehaviourClient>>) -> Self {
        Self { client, tree }
    }

    pub fn client(&self) -> &BehaviourClient {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut BehaviourClient {
        &mut self.client
    }

    pub fn into_client(self) -> BehaviourClient {
        self.client
    }

    /// The shutdown flag is checked between ticks only; a confirmation wait
    /// in progress runs to its end.
    pub fn run(&mut self) -> Result<RunSummary, ContractViolation> {
        let max_ticks = self.client.config().max_ticks;
        let tick_interval = self.client.config().tick_interval();
        tracing::info!(agent = %self.client.name(), tree = %self.tree.name(), "agent started");

        let mut ticks = 0;
        let mut last_status = None;
        let reason = loop {
            if self.client.should_stop() {
                break StopReason::Shutdown;
            }
            if !self.client.is_connected() {
                break StopReason::Disconnected;
            }
            if max_ticks.is_some_and(|max| ticks >= max) {
                break StopReason::TickBudget;
            }

            let status = self.tree.tick(&mut self.client)?;
            ticks += 1;
            last_status = Some(status);
            tracing::debug!(agent = %self.client.name(), tick = ticks, ?status, "tree ticked");

            self.client.idle(tick_interval);
        };

        tracing::info!(agent = %self.client.name(), ticks, ?reason, ?last_status, "agent stopped");
        Ok(RunSummary {
            ticks,
            last_status,
            reason,
        })
    }

    /// Run on a dedicated, named thread. The client comes back with the result.
    pub fn spawn(
        mut self,
    ) -> std::io::Result<JoinHandle<(BehaviourClient, Result<RunSummary, ContractViolation>)>> {
        let name = format!("agent-{}", self.client.name());
        thread::Builder::new().name(name).spawn(move || {
            let result = self.run();
            (self.client, result)
        })
    }
}
