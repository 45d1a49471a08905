//! Send an intent, then poll the shared tables until the server's effect shows
//! up or the deadline passes.
//!
//! The check closure takes its own short lock each time it runs; nothing is
//! held while the client yields between two checks.

use std::time::Duration;

use bot_core::Status;
use bot_world::{Intent, SessionError};
use thiserror::Error;

use crate::client::BehaviourClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirmed { elapsed: Duration },
    TimedOut { elapsed: Duration },
}

impl ConfirmOutcome {
    pub fn is_confirmed(self) -> bool {
        matches!(self, ConfirmOutcome::Confirmed { .. })
    }

    pub fn elapsed(self) -> Duration {
        match self {
            ConfirmOutcome::Confirmed { elapsed } | ConfirmOutcome::TimedOut { elapsed } => elapsed,
        }
    }
}

/// Why a task reported Failure. The tree only ever sees the Status; this is
/// for logs and for helpers that need to tell the cases apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskFailure {
    #[error("no confirmation for {what} after {elapsed:?}")]
    Timeout { what: String, elapsed: Duration },

    #[error("{0}")]
    Impossible(String),

    #[error("no candidate left in the target volume")]
    PlannerExhausted,

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("agent is shutting down")]
    ShuttingDown,
}

impl TaskFailure {
    pub fn impossible(reason: impl Into<String>) -> Self {
        TaskFailure::Impossible(reason.into())
    }
}

/// Poll `check` until it holds or the client's confirm timeout elapses.
///
/// `check` runs once before the first yield, so a post-condition that is
/// already true confirms at zero elapsed time.
pub fn await_confirmation(
    client: &mut BehaviourClient,
    mut check: impl FnMut(&BehaviourClient) -> bool,
) -> ConfirmOutcome {
    let timeout = client.config().confirm_timeout();
    let start = client.now();
    loop {
        let elapsed = client.now() - start;
        if check(client) {
            return ConfirmOutcome::Confirmed { elapsed };
        }
        if elapsed >= timeout {
            return ConfirmOutcome::TimedOut { elapsed };
        }
        client.yield_now();
    }
}

/// Dispatch `intent` and wait for `check`.
pub fn send_and_confirm(
    client: &mut BehaviourClient,
    intent: Intent,
    what: &str,
    check: impl FnMut(&BehaviourClient) -> bool,
) -> Result<Duration, TaskFailure> {
    client.send(intent)?;
    match await_confirmation(client, check) {
        ConfirmOutcome::Confirmed { elapsed } => Ok(elapsed),
        ConfirmOutcome::TimedOut { elapsed } => Err(TaskFailure::Timeout {
            what: what.to_string(),
            elapsed,
        }),
    }
}

/// Collapse a task outcome into the Status the tree sees, logging failures.
pub fn settle(client: &BehaviourClient, what: &str, outcome: Result<(), TaskFailure>) -> Status {
    match outcome {
        Ok(()) => Status::Success,
        Err(failure @ TaskFailure::Timeout { .. }) => {
            tracing::warn!(agent = %client.name(), task = what, %failure, "confirmation timed out");
            Status::Failure
        }
        Err(failure @ TaskFailure::Session(_)) => {
            tracing::warn!(agent = %client.name(), task = what, %failure, "session unavailable");
            Status::Failure
        }
        Err(failure) => {
            tracing::debug!(agent = %client.name(), task = what, %failure, "task failed");
            Status::Failure
        }
    }
}
