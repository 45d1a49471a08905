//! Agent-side tasks over the shared world.
//!
//! Every world-changing leaf follows the same shape: read what it needs under
//! a short lock, send an intent, then poll the shared tables with
//! [`confirm::await_confirmation`] until the server's effect shows up or the
//! configured deadline passes. Timeouts and impossible actions become
//! `Status::Failure`; only blackboard contract violations abort a run.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod base;
pub mod client;
pub mod config;
pub mod confirm;
pub mod inventory_tasks;
pub mod keys;
pub mod planner;
pub mod runner;
pub mod scheduler;
pub mod structure;
pub mod trees;
pub mod world_tasks;

pub use client::{BehaviourClient, SessionHandles};
pub use config::{AgentConfig, ConfigError};
pub use confirm::{await_confirmation, send_and_confirm, ConfirmOutcome, TaskFailure};
pub use inventory_tasks::ItemFilter;
pub use planner::{
    compare_volume, plan, CompletionReport, Mismatch, PlannedTask, PlannerInput, TaskAction,
};
pub use runner::{AgentRunner, RunSummary, StopReason};
pub use scheduler::{ManualScheduler, RealtimeScheduler, Scheduler};
pub use structure::{
    Palette, StructureError, StructureFile, StructureTarget, StructureView, TargetGrid, AIR,
};
pub use trees::{map_creation_spec, map_creation_tree, task_registry};
