//! Agent kernel primitives shared by the behaviour tree, the world model and the tasks.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod blackboard;
pub mod rng;
pub mod status;

pub use blackboard::{BbKey, Blackboard, ContractViolation};
pub use rng::{DeterministicRng, SplitMix64};
pub use status::Status;

/// Result of ticking a node or running a leaf task.
///
/// `Err` is reserved for wiring bugs between nodes and aborts the whole run.
pub type TaskResult = Result<Status, ContractViolation>;
