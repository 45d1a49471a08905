//! Behaviour tree runtime built on `bot-core`.
//!
//! Composites are stateless: every [`BehaviourTree::tick`] is one full descent
//! from the root. A leaf that must wait for the world to change owns that wait
//! itself, so `Running` only shows up when a leaf chooses to return it.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod builder;
pub mod bt;
pub mod nodes;
pub mod registry;
pub mod spec;
pub mod tree;

pub use bt::{BtNode, TreeError};
pub use builder::TreeBuilder;
pub use nodes::{Condition, Decorator, DecoratorKind, Leaf, Selector, Sequence};
pub use registry::{LeafFn, LeafRegistry};
pub use spec::TreeSpec;
pub use tree::{tick, BehaviourTree};
