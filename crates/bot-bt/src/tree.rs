use bot_core::TaskResult;

use crate::bt::{BtNode, TreeError};
use crate::registry::LeafRegistry;
use crate::spec::TreeSpec;

/// A rooted, immutable tree. Only the context mutates while it runs, so one
/// tree can be shared by several agents.
pub struct BehaviourTree<C> {
    name: String,
    root: Box<dyn BtNode<C>>,
}

impl<C: 'static> BehaviourTree<C> {
    pub fn new(name: impl Into<String>, root: Box<dyn BtNode<C>>) -> Self {
        Self {
            name: name.into(),
            root,
        }
    }

    pub fn from_spec(
        name: impl Into<String>,
        spec: &TreeSpec,
        registry: &LeafRegistry<C>,
    ) -> Result<Self, TreeError> {
        Ok(Self::new(name, spec.build(registry)?))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root_label(&self) -> &str {
        self.root.label()
    }

    /// One full descent from the root.
    pub fn tick(&self, ctx: &mut C) -> TaskResult {
        let status = self.root.tick(ctx);
        if let Err(violation) = &status {
            tracing::error!(tree = %self.name, %violation, "tree aborted");
        }
        status
    }
}

pub fn tick<C: 'static>(tree: &BehaviourTree<C>, ctx: &mut C) -> TaskResult {
    tree.tick(ctx)
}
