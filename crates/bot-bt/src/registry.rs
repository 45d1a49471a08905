use std::collections::BTreeMap;
use std::sync::Arc;

use bot_core::TaskResult;

use crate::bt::TreeError;
use crate::nodes::Leaf;

pub type LeafFn<C> = Arc<dyn Fn(&mut C) -> TaskResult + Send + Sync>;

/// Named task functions, resolved once when a tree is assembled from a
/// [`crate::TreeSpec`]. Ticking never looks names up.
pub struct LeafRegistry<C> {
    leaves: BTreeMap<String, LeafFn<C>>,
}

impl<C> Default for LeafRegistry<C> {
    fn default() -> Self {
        Self {
            leaves: BTreeMap::new(),
        }
    }
}

impl<C> Clone for LeafRegistry<C> {
    fn clone(&self) -> Self {
        Self {
            leaves: self.leaves.clone(),
        }
    }
}

impl<C> LeafRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a task under `name`.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        f: impl Fn(&mut C) -> TaskResult + Send + Sync + 'static,
    ) -> &mut Self {
        self.leaves.insert(name.into(), Arc::new(f));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.leaves.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.leaves.keys().map(String::as_str)
    }

    pub fn resolve(&self, name: &str) -> Result<Leaf<C>, TreeError> {
        let f = self
            .leaves
            .get(name)
            .ok_or_else(|| TreeError::UnknownLeaf(name.to_string()))?;
        Ok(Leaf::from_fn(name, Arc::clone(f)))
    }
}
