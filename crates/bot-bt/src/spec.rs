use serde::{Deserialize, Serialize};

use crate::bt::{BtNode, TreeError};
use crate::nodes::{Decorator, DecoratorKind, Selector, Sequence};
use crate::registry::LeafRegistry;

/// Serializable tree description. Leaves refer to [`LeafRegistry`] entries by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeSpec {
    Sequence {
        #[serde(default)]
        name: Option<String>,
        children: Vec<TreeSpec>,
    },
    Selector {
        #[serde(default)]
        name: Option<String>,
        children: Vec<TreeSpec>,
    },
    Decorator {
        decorator: DecoratorKind,
        child: Box<TreeSpec>,
    },
    Leaf {
        leaf: String,
    },
}

impl TreeSpec {
    pub fn leaf(name: impl Into<String>) -> Self {
        TreeSpec::Leaf { leaf: name.into() }
    }

    /// Every leaf name referenced anywhere below this node.
    pub fn leaf_names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_leaf_names(&mut out);
        out
    }

    fn collect_leaf_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            TreeSpec::Sequence { children, .. } | TreeSpec::Selector { children, .. } => {
                for c in children {
                    c.collect_leaf_names(out);
                }
            }
            TreeSpec::Decorator { child, .. } => child.collect_leaf_names(out),
            TreeSpec::Leaf { leaf } => out.push(leaf),
        }
    }

    pub fn build<C: 'static>(
        &self,
        registry: &LeafRegistry<C>,
    ) -> Result<Box<dyn BtNode<C>>, TreeError> {
        Ok(match self {
            TreeSpec::Sequence { name, children } => {
                let children = build_all(children, registry)?;
                Box::new(Sequence::named(
                    name.as_deref().unwrap_or("sequence"),
                    children,
                ))
            }
            TreeSpec::Selector { name, children } => {
                let children = build_all(children, registry)?;
                Box::new(Selector::named(
                    name.as_deref().unwrap_or("selector"),
                    children,
                ))
            }
            TreeSpec::Decorator { decorator, child } => {
                Box::new(Decorator::new(*decorator, child.build(registry)?))
            }
            TreeSpec::Leaf { leaf } => Box::new(registry.resolve(leaf)?),
        })
    }
}

fn build_all<C: 'static>(
    specs: &[TreeSpec],
    registry: &LeafRegistry<C>,
) -> Result<Vec<Box<dyn BtNode<C>>>, TreeError> {
    specs.iter().map(|s| s.build(registry)).collect()
}
