use bot_core::TaskResult;
use thiserror::Error;

pub trait BtNode<C>: Send + Sync + 'static {
    fn tick(&self, ctx: &mut C) -> TaskResult;

    /// Label used in logs; composites report their kind.
    fn label(&self) -> &str;
}

/// Problems found while assembling a tree. Ticking never produces these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("no leaf registered under `{0}`")]
    UnknownLeaf(String),

    #[error("`end()` called with no open composite")]
    UnbalancedEnd,

    #[error("{0} composite(s) left open at build time")]
    UnclosedComposite(usize),

    #[error("decorator `{0}` has no child")]
    EmptyDecorator(String),

    #[error("tree has no root node")]
    NoRoot,

    #[error("tree already has a root; wrap siblings in a composite")]
    MultipleRoots,
}
