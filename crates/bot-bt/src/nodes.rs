use std::sync::Arc;

use bot_core::{Status, TaskResult};
use serde::{Deserialize, Serialize};

use crate::bt::BtNode;
use crate::registry::LeafFn;

/// Ticks children in order and stops at the first one that does not succeed.
pub struct Sequence<C> {
    name: String,
    children: Vec<Box<dyn BtNode<C>>>,
}

impl<C> Sequence<C> {
    pub fn new(children: Vec<Box<dyn BtNode<C>>>) -> Self {
        Self::named("sequence", children)
    }

    pub fn named(name: impl Into<String>, children: Vec<Box<dyn BtNode<C>>>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }
}

impl<C: 'static> BtNode<C> for Sequence<C> {
    fn tick(&self, ctx: &mut C) -> TaskResult {
        for child in &self.children {
            match child.tick(ctx)? {
                Status::Success => continue,
                other => return Ok(other),
            }
        }
        Ok(Status::Success)
    }

    fn label(&self) -> &str {
        &self.name
    }
}

/// Ticks children in order and stops at the first one that does not fail.
pub struct Selector<C> {
    name: String,
    children: Vec<Box<dyn BtNode<C>>>,
}

impl<C> Selector<C> {
    pub fn new(children: Vec<Box<dyn BtNode<C>>>) -> Self {
        Self::named("selector", children)
    }

    pub fn named(name: impl Into<String>, children: Vec<Box<dyn BtNode<C>>>) -> Self {
        Self {
            name: name.into(),
            children,
        }
    }
}

impl<C: 'static> BtNode<C> for Selector<C> {
    fn tick(&self, ctx: &mut C) -> TaskResult {
        for child in &self.children {
            match child.tick(ctx)? {
                Status::Failure => continue,
                other => return Ok(other),
            }
        }
        Ok(Status::Failure)
    }

    fn label(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecoratorKind {
    /// Swap Success and Failure.
    Inverter,
    /// Report Success whatever the child returned (Running passes through).
    Succeeder,
    /// Report Failure whatever the child returned (Running passes through).
    Failer,
    /// Tick the child `times` times within one tick, stopping at the first non-Success.
    Repeat { times: u32 },
    /// Tick the child until it succeeds, at most `attempts` times.
    RetryUntilSuccess { attempts: u32 },
}

impl DecoratorKind {
    pub fn label(&self) -> &'static str {
        match self {
            DecoratorKind::Inverter => "inverter",
            DecoratorKind::Succeeder => "succeeder",
            DecoratorKind::Failer => "failer",
            DecoratorKind::Repeat { .. } => "repeat",
            DecoratorKind::RetryUntilSuccess { .. } => "retry_until_success",
        }
    }
}

pub struct Decorator<C> {
    kind: DecoratorKind,
    child: Box<dyn BtNode<C>>,
}

impl<C> Decorator<C> {
    pub fn new(kind: DecoratorKind, child: Box<dyn BtNode<C>>) -> Self {
        Self { kind, child }
    }

    pub fn kind(&self) -> DecoratorKind {
        self.kind
    }
}

impl<C: 'static> BtNode<C> for Decorator<C> {
    fn tick(&self, ctx: &mut C) -> TaskResult {
        match self.kind {
            DecoratorKind::Inverter => Ok(self.child.tick(ctx)?.invert()),
            DecoratorKind::Succeeder => Ok(match self.child.tick(ctx)? {
                Status::Running => Status::Running,
                _ => Status::Success,
            }),
            DecoratorKind::Failer => Ok(match self.child.tick(ctx)? {
                Status::Running => Status::Running,
                _ => Status::Failure,
            }),
            DecoratorKind::Repeat { times } => {
                for _ in 0..times {
                    match self.child.tick(ctx)? {
                        Status::Success => continue,
                        other => return Ok(other),
                    }
                }
                Ok(Status::Success)
            }
            DecoratorKind::RetryUntilSuccess { attempts } => {
                for _ in 0..attempts {
                    match self.child.tick(ctx)? {
                        Status::Failure => continue,
                        other => return Ok(other),
                    }
                }
                Ok(Status::Failure)
            }
        }
    }

    fn label(&self) -> &str {
        self.kind.label()
    }
}

/// A registered task function bound into the tree.
pub struct Leaf<C> {
    name: String,
    f: LeafFn<C>,
}

impl<C> Leaf<C> {
    pub fn new(
        name: impl Into<String>,
        f: impl Fn(&mut C) -> TaskResult + Send + Sync + 'static,
    ) -> Self {
        Self::from_fn(name, Arc::new(f))
    }

    pub fn from_fn(name: impl Into<String>, f: LeafFn<C>) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<C: 'static> BtNode<C> for Leaf<C> {
    fn tick(&self, ctx: &mut C) -> TaskResult {
        let status = (self.f)(ctx)?;
        tracing::trace!(leaf = %self.name, ?status, "leaf ticked");
        Ok(status)
    }

    fn label(&self) -> &str {
        &self.name
    }
}

/// Read-only check: Success when the predicate holds.
pub struct Condition<F> {
    name: String,
    cond: F,
}

impl<F> Condition<F> {
    pub fn new(name: impl Into<String>, cond: F) -> Self {
        Self {
            name: name.into(),
            cond,
        }
    }
}

impl<F, C> BtNode<C> for Condition<F>
where
    F: Fn(&C) -> bool + Send + Sync + 'static,
    C: 'static,
{
    fn tick(&self, ctx: &mut C) -> TaskResult {
        Ok(Status::from((self.cond)(&*ctx)))
    }

    fn label(&self) -> &str {
        &self.name
    }
}
