use bot_core::TaskResult;

use crate::bt::{BtNode, TreeError};
use crate::nodes::{Decorator, DecoratorKind, Leaf, Selector, Sequence};
use crate::tree::BehaviourTree;

enum Frame<C> {
    Sequence(String, Vec<Box<dyn BtNode<C>>>),
    Selector(String, Vec<Box<dyn BtNode<C>>>),
    Decorator(DecoratorKind),
}

/// Fluent construction of a [`BehaviourTree`].
///
/// ```ignore
/// let tree = TreeBuilder::new("demo")
///     .selector("root")
///         .leaf("done", is_done)
///         .sequence("work")
///             .leaf("plan", plan)
///             .leaf("act", act)
///         .end()
///     .end()
///     .build()?;
/// ```
///
/// A decorator wraps the next node added and closes on its own.
pub struct TreeBuilder<C> {
    name: String,
    stack: Vec<Frame<C>>,
    root: Option<Box<dyn BtNode<C>>>,
    error: Option<TreeError>,
}

impl<C: 'static> TreeBuilder<C> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stack: Vec::new(),
            root: None,
            error: None,
        }
    }

    pub fn sequence(mut self, name: impl Into<String>) -> Self {
        self.stack.push(Frame::Sequence(name.into(), Vec::new()));
        self
    }

    pub fn selector(mut self, name: impl Into<String>) -> Self {
        self.stack.push(Frame::Selector(name.into(), Vec::new()));
        self
    }

    pub fn decorator(mut self, kind: DecoratorKind) -> Self {
        self.stack.push(Frame::Decorator(kind));
        self
    }

    pub fn inverter(self) -> Self {
        self.decorator(DecoratorKind::Inverter)
    }

    pub fn succeeder(self) -> Self {
        self.decorator(DecoratorKind::Succeeder)
    }

    pub fn repeat(self, times: u32) -> Self {
        self.decorator(DecoratorKind::Repeat { times })
    }

    pub fn leaf(
        self,
        name: impl Into<String>,
        f: impl Fn(&mut C) -> TaskResult + Send + Sync + 'static,
    ) -> Self {
        self.node(Box::new(Leaf::new(name, f)))
    }

    /// Attach an already-built node (a registry leaf, a subtree, ...).
    pub fn node(mut self, node: Box<dyn BtNode<C>>) -> Self {
        self.attach(node);
        self
    }

    /// Close the innermost open composite.
    pub fn end(mut self) -> Self {
        match self.stack.pop() {
            Some(Frame::Sequence(name, children)) => {
                self.attach(Box::new(Sequence::named(name, children)))
            }
            Some(Frame::Selector(name, children)) => {
                self.attach(Box::new(Selector::named(name, children)))
            }
            Some(Frame::Decorator(kind)) => {
                self.record(TreeError::EmptyDecorator(kind.label().to_string()))
            }
            None => self.record(TreeError::UnbalancedEnd),
        }
        self
    }

    pub fn build(self) -> Result<BehaviourTree<C>, TreeError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if let Some(Frame::Decorator(kind)) = self.stack.last() {
            return Err(TreeError::EmptyDecorator(kind.label().to_string()));
        }
        if !self.stack.is_empty() {
            return Err(TreeError::UnclosedComposite(self.stack.len()));
        }
        let root = self.root.ok_or(TreeError::NoRoot)?;
        Ok(BehaviourTree::new(self.name, root))
    }

    fn attach(&mut self, mut node: Box<dyn BtNode<C>>) {
        // Decorators close as soon as they receive their child.
        while let Some(Frame::Decorator(kind)) = self.stack.last() {
            let kind = *kind;
            self.stack.pop();
            node = Box::new(Decorator::new(kind, node));
        }

        if let Some(frame) = self.stack.last_mut() {
            match frame {
                Frame::Sequence(_, children) | Frame::Selector(_, children) => children.push(node),
                Frame::Decorator(_) => unreachable!("decorators are drained above"),
            }
            return;
        }

        if self.root.is_none() {
            self.root = Some(node);
        } else {
            self.record(TreeError::MultipleRoots);
        }
    }

    fn record(&mut self, err: TreeError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}
