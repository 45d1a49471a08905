use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::entity::EntityTable;
use crate::inventory::InventoryTable;
use crate::world::World;

/// Reference-counted state behind one coarse mutex.
///
/// The only way in is a closure, so a guard can never be carried past a
/// suspension point. Copy out whatever must survive the call.
pub struct Shared<T> {
    inner: Arc<Mutex<T>>,
}

pub type SharedWorld = Shared<World>;
pub type SharedEntities = Shared<EntityTable>;
pub type SharedInventory = Shared<InventoryTable>;

impl<T> Shared<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(value)),
        }
    }

    /// Run `f` with exclusive access. Keep `f` short: the network thread
    /// waits on the same lock.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.inner.lock();
        f(&guard)
    }

    pub fn snapshot(&self) -> T
    where
        T: Clone,
    {
        self.read(T::clone)
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Default> Default for Shared<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shared")
            .field("handles", &Arc::strong_count(&self.inner))
            .finish_non_exhaustive()
    }
}
