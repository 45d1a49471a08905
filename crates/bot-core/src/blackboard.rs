use std::any::{type_name, Any};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use thiserror::Error;

/// A wiring bug between tree nodes: a mandatory key was never written, or was
/// written with a different type than the reader expects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("blackboard key `{key}` is missing (requested as {requested})")]
    MissingKey {
        key: String,
        requested: &'static str,
    },

    #[error("blackboard type mismatch for key `{key}` (stored {stored}, requested {requested})")]
    TypeMismatch {
        key: String,
        stored: &'static str,
        requested: &'static str,
    },
}

/// Typed name for a blackboard entry.
///
/// Nodes that exchange data declare the key once as a constant so the writer
/// and the reader agree on both the name and the type.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BbKey<T: 'static> {
    name: &'static str,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: 'static> Copy for BbKey<T> {}

impl<T: 'static> Clone for BbKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Any + Send> BbKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _phantom: PhantomData,
        }
    }

    pub fn name(self) -> &'static str {
        self.name
    }

    pub fn get(self, blackboard: &Blackboard) -> Result<&T, ContractViolation> {
        blackboard.get(self.name)
    }

    pub fn get_or(self, blackboard: &Blackboard, default: T) -> Result<T, ContractViolation>
    where
        T: Clone,
    {
        blackboard.get_or(self.name, default)
    }

    pub fn set(self, blackboard: &mut Blackboard, value: T) {
        blackboard.set(self.name, value);
    }
}

struct Entry {
    value: Box<dyn Any + Send>,
    type_name: &'static str,
}

/// String-keyed scratch store owned by a single agent run.
///
/// Not synchronized: only the thread driving the owning tree touches it.
#[derive(Default)]
pub struct Blackboard {
    values: BTreeMap<String, Entry>,
}

impl fmt::Debug for Blackboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.values.iter().map(|(k, e)| (k, e.type_name)))
            .finish()
    }
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Insert or overwrite; the stored type follows the new value.
    pub fn set<T: Any + Send>(&mut self, key: impl Into<String>, value: T) {
        self.values.insert(
            key.into(),
            Entry {
                value: Box::new(value),
                type_name: type_name::<T>(),
            },
        );
    }

    pub fn get<T: Any>(&self, key: &str) -> Result<&T, ContractViolation> {
        self.try_get(key)?
            .ok_or_else(|| ContractViolation::MissingKey {
                key: key.to_string(),
                requested: type_name::<T>(),
            })
    }

    /// Like [`Blackboard::get`], but a missing key yields `default`.
    /// A key stored with another type is still a violation.
    pub fn get_or<T: Any + Clone>(&self, key: &str, default: T) -> Result<T, ContractViolation> {
        Ok(self.try_get::<T>(key)?.cloned().unwrap_or(default))
    }

    /// `Ok(None)` when absent, `Err` only on a type mismatch.
    pub fn try_get<T: Any>(&self, key: &str) -> Result<Option<&T>, ContractViolation> {
        let Some(entry) = self.values.get(key) else {
            return Ok(None);
        };
        entry
            .value
            .downcast_ref::<T>()
            .map(Some)
            .ok_or_else(|| ContractViolation::TypeMismatch {
                key: key.to_string(),
                stored: entry.type_name,
                requested: type_name::<T>(),
            })
    }

    pub fn get_mut<T: Any>(&mut self, key: &str) -> Result<&mut T, ContractViolation> {
        let Some(entry) = self.values.get_mut(key) else {
            return Err(ContractViolation::MissingKey {
                key: key.to_string(),
                requested: type_name::<T>(),
            });
        };
        let stored = entry.type_name;
        entry
            .value
            .downcast_mut::<T>()
            .ok_or_else(|| ContractViolation::TypeMismatch {
                key: key.to_string(),
                stored,
                requested: type_name::<T>(),
            })
    }

    /// Drop the entry if present. Returns whether something was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }
}
