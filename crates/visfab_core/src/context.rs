//! Component context map
//!
//! Each component starts with a copy of its parent's context. Entries added
//! later with `set_context` are only visible to the component itself and to
//! components created after the write.

use std::any::Any;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::error::{Result, RuntimeError};

/// Key/value store inherited from parent to child at creation
#[derive(Clone, Default)]
pub struct ContextMap {
    entries: FxHashMap<String, Rc<dyn Any>>,
}

impl std::fmt::Debug for ContextMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

impl ContextMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<T: Any>(&mut self, key: impl Into<String>, value: T) -> Rc<T> {
        let value = Rc::new(value);
        self.entries.insert(key.into(), value.clone());
        value
    }

    /// Typed lookup. `Ok(None)` when the key is missing, an error when it is
    /// present with another type.
    pub fn get<T: Any>(&self, key: &str) -> Result<Option<Rc<T>>> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(value) => value
                .clone()
                .downcast::<T>()
                .map(Some)
                .map_err(|_| RuntimeError::ContextType(key.to_string())),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
