//! In-process key-value store, used by tests and embedding callers.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::{KeyValueStore, StorageError};

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
    writes: Cell<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a raw value without counting it as a write.
    pub fn with_raw(self, key: &str, value: impl Into<String>) -> Self {
        self.values.borrow_mut().insert(key.to_string(), value.into());
        self
    }

    /// Number of `set` calls since creation.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
