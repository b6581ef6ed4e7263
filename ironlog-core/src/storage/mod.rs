//! Key-value persistence for workout data.
//!
//! Values are JSON strings stored under a string key. Two backends exist:
//! - [`JsonFileStore`]: one `<key>.json` file per key in a data directory
//! - [`MemoryStore`]: an in-process map, mostly for tests
//!
//! The typed helpers [`load_json`] and [`save_json`] never fail. A missing or
//! unreadable value loads as the caller's default, and a failed save is logged.

mod file_store;
mod memory;
mod slot;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub use file_store::JsonFileStore;
pub use memory::MemoryStore;
pub use slot::Slot;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error for {}: {1}", .0.display())]
    Io(PathBuf, #[source] io::Error),
    #[error("Failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// String-keyed storage of serialized values.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// Loads and deserializes a slot, returning `default` when the slot is
/// missing, unreadable or holds something that does not parse as `T`.
pub fn load_json<S, T>(store: &S, slot: Slot, default: T) -> T
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    let raw = match store.get(slot.key()) {
        Ok(Some(raw)) => raw,
        Ok(None) => return default,
        Err(e) => {
            tracing::warn!("Failed to read '{}': {}", slot.key(), e);
            return default;
        }
    };

    if raw.trim().is_empty() {
        return default;
    }

    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!("Corrupt value in '{}', using default: {}", slot.key(), e);
            default
        }
    }
}

/// Serializes and stores a value. Failures are logged, not returned.
pub fn save_json<S, T>(store: &S, slot: Slot, value: &T)
where
    S: KeyValueStore + ?Sized,
    T: Serialize + ?Sized,
{
    let result = serde_json::to_string(value)
        .map_err(StorageError::from)
        .and_then(|json| store.set(slot.key(), &json));

    if let Err(e) = result {
        tracing::error!("Failed to save '{}': {}", slot.key(), e);
    }
}
