//! Key-value store persisting each key as a JSON file on disk.

use std::fs;
use std::io;
use std::path::PathBuf;

use super::{KeyValueStore, StorageError};

/// Stores every key as `<data_dir>/<key>.json`.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    data_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    /// Returns the file backing a key.
    pub fn path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", key))
    }

    pub fn exists(&self, key: &str) -> bool {
        self.path(key).exists()
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path(key);

        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(path, e)),
        }
    }

    /// Writes through a temp file and a rename so a crash never leaves a
    /// half-written value behind.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.data_dir)
            .map_err(|e| StorageError::Io(self.data_dir.clone(), e))?;

        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");

        fs::write(&tmp, value).map_err(|e| StorageError::Io(tmp.clone(), e))?;
        fs::rename(&tmp, &path).map_err(|e| StorageError::Io(path, e))?;

        Ok(())
    }
}
