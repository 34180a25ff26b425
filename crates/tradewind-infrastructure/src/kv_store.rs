//! `KeyValueStore` implementations.

use crate::paths::TradewindPaths;
use crate::storage::AtomicJsonFile;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Mutex;
use tradewind_core::storage::KeyValueStore;
use tradewind_core::{Result, TradewindError};

type Entries = BTreeMap<String, String>;

/// Key-value store backed by a single JSON object on disk.
///
/// Every write is a locked read-modify-write of the whole file, so a
/// successful `set` is durable when it returns.
pub struct FileKeyValueStore {
    file: AtomicJsonFile<Entries>,
}

impl FileKeyValueStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicJsonFile::new(path),
        }
    }

    /// Opens `local_store.json` under the given paths.
    pub fn open(paths: &TradewindPaths) -> Self {
        Self::new(paths.local_store_file())
    }

    fn entries(&self) -> Result<Entries> {
        Ok(self.file.load()?.unwrap_or_default())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries()?.remove(key))
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        self.file.update(Entries::new(), |entries| {
            entries.insert(key.to_string(), value);
        })?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        if !self.file.path().exists() {
            return Ok(());
        }
        self.file.update(Entries::new(), |entries| {
            entries.remove(key);
        })?;
        Ok(())
    }
}

/// Process-local store; nothing survives the process.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| TradewindError::internal("memory store lock poisoned"))
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        self.lock()?.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}
