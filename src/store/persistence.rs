//! Key-value backends for the saved-form collection.
//!
//! The collection is stored as one JSON document under a single key and is
//! rewritten as a whole on every change.

use log::debug;
use std::collections::HashMap;
use std::path::Path;

use crate::config::StorageConfig;
use crate::error::{FormError, FormResult};

/// Key the saved-form collection is stored under by default.
pub const SAVED_FORMS_KEY: &str = "formBuilder_savedForms";

/// Synchronous string key-value store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> FormResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> FormResult<()>;
}

/// In-process store, used by tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> FormResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> FormResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// sled-backed store. Each write is flushed before returning.
#[derive(Clone)]
pub struct SledStore {
    db: sled::Db,
    tree: sled::Tree,
}

impl SledStore {
    /// Opens the database and tree named by `config`.
    pub fn open(config: &StorageConfig) -> FormResult<Self> {
        Self::open_path(&config.path, &config.tree)
    }

    pub fn open_path(path: &Path, tree: &str) -> FormResult<Self> {
        debug!("Opening sled database at {}", path.display());
        let db = sled::open(path)?;
        Self::new(db, tree)
    }

    /// Wraps an already open database.
    pub fn new(db: sled::Db, tree: &str) -> FormResult<Self> {
        let tree = db.open_tree(tree)?;
        Ok(Self { db, tree })
    }

    pub fn db(&self) -> &sled::Db {
        &self.db
    }
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> FormResult<Option<String>> {
        match self.tree.get(key.as_bytes())? {
            Some(bytes) => String::from_utf8(bytes.to_vec())
                .map(Some)
                .map_err(|e| FormError::Serialization(format!("Stored value is not UTF-8: {}", e))),
            None => Ok(None),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> FormResult<()> {
        self.tree.insert(key.as_bytes(), value.as_bytes())?;
        self.tree.flush()?;
        Ok(())
    }
}
