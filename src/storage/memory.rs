use std::collections::HashMap;
use std::sync::RwLock;

use super::KeyValueStore;
use crate::{Result, StorefrontError};

/// In-process store. Used by tests and when no data directory is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> Result<usize> {
        let guard = self.entries.read().map_err(|_| poisoned())?;
        Ok(guard.len())
    }

    pub fn is_empty(&self) -> Result<bool> { Ok(self.len()? == 0) }
}

fn poisoned() -> StorefrontError { StorefrontError::Storage("memory store lock poisoned".into()) }

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let guard = self.entries.read().map_err(|_| poisoned())?;
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut guard = self.entries.write().map_err(|_| poisoned())?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut guard = self.entries.write().map_err(|_| poisoned())?;
        guard.remove(key);
        Ok(())
    }
}
