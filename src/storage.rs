//! Opaque string key-value persistence.

use std::collections::HashMap;

use web_sys::{Storage, window};

use crate::error::{GameError, Result};

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-process store, used natively and in tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.items.remove(key);
        Ok(())
    }
}

/// The browser's `window.localStorage`.
pub struct BrowserStore {
    storage: Storage,
}

impl BrowserStore {
    pub fn local() -> Result<Self> {
        let win = window().ok_or_else(|| GameError::Storage("no window".into()))?;
        let storage = win
            .local_storage()
            .map_err(|e| GameError::Storage(format!("localStorage unavailable: {:?}", e)))?
            .ok_or_else(|| GameError::Storage("localStorage disabled".into()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| GameError::Storage(format!("read [{}] failed: {:?}", key, e)))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| GameError::Storage(format!("write [{}] failed: {:?}", key, e)))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| GameError::Storage(format!("remove [{}] failed: {:?}", key, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_set_get_remove() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v1").unwrap();
        store.set("k", "v2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
        assert_eq!(store.len(), 1);
        store.remove("k").unwrap();
        store.remove("missing").unwrap();
        assert!(store.is_empty());
    }
}
