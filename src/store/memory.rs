// src/store/memory.rs

//! Process-local store used by tests and dry runs

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Mutex;

use super::Store;
use crate::error::{Error, Result};

/// In-memory section store
#[derive(Debug, Default)]
pub struct MemoryStore {
    sections: Mutex<Map<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing section values
    pub fn with_sections(sections: Map<String, Value>) -> Self {
        Self {
            sections: Mutex::new(sections),
        }
    }

    /// Copy of everything stored
    pub fn snapshot(&self) -> Result<Map<String, Value>> {
        let sections = self
            .sections
            .lock()
            .map_err(|_| Error::StoreError("memory store lock poisoned".to_string()))?;
        Ok(sections.clone())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>> {
        let sections = self
            .sections
            .lock()
            .map_err(|_| Error::StoreError("memory store lock poisoned".to_string()))?;
        Ok(keys
            .iter()
            .filter_map(|key| sections.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect())
    }

    async fn set(&self, entries: Map<String, Value>) -> Result<()> {
        let mut sections = self
            .sections
            .lock()
            .map_err(|_| Error::StoreError("memory store lock poisoned".to_string()))?;
        sections.extend(entries);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_omits_missing_keys() {
        let store = MemoryStore::new();
        let mut entries = Map::new();
        entries.insert("a".to_string(), json!(1));
        store.set(entries).await.unwrap();

        let values = store.get(&["a", "b"]).await.unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values["a"], json!(1));
    }

    #[tokio::test]
    async fn test_set_replaces_whole_section() {
        let mut initial = Map::new();
        initial.insert("s".to_string(), json!({"x": 1, "y": 2}));
        let store = MemoryStore::with_sections(initial);

        let mut entries = Map::new();
        entries.insert("s".to_string(), json!({"x": 3}));
        store.set(entries).await.unwrap();

        assert_eq!(store.snapshot().unwrap()["s"], json!({"x": 3}));
    }
}
