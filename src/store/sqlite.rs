// src/store/sqlite.rs

//! SQLite-backed section store

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

use super::{Store, schema};
use crate::error::{Error, Result};

/// Section store persisted in a SQLite database
///
/// Each `set` runs in a single transaction, so every section write in it is
/// atomic.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and apply migrations
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::InitError(format!(
                    "Failed to create state directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        info!("Opening state database at {}", path.display());
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Database that lives only as long as the store
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        schema::migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::StoreError("database lock poisoned".to_string()))
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached("SELECT value FROM sections WHERE name = ?1")?;

        let mut values = Map::new();
        for key in keys {
            let raw: Option<String> = stmt
                .query_row(params![key], |row| row.get(0))
                .optional()?;
            if let Some(raw) = raw {
                values.insert(key.to_string(), serde_json::from_str(&raw)?);
            }
        }
        Ok(values)
    }

    async fn set(&self, entries: Map<String, Value>) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for (key, value) in &entries {
            tx.execute(
                "INSERT INTO sections (name, value, updated_at)
                 VALUES (?1, ?2, CURRENT_TIMESTAMP)
                 ON CONFLICT(name) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, serde_json::to_string(value)?],
            )?;
        }
        tx.commit()?;
        debug!("Stored {} section(s)", entries.len());
        Ok(())
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("state.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            let mut entries = Map::new();
            entries.insert("settings".to_string(), json!({"configURL": "https://a.example"}));
            entries.insert("searchproviders".to_string(), json!([]));
            store.set(entries).await.unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let values = store.get(&["settings", "searchproviders", "CBC"]).await.unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values["settings"]["configURL"], json!("https://a.example"));
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = SqliteStore::open_in_memory().unwrap();
        for n in 0..3 {
            let mut entries = Map::new();
            entries.insert("lastSync".to_string(), json!({"n": n}));
            store.set(entries).await.unwrap();
        }
        let values = store.get(&["lastSync"]).await.unwrap();
        assert_eq!(values["lastSync"], json!({"n": 2}));
    }
}
