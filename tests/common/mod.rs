// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use searchsync::store;
use searchsync::{DocumentFetcher, Error, MemoryStore, Result, Settings, Store};
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;
use url::Url;

pub const CONFIG_URL: &str = "https://config.example.com/searchsync.json";

/// Fetcher that serves one fixed body (or one fixed failure) and counts calls
pub struct StaticFetcher {
    body: std::result::Result<String, String>,
    calls: AtomicUsize,
}

impl StaticFetcher {
    pub fn body(text: &str) -> Self {
        Self {
            body: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            body: Err(reason.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentFetcher for StaticFetcher {
    async fn fetch(&self, _url: &Url) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.body.clone().map_err(Error::NetworkError)
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Memory store whose settings point at [`CONFIG_URL`]
pub async fn store_with_url(encrypted: bool, password: Option<&str>) -> MemoryStore {
    let store = MemoryStore::new();
    let settings = Settings {
        config_url: CONFIG_URL.to_string(),
        config_encrypted: encrypted,
        encryption_key: password.map(str::to_string),
        ..Default::default()
    };
    store::save_settings(&store, &settings).await.unwrap();
    store
}

/// Error text from the last synchronization record
pub async fn last_error(store: &dyn Store) -> Option<String> {
    store::load_sync_record(store)
        .await
        .unwrap()
        .expect("a synchronization record")
        .error
}

/// Temporary directory and database path for SQLite-backed tests.
///
/// Keep the TempDir alive to prevent cleanup.
pub fn temp_db() -> (TempDir, std::path::PathBuf) {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("state").join("test.db");
    (temp_dir, db_path)
}
