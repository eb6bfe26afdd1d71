// src/lib.rs

//! Searchsync configuration engine
//!
//! Keeps a search-provider configuration in sync with a remotely published
//! JSON document.
//!
//! # Architecture
//!
//! - Store-backed: every configuration section lives under one key in a
//!   [`store::Store`] (SQLite on disk, or in memory)
//! - Positional wire format: documents carry rows, not objects; the
//!   [`wire`] tables map positions to named fields
//! - Per-section merge policies: `merge`, `override` or `keep`
//! - Optional OpenSSL-compatible passphrase encryption ([`cipher`])

pub mod cipher;
pub mod document;
mod error;
pub mod groups;
pub mod model;
pub mod paths;
pub mod store;
pub mod sync;
pub mod wire;

pub use document::ConfigDocument;
pub use error::{Error, Result};
pub use groups::GroupMask;
pub use model::{
    BasicSettings, Group, Integration, MergePolicy, Policies, Query, RenameRule, SearchProvider,
    Settings, SpecialPolicy, SpecialProviderData, SyncRecord,
};
pub use store::{MemoryStore, SqliteStore, Store};
pub use sync::{
    Baseline, DocumentFetcher, HttpFetcher, apply_incoming_config, needs_refresh, refresh_now,
    sanitize_defaults,
};
