// src/sync/mod.rs

//! Configuration synchronization
//!
//! This module provides:
//! - Fetching the remote document over HTTP(S)
//! - Decrypting and decoding it
//! - Merging it into persisted state under per-section policies
//! - First-run defaults, export, and baseline snapshots for undo

mod baseline;
mod defaults;
mod export;
mod fetch;
mod merge;
mod refresh;

pub use baseline::Baseline;
pub use defaults::{
    DEFAULT_DOCUMENT, default_document, default_queries, default_settings, sanitize_defaults,
    sanitize_with,
};
pub use export::{build_document, export_document, export_encrypted, export_json};
pub use fetch::{DocumentFetcher, HttpFetcher, validate_config_url};
pub use merge::{
    apply_incoming_config, apply_rename_rules, merge_basic, merge_groups, merge_providers,
    merge_queries, merge_special,
};
pub use refresh::{needs_refresh, refresh_now};
