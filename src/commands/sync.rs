// src/commands/sync.rs
//! Synchronization commands: init, refresh, apply, export, status

use super::{open_store, write_output};
use anyhow::{Context, Result};
use searchsync::document::normalize_line_endings;
use searchsync::store;
use searchsync::sync::{self, HttpFetcher, validate_config_url};
use searchsync::{ConfigDocument, cipher, paths};
use std::time::Duration;
use tracing::info;

/// Create the database and install defaults
pub async fn cmd_init(db_path: Option<&str>) -> Result<()> {
    let (store, path) = open_store(db_path)?;
    info!("Initializing state database at: {}", path.display());
    sync::sanitize_defaults(&store).await?;
    println!("State database initialized at: {}", path.display());
    println!("Data directory: {}", paths::db_dir(&path).display());
    Ok(())
}

/// Scheduling interval for `--if-due`, saturating on absurd hour counts
fn refresh_interval(hours: u64) -> Duration {
    Duration::from_secs(hours.saturating_mul(3600))
}

/// Fetch and merge the configured document
pub async fn cmd_refresh(
    db_path: Option<&str>,
    if_due: bool,
    interval_hours: u64,
    timeout: Option<u64>,
) -> Result<()> {
    let (store, _) = open_store(db_path)?;

    if if_due {
        let settings = store::load_settings(&store).await?;
        let last = store::load_sync_record(&store).await?;
        let interval = refresh_interval(interval_hours);
        if !sync::needs_refresh(&settings, last.as_ref(), interval) {
            println!("Configuration is up to date");
            return Ok(());
        }
    }

    let fetcher = HttpFetcher::with_timeout(timeout.map(Duration::from_secs))?;
    if sync::refresh_now(&store, &fetcher).await {
        println!("Configuration refreshed");
        return Ok(());
    }

    let reason = store::load_sync_record(&store)
        .await?
        .and_then(|record| record.error)
        .unwrap_or_else(|| "unknown error".to_string());
    Err(anyhow::anyhow!("Refresh failed: {}", reason))
}

/// Merge a local document file
pub async fn cmd_apply(file: &str, db_path: Option<&str>, force: bool) -> Result<()> {
    let (store, _) = open_store(db_path)?;
    let raw = std::fs::read_to_string(file).with_context(|| format!("reading {}", file))?;
    let text = normalize_line_endings(&raw);

    let text = if cipher::looks_encrypted(&text) {
        let settings = store::load_settings(&store).await?;
        let password = settings.password().ok_or(searchsync::Error::MissingEncryptionKey)?;
        cipher::decrypt(&text, password)?
    } else {
        text
    };

    let doc = ConfigDocument::parse(&text)?;
    sync::apply_incoming_config(&store, &doc, force).await?;
    println!("Applied {}{}", file, if force { " (override)" } else { "" });
    Ok(())
}

/// Export the stored configuration
pub async fn cmd_export(db_path: Option<&str>, output: Option<&str>, encrypt: bool) -> Result<()> {
    let (store, _) = open_store(db_path)?;
    let text = if encrypt {
        sync::export_encrypted(&store).await?
    } else {
        sync::export_json(&store).await?
    };
    write_output(&text, output)
}

/// Fill gaps from the bundled defaults
pub async fn cmd_sanitize(db_path: Option<&str>) -> Result<()> {
    let (store, _) = open_store(db_path)?;
    let baseline = sync::Baseline::capture(&store).await?;
    sync::sanitize_defaults(&store).await?;

    let changed = baseline.changed_sections(&store).await?;
    if changed.is_empty() {
        println!("Nothing to fill");
    } else {
        println!("Filled: {}", changed.join(", "));
    }
    Ok(())
}

/// Show the configuration source and last synchronization
pub async fn cmd_status(db_path: Option<&str>) -> Result<()> {
    let (store, path) = open_store(db_path)?;
    let settings = store::load_settings(&store).await?;
    let providers = store::load_providers(&store).await?;
    let last = store::load_sync_record(&store).await?;

    println!("Database: {}", path.display());
    println!(
        "Config URL: {}",
        if settings.config_url.is_empty() { "(not set)" } else { settings.config_url.as_str() }
    );
    println!(
        "Encrypted: {}{}",
        settings.config_encrypted,
        if settings.config_encrypted && settings.password().is_none() {
            " (no password set)"
        } else {
            ""
        }
    );
    println!("Auto-update: {}", settings.auto_update);
    println!("Use groups: {}", settings.use_groups);
    for (index, group) in settings.groups.iter().enumerate() {
        let members = searchsync::groups::providers_in_group(&providers, &settings.groups, index);
        println!(
            "  Group {}: {} [{}] ({} provider(s))",
            index + 1,
            if group.name.is_empty() { "-" } else { group.name.as_str() },
            if group.enabled { "enabled" } else { "disabled" },
            members.len()
        );
    }
    println!(
        "Search providers: {} ({} enabled)",
        providers.len(),
        providers.iter().filter(|p| p.enabled).count()
    );
    println!("Policies: search providers={}", settings.search_provider_policy());

    match last {
        Some(record) => match &record.error {
            None => println!("Last sync: {} (ok)", record.timestamp),
            Some(error) => println!("Last sync: {} (failed: {})", record.timestamp, error),
        },
        None => println!("Last sync: never"),
    }
    Ok(())
}

/// Point the engine at a configuration document
pub async fn cmd_set_url(
    url: &str,
    db_path: Option<&str>,
    password: Option<String>,
    encrypted: bool,
    auto_update: Option<bool>,
) -> Result<()> {
    validate_config_url(url)?;
    let (store, _) = open_store(db_path)?;
    let mut settings = store::load_settings(&store).await?;

    settings.config_url = url.trim().to_string();
    if let Some(password) = password {
        settings.encryption_key = Some(password);
        settings.config_encrypted = true;
    } else if encrypted {
        settings.config_encrypted = true;
    }
    if let Some(auto_update) = auto_update {
        settings.auto_update = auto_update;
    }

    store::save_settings(&store, &settings).await?;
    println!("Configuration URL set to {}", settings.config_url);
    Ok(())
}
