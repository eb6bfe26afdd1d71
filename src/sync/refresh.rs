// src/sync/refresh.rs

//! Fetch, decrypt, parse and merge the configured remote document

use chrono::Utc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::fetch::{DocumentFetcher, validate_config_url};
use super::merge::apply_incoming_config;
use crate::cipher;
use crate::document::{ConfigDocument, normalize_line_endings};
use crate::error::{Error, Result};
use crate::model::{Settings, SyncRecord};
use crate::store::{self, Store};

/// Run one synchronization pass
///
/// Never fails: every error is turned into a message and stored in the
/// last-synchronization record together with the attempt time. Returns whether
/// the pass succeeded.
pub async fn refresh_now(store: &dyn Store, fetcher: &dyn DocumentFetcher) -> bool {
    let outcome = try_refresh(store, fetcher).await;

    let error = match &outcome {
        Ok(()) => {
            info!("Configuration refreshed");
            None
        }
        Err(e) => {
            warn!("Configuration refresh failed: {}", e);
            Some(e.to_string())
        }
    };

    if let Err(e) = store::save_sync_record(store, &SyncRecord::now(error)).await {
        warn!("Failed to record synchronization result: {}", e);
    }

    outcome.is_ok()
}

async fn try_refresh(store: &dyn Store, fetcher: &dyn DocumentFetcher) -> Result<()> {
    let settings = store::load_settings(store).await?;

    let url = validate_config_url(&settings.config_url)?;
    let password = if settings.config_encrypted {
        Some(settings.password().ok_or(Error::MissingEncryptionKey)?)
    } else {
        None
    };

    debug!("Fetching via {} fetcher", fetcher.name());
    let body = fetcher.fetch(&url).await?;
    let text = normalize_line_endings(&body);

    let text = match password {
        Some(password) => cipher::decrypt(&text, password)?,
        None => text,
    };

    let doc = ConfigDocument::parse(&text)?;
    apply_incoming_config(store, &doc, false).await
}

/// Decide whether an automatic refresh is due
///
/// Due when auto-update is on and the last attempt is missing, unreadable, or
/// older than `interval`.
pub fn needs_refresh(settings: &Settings, last: Option<&SyncRecord>, interval: Duration) -> bool {
    if !settings.auto_update {
        return false;
    }
    let Some(last_time) = last.and_then(SyncRecord::time) else {
        return true;
    };
    // A timestamp in the future reads as a negative age and is never due
    match Utc::now().signed_duration_since(last_time).to_std() {
        Ok(age) => age > interval,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn auto_settings() -> Settings {
        Settings {
            auto_update: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_needs_refresh_disabled() {
        assert!(!needs_refresh(&Settings::default(), None, Duration::from_secs(60)));
    }

    #[test]
    fn test_needs_refresh_never_synced() {
        assert!(needs_refresh(&auto_settings(), None, Duration::from_secs(60)));
    }

    #[test]
    fn test_needs_refresh_recent() {
        let record = SyncRecord::now(None);
        assert!(!needs_refresh(&auto_settings(), Some(&record), Duration::from_secs(3600)));
    }

    #[test]
    fn test_needs_refresh_stale_or_unreadable() {
        let stale = SyncRecord {
            timestamp: (Utc::now() - ChronoDuration::hours(2)).to_rfc3339(),
            error: None,
        };
        assert!(needs_refresh(&auto_settings(), Some(&stale), Duration::from_secs(3600)));

        let unreadable = SyncRecord {
            timestamp: "not a time".to_string(),
            error: None,
        };
        assert!(needs_refresh(&auto_settings(), Some(&unreadable), Duration::from_secs(3600)));
    }
}
