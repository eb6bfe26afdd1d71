// src/sync/defaults.rs

//! First-run normalization from the bundled default document

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::document::ConfigDocument;
use crate::error::{Error, Result};
use crate::model::{Group, Integration, Query, Settings};
use crate::store::{self, SETTINGS_KEY, Store};

/// Default document shipped with the binary
pub const DEFAULT_DOCUMENT: &str = include_str!("../../defaults/default_config.json");

/// Decode the bundled default document
pub fn default_document() -> Result<ConfigDocument> {
    ConfigDocument::parse(DEFAULT_DOCUMENT)
        .map_err(|e| Error::InitError(format!("Bundled default document is invalid: {e}")))
}

/// Settings as a fresh install sees them
pub fn default_settings(doc: &ConfigDocument) -> Settings {
    let mut settings = Settings::default();
    if let Some(basic) = &doc.basic {
        settings.apply_basic(basic);
    }
    settings.groups = doc
        .groups
        .iter()
        .enumerate()
        .map(|(index, name)| Group::initial(index, name.as_deref().unwrap_or_default()))
        .collect();
    settings.normalize_groups();
    settings
}

/// Fill gaps in persisted state from the bundled defaults
///
/// Existing values always win; running this twice changes nothing.
pub async fn sanitize_defaults(store: &dyn Store) -> Result<()> {
    let doc = default_document()?;
    sanitize_with(store, &doc).await
}

/// [`sanitize_defaults`] against an explicit default document
pub async fn sanitize_with(store: &dyn Store, doc: &ConfigDocument) -> Result<()> {
    // Settings: defaults first, then every persisted key on top
    let mut merged = match serde_json::to_value(default_settings(doc))? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    match store::get_section(store, SETTINGS_KEY).await? {
        Some(Value::Object(existing)) => merged.extend(existing),
        Some(_) => warn!("Stored settings are not an object, replacing with defaults"),
        None => info!("No stored settings, installing defaults"),
    }
    let mut settings: Settings = serde_json::from_value(Value::Object(merged)).unwrap_or_else(|e| {
        warn!("Stored settings do not fit defaults, resetting: {}", e);
        default_settings(doc)
    });
    if settings.groups.is_empty() {
        settings.groups = default_settings(doc).groups;
    }
    settings.normalize_groups();
    store::save_settings(store, &settings).await?;

    // Search providers: only an empty list is populated; a list holding
    // unreadable entries is not empty
    let installed = store::load_provider_list(store)
        .await?
        .is_some_and(|list| !list.is_empty());
    if !installed {
        if let Some(defaults) = &doc.search_providers {
            info!("Installing {} default search provider(s)", defaults.len());
            store::save_providers(store, defaults).await?;
        }
    }

    // Special integrations: config map and query list independently
    for integration in Integration::ALL {
        let block = doc.special(integration);
        let raw = store::get_section(store, integration.key()).await?;
        let existing = raw.as_ref().and_then(Value::as_object);

        let config = match existing.and_then(|o| o.get("config")) {
            Some(Value::Object(map)) => Some(map.clone()),
            _ => block.config.clone(),
        };
        let queries = match existing.and_then(|o| o.get("queries")) {
            Some(Value::Array(items)) => items.clone(),
            _ => block
                .queries
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(serde_json::to_value)
                .collect::<std::result::Result<Vec<_>, _>>()?,
        };

        let mut section = Map::new();
        section.insert(
            "config".to_string(),
            config.map(Value::Object).unwrap_or(Value::Null),
        );
        section.insert("queries".to_string(), Value::Array(queries));
        let section = Value::Object(section);

        if raw.as_ref() != Some(&section) {
            info!("Filling {} defaults", integration);
            store::set_section(store, integration.key(), section).await?;
        }
    }

    Ok(())
}

/// Default queries for one integration (used by tools that reset a list)
pub fn default_queries(integration: Integration) -> Result<Vec<Query>> {
    Ok(default_document()?
        .special(integration)
        .queries
        .clone()
        .unwrap_or_default())
}
