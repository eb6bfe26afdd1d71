// src/store/mod.rs

//! Persistent store for configuration sections
//!
//! The engine reads and writes whole sections by fixed key. A backend only has
//! to make each individual section write atomic; there is no locking across a
//! read and the following write, so two concurrent synchronizations can lose
//! an update. Callers that need more must serialize refreshes themselves.

mod memory;
mod schema;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::Result;
use crate::model::{
    Integration, Query, SearchProvider, Settings, SpecialProviderData, SyncRecord,
};

/// Section holding [`Settings`]
pub const SETTINGS_KEY: &str = "settings";
/// Section holding the search-provider list
pub const SEARCH_PROVIDERS_KEY: &str = "searchproviders";
/// Section holding the last [`SyncRecord`]
pub const LAST_SYNC_KEY: &str = "lastSync";

/// Every configuration section (everything except the sync record)
pub fn config_section_keys() -> Vec<&'static str> {
    let mut keys = vec![SETTINGS_KEY, SEARCH_PROVIDERS_KEY];
    keys.extend(Integration::ALL.iter().map(|i| i.key()));
    keys
}

/// Key/value section storage
#[async_trait]
pub trait Store: Send + Sync {
    /// Read the given sections; keys with no stored value are omitted
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>>;

    /// Write whole sections, replacing any previous value
    async fn set(&self, entries: Map<String, Value>) -> Result<()>;

    /// Human-readable backend name (for logging)
    fn name(&self) -> &str;
}

/// Read one raw section
pub async fn get_section(store: &dyn Store, key: &str) -> Result<Option<Value>> {
    let mut values = store.get(&[key]).await?;
    Ok(values.remove(key).filter(|v| !v.is_null()))
}

/// Write one raw section
pub async fn set_section(store: &dyn Store, key: &str, value: Value) -> Result<()> {
    debug!("Writing section '{}' to {}", key, store.name());
    let mut entries = Map::new();
    entries.insert(key.to_string(), value);
    store.set(entries).await
}

/// Load settings; a missing section or one that is not an object yields defaults
///
/// Fields are decoded one by one, so a single odd value only resets itself.
pub async fn load_settings(store: &dyn Store) -> Result<Settings> {
    Ok(match get_section(store, SETTINGS_KEY).await? {
        Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
            warn!("Stored settings are malformed, using defaults: {}", e);
            Settings::default()
        }),
        None => Settings::default(),
    })
}

pub async fn save_settings(store: &dyn Store, settings: &Settings) -> Result<()> {
    set_section(store, SETTINGS_KEY, serde_json::to_value(settings)?).await
}

/// A stored list decoded entry by entry
///
/// Entries that do not decode are kept verbatim with their original
/// positions and written back in place. Merges only append, so the recorded
/// positions stay valid.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredList<T> {
    pub items: Vec<T>,
    pub undecoded: Vec<(usize, Value)>,
}

impl<T> Default for StoredList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            undecoded: Vec::new(),
        }
    }
}

impl<T: Serialize + DeserializeOwned> StoredList<T> {
    pub fn decode(values: Vec<Value>) -> Self {
        let mut list = Self::default();
        for (index, value) in values.into_iter().enumerate() {
            match serde_json::from_value(value.clone()) {
                Ok(item) => list.items.push(item),
                Err(_) => list.undecoded.push((index, value)),
            }
        }
        list
    }

    pub fn encode(&self) -> Result<Value> {
        let mut values: Vec<Value> = Vec::with_capacity(self.items.len() + self.undecoded.len());
        let mut raw = self.undecoded.iter().peekable();
        for item in &self.items {
            while let Some((_, value)) = raw.next_if(|(index, _)| *index <= values.len()) {
                values.push(value.clone());
            }
            values.push(serde_json::to_value(item)?);
        }
        values.extend(raw.map(|(_, value)| value.clone()));
        Ok(Value::Array(values))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.undecoded.is_empty()
    }
}

/// Load the provider list with undecodable entries kept aside
///
/// Returns `None` when the stored section is not a list.
pub async fn load_provider_list(
    store: &dyn Store,
) -> Result<Option<StoredList<SearchProvider>>> {
    match get_section(store, SEARCH_PROVIDERS_KEY).await? {
        None => Ok(Some(StoredList::default())),
        Some(Value::Array(items)) => {
            let list = StoredList::decode(items);
            if !list.undecoded.is_empty() {
                warn!(
                    "{} stored search provider(s) could not be read and are kept as they are",
                    list.undecoded.len()
                );
            }
            Ok(Some(list))
        }
        Some(_) => {
            warn!("Stored search providers are not a list");
            Ok(None)
        }
    }
}

pub async fn save_provider_list(
    store: &dyn Store,
    list: &StoredList<SearchProvider>,
) -> Result<()> {
    set_section(store, SEARCH_PROVIDERS_KEY, list.encode()?).await
}

/// Load the readable providers
pub async fn load_providers(store: &dyn Store) -> Result<Vec<SearchProvider>> {
    Ok(load_provider_list(store)
        .await?
        .map(|list| list.items)
        .unwrap_or_default())
}

pub async fn save_providers(store: &dyn Store, providers: &[SearchProvider]) -> Result<()> {
    set_section(store, SEARCH_PROVIDERS_KEY, serde_json::to_value(providers)?).await
}

/// One integration's stored section, decoded field by field
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecialSection {
    pub config: Option<Map<String, Value>>,
    pub queries: StoredList<Query>,
    /// Stored fields that were not read, written back unchanged
    pub unread: Map<String, Value>,
}

impl SpecialSection {
    /// Decode a stored section; `None` when it is not an object
    pub fn from_stored(value: Option<Value>) -> Option<Self> {
        let mut fields = match value {
            None => return Some(Self::default()),
            Some(Value::Object(fields)) => fields,
            Some(_) => return None,
        };

        let mut section = Self::default();
        match fields.remove("config") {
            Some(Value::Object(config)) => section.config = Some(config),
            None | Some(Value::Null) => {}
            Some(other) => {
                section.unread.insert("config".to_string(), other);
            }
        }
        match fields.remove("queries") {
            Some(Value::Array(items)) => section.queries = StoredList::decode(items),
            None | Some(Value::Null) => {}
            Some(other) => {
                section.unread.insert("queries".to_string(), other);
            }
        }
        section.unread.extend(fields);
        Some(section)
    }

    pub fn to_value(&self) -> Result<Value> {
        let mut fields = self.unread.clone();
        if !fields.contains_key("config") {
            fields.insert(
                "config".to_string(),
                self.config.clone().map(Value::Object).unwrap_or(Value::Null),
            );
        }
        if !fields.contains_key("queries") {
            fields.insert("queries".to_string(), self.queries.encode()?);
        }
        Ok(Value::Object(fields))
    }

    /// The readable part of the section
    pub fn into_data(self) -> SpecialProviderData {
        SpecialProviderData {
            config: self.config,
            queries: self.queries.items,
        }
    }
}

/// Load one integration's section; `None` when the stored value is not an object
pub async fn load_special_section(
    store: &dyn Store,
    integration: Integration,
) -> Result<Option<SpecialSection>> {
    let section = SpecialSection::from_stored(get_section(store, integration.key()).await?);
    match &section {
        None => warn!("Stored {} data is not an object", integration),
        Some(section) if !section.unread.is_empty() || !section.queries.undecoded.is_empty() => {
            warn!(
                "Parts of the stored {} data could not be read and are kept as they are",
                integration
            )
        }
        Some(_) => {}
    }
    Ok(section)
}

pub async fn save_special_section(
    store: &dyn Store,
    integration: Integration,
    section: &SpecialSection,
) -> Result<()> {
    set_section(store, integration.key(), section.to_value()?).await
}

/// Load the readable part of one integration's state
pub async fn load_special(
    store: &dyn Store,
    integration: Integration,
) -> Result<SpecialProviderData> {
    Ok(load_special_section(store, integration)
        .await?
        .map(SpecialSection::into_data)
        .unwrap_or_default())
}

pub async fn save_special(
    store: &dyn Store,
    integration: Integration,
    data: &SpecialProviderData,
) -> Result<()> {
    set_section(store, integration.key(), serde_json::to_value(data)?).await
}

pub async fn load_sync_record(store: &dyn Store) -> Result<Option<SyncRecord>> {
    Ok(get_section(store, LAST_SYNC_KEY)
        .await?
        .and_then(|value| serde_json::from_value(value).ok()))
}

pub async fn save_sync_record(store: &dyn Store, record: &SyncRecord) -> Result<()> {
    set_section(store, LAST_SYNC_KEY, serde_json::to_value(record)?).await
}
