// src/sync/export.rs

//! Building a positional document from persisted state

use serde_json::{Map, Value, json};
use tracing::info;

use crate::cipher;
use crate::error::{Error, Result};
use crate::model::{Integration, SearchProvider, Settings, SpecialProviderData};
use crate::store::{self, Store};
use crate::wire;

/// Encode persisted state as a configuration document
pub fn build_document(
    settings: &Settings,
    providers: &[SearchProvider],
    specials: &[(Integration, SpecialProviderData)],
) -> Value {
    let mut root = Map::new();
    root.insert("config".to_string(), json!([settings.basic().to_wire()]));
    root.insert(
        "groups".to_string(),
        Value::Array(
            settings
                .groups
                .iter()
                .enumerate()
                .map(|(index, group)| wire::group_pair(index, &group.name))
                .collect(),
        ),
    );
    root.insert(
        "searchproviders".to_string(),
        Value::Array(providers.iter().map(SearchProvider::to_wire).collect()),
    );

    for (integration, data) in specials {
        let queries: Vec<Value> = data.queries.iter().map(|q| q.to_wire()).collect();
        root.insert(
            integration.key().to_string(),
            json!({
                "Config": data.config.clone().unwrap_or_default(),
                "Queries": queries,
            }),
        );
    }

    Value::Object(root)
}

/// Export the stored configuration as a document value
pub async fn export_document(store: &dyn Store) -> Result<Value> {
    let settings = store::load_settings(store).await?;
    let providers = store::load_providers(store).await?;
    let mut specials = Vec::with_capacity(Integration::ALL.len());
    for integration in Integration::ALL {
        specials.push((integration, store::load_special(store, integration).await?));
    }

    info!(
        "Exporting {} search provider(s) and {} group(s)",
        providers.len(),
        settings.groups.len()
    );
    Ok(build_document(&settings, &providers, &specials))
}

/// Export the stored configuration as pretty-printed JSON text
pub async fn export_json(store: &dyn Store) -> Result<String> {
    Ok(serde_json::to_string_pretty(&export_document(store).await?)?)
}

/// Export encrypted with the configured password
pub async fn export_encrypted(store: &dyn Store) -> Result<String> {
    let settings = store::load_settings(store).await?;
    let password = settings
        .password()
        .ok_or(Error::MissingEncryptionKey)?
        .to_string();
    let text = serde_json::to_string(&export_document(store).await?)?;
    cipher::encrypt(&text, &password)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Group, Query};
    use crate::store::MemoryStore;

    #[test]
    fn test_build_document_shape() {
        let settings = Settings {
            config_url: "https://cfg.example".to_string(),
            use_groups: true,
            groups: vec![Group::new("A", true), Group::new("B", true), Group::new("C", false)],
            ..Default::default()
        };
        let providers = vec![SearchProvider::new("P", "http://p.example/%s")];
        let specials = vec![(
            Integration::Cbc,
            SpecialProviderData {
                config: None,
                queries: vec![Query::new("Q", "q:1")],
            },
        )];

        let doc = build_document(&settings, &providers, &specials);
        assert_eq!(doc["config"], json!([["https://cfg.example", true, false, null, false]]));
        assert_eq!(doc["groups"], json!([["1", "A"], ["2", "B"], ["3", "C"]]));
        assert_eq!(doc["searchproviders"][0][2], json!("http://p.example/%s"));
        assert_eq!(doc["CBC"]["Config"], json!({}));
        assert_eq!(doc["CBC"]["Queries"], json!([[null, "Q", "q:1", true]]));
        assert!(doc.get("update").is_none());
    }

    #[tokio::test]
    async fn test_export_encrypted_requires_password() {
        let store = MemoryStore::new();
        assert!(matches!(
            export_encrypted(&store).await,
            Err(Error::MissingEncryptionKey)
        ));
    }

    #[tokio::test]
    async fn test_export_encrypted_decrypts() {
        let store = MemoryStore::new();
        let settings = Settings {
            encryption_key: Some("s3cret".to_string()),
            ..Default::default()
        };
        store::save_settings(&store, &settings).await.unwrap();

        let encrypted = export_encrypted(&store).await.unwrap();
        let plain = cipher::decrypt(&encrypted, "s3cret").unwrap();
        let value: Value = serde_json::from_str(&plain).unwrap();
        assert_eq!(value, export_document(&store).await.unwrap());
    }
}
