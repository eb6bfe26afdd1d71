// src/sync/baseline.rs

//! Immutable snapshot of configuration sections for "undo recent changes"

use serde_json::{Map, Value};
use tracing::info;

use crate::error::Result;
use crate::store::{Store, config_section_keys};

/// Configuration sections as they were at capture time
///
/// Taken once (typically when an editing session starts) and passed around
/// explicitly; restoring writes every captured section back whole.
#[derive(Debug, Clone, PartialEq)]
pub struct Baseline {
    sections: Map<String, Value>,
}

impl Baseline {
    /// Snapshot every configuration section currently in `store`
    pub async fn capture(store: &dyn Store) -> Result<Self> {
        let keys = config_section_keys();
        let sections = store.get(&keys).await?;
        Ok(Self { sections })
    }

    /// Captured value of one section, `None` if it did not exist
    pub fn section(&self, key: &str) -> Option<&Value> {
        self.sections.get(key).filter(|v| !v.is_null())
    }

    /// Sections whose stored value differs from the snapshot
    pub async fn changed_sections(&self, store: &dyn Store) -> Result<Vec<String>> {
        let keys = config_section_keys();
        let current = store.get(&keys).await?;
        Ok(keys
            .into_iter()
            .filter(|key| {
                let before = self.sections.get(*key).filter(|v| !v.is_null());
                let now = current.get(*key).filter(|v| !v.is_null());
                before != now
            })
            .map(str::to_string)
            .collect())
    }

    /// Write the snapshot back
    ///
    /// A section absent at capture time is written as `null`, which every
    /// loader treats as absent.
    pub async fn restore(&self, store: &dyn Store) -> Result<()> {
        let changed = self.changed_sections(store).await?;
        if changed.is_empty() {
            return Ok(());
        }

        let entries: Map<String, Value> = changed
            .iter()
            .map(|key| {
                let value = self.sections.get(key).cloned().unwrap_or(Value::Null);
                (key.clone(), value)
            })
            .collect();
        info!("Restoring {} section(s) from baseline", entries.len());
        store.set(entries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SearchProvider;
    use crate::store::{self as sections, MemoryStore};

    #[tokio::test]
    async fn test_restore_undoes_changes() {
        let store = MemoryStore::new();
        sections::save_providers(&store, &[SearchProvider::new("A", "http://a")])
            .await
            .unwrap();

        let baseline = Baseline::capture(&store).await.unwrap();
        assert!(baseline.changed_sections(&store).await.unwrap().is_empty());

        sections::save_providers(
            &store,
            &[SearchProvider::new("A", "http://a"), SearchProvider::new("B", "http://b")],
        )
        .await
        .unwrap();
        let mut settings = sections::load_settings(&store).await.unwrap();
        settings.config_url = "https://changed.example".to_string();
        sections::save_settings(&store, &settings).await.unwrap();

        assert_eq!(
            baseline.changed_sections(&store).await.unwrap(),
            vec!["settings".to_string(), "searchproviders".to_string()]
        );

        baseline.restore(&store).await.unwrap();
        assert!(baseline.changed_sections(&store).await.unwrap().is_empty());
        assert_eq!(sections::load_providers(&store).await.unwrap().len(), 1);
        assert_eq!(sections::load_settings(&store).await.unwrap().config_url, "");
    }
}
