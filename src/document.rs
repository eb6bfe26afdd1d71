// src/document.rs

//! Decoding of fetched configuration documents
//!
//! The document is only partly trusted: a block with the wrong shape is
//! treated as absent, and an unusable record inside a block is skipped, so one
//! bad row never sinks the whole synchronization.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{BasicSettings, Integration, Query, RenameRule, SearchProvider};
use crate::wire;

/// One integration's block (`"CBC": {"Config": {...}, "Queries": [...]}`)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecialBlock {
    pub config: Option<Map<String, Value>>,
    pub queries: Option<Vec<Query>>,
}

/// A decoded configuration document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigDocument {
    /// First `config` row, if the block is non-empty and decodable
    pub basic: Option<BasicSettings>,
    /// Group names by position; `None` where the position holds no usable pair
    pub groups: Vec<Option<String>>,
    /// `None` when the document has no `searchproviders` array
    pub search_providers: Option<Vec<SearchProvider>>,
    pub rename_rules: Vec<RenameRule>,
    pub cbc: SpecialBlock,
    pub nwi: SpecialBlock,
    pub rsa: SpecialBlock,
}

impl ConfigDocument {
    /// Parse document text; fails only when the text is not a JSON object
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| Error::MalformedDocument(e.to_string()))?;
        if !value.is_object() {
            return Err(Error::MalformedDocument(
                "top-level value is not an object".to_string(),
            ));
        }
        Ok(Self::from_value(&value))
    }

    /// Decode an already-parsed document value
    pub fn from_value(value: &Value) -> Self {
        let empty = Map::new();
        let root = value.as_object().unwrap_or(&empty);

        let basic = root
            .get("config")
            .and_then(Value::as_array)
            .and_then(|rows| rows.first())
            .and_then(|row| {
                let decoded = row.as_array().and_then(|r| BasicSettings::from_wire(r));
                if decoded.is_none() {
                    warn!("Ignoring malformed config row in document");
                }
                decoded
            });

        let groups = root
            .get("groups")
            .and_then(Value::as_array)
            .map(|pairs| pairs.iter().map(wire::group_name).collect())
            .unwrap_or_default();

        let search_providers = root
            .get("searchproviders")
            .and_then(Value::as_array)
            .map(|rows| decode_rows(rows, "search provider", SearchProvider::from_wire));

        let rename_rules = root
            .get("update")
            .and_then(|update| update.get("providers"))
            .and_then(Value::as_array)
            .map(|rules| {
                rules
                    .iter()
                    .filter_map(|rule| match serde_json::from_value(rule.clone()) {
                        Ok(rule) => Some(rule),
                        Err(e) => {
                            warn!("Skipping malformed provider update rule: {}", e);
                            None
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        let block = |integration: Integration| {
            root.get(integration.key())
                .map(decode_special)
                .unwrap_or_default()
        };

        Self {
            basic,
            groups,
            search_providers,
            rename_rules,
            cbc: block(Integration::Cbc),
            nwi: block(Integration::Nwi),
            rsa: block(Integration::Rsa),
        }
    }

    pub fn special(&self, integration: Integration) -> &SpecialBlock {
        match integration {
            Integration::Cbc => &self.cbc,
            Integration::Nwi => &self.nwi,
            Integration::Rsa => &self.rsa,
        }
    }

    /// Whether the `groups` block has any entries
    pub fn has_groups(&self) -> bool {
        !self.groups.is_empty()
    }
}

fn decode_special(value: &Value) -> SpecialBlock {
    let config = value.get("Config").and_then(Value::as_object).cloned();
    let queries = value
        .get("Queries")
        .and_then(Value::as_array)
        .map(|rows| decode_rows(rows, "query", Query::from_wire));
    SpecialBlock { config, queries }
}

fn decode_rows<T>(rows: &[Value], what: &str, decode: fn(&Value) -> Option<T>) -> Vec<T> {
    let decoded: Vec<T> = rows.iter().filter_map(decode).collect();
    if decoded.len() != rows.len() {
        warn!(
            "Skipped {} malformed {} row(s) in document",
            rows.len() - decoded.len(),
            what
        );
    }
    debug!("Decoded {} {} row(s)", decoded.len(), what);
    decoded
}

/// Normalize CRLF and lone CR line endings to LF
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_document() {
        let doc = ConfigDocument::from_value(&json!({
            "config": [["https://cfg.example/c.json", true, false, null, true]],
            "groups": [["1", "Intel"], ["2", "Hunting"], ["3", "Misc"]],
            "searchproviders": [[null, "A", "http://a.com/x", true, true, 1, false, null, false, null]],
            "update": {"providers": [{"target": ["a.com"], "link": "http://b.com/x"}]},
            "CBC": {"Config": {"url": "https://cb.example"}, "Queries": [[null, "Q", "q:1", true]]},
            "NWI": {"Config": {}},
        }));

        assert!(doc.basic.as_ref().unwrap().use_groups);
        assert_eq!(doc.groups.len(), 3);
        assert_eq!(doc.groups[1].as_deref(), Some("Hunting"));
        assert_eq!(doc.search_providers.as_ref().unwrap().len(), 1);
        assert_eq!(doc.rename_rules.len(), 1);
        assert_eq!(doc.cbc.queries.as_ref().unwrap()[0].query, "q:1");
        assert!(doc.nwi.config.is_some());
        assert!(doc.nwi.queries.is_none());
        assert_eq!(doc.rsa, SpecialBlock::default());
    }

    #[test]
    fn test_wrong_shapes_are_absent() {
        let doc = ConfigDocument::from_value(&json!({
            "config": "nope",
            "groups": {"1": "x"},
            "searchproviders": {"a": 1},
            "update": {"providers": "x"},
            "CBC": {"Config": [], "Queries": {}},
        }));
        assert_eq!(doc, ConfigDocument::default());
    }

    #[test]
    fn test_bad_rows_are_skipped() {
        let doc = ConfigDocument::from_value(&json!({
            "searchproviders": [
                "garbage",
                [null, "A", "http://a.com", true, true, 0, false, null, false, null],
                [null, "B", "http://b.com", true, true, "bad", false, null, false, null]
            ],
            "update": {"providers": [{"target": "not-a-list"}, {"target": ["x"], "label": "X"}]}
        }));
        let providers = doc.search_providers.unwrap();
        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].label, "A");
        assert_eq!(doc.rename_rules.len(), 1);
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(matches!(
            ConfigDocument::parse("[1,2,3]"),
            Err(Error::MalformedDocument(_))
        ));
        assert!(matches!(
            ConfigDocument::parse("{not json"),
            Err(Error::MalformedDocument(_))
        ));
        assert!(ConfigDocument::parse("{}").is_ok());
    }

    #[test]
    fn test_empty_groups_block() {
        let doc = ConfigDocument::from_value(&json!({"groups": []}));
        assert!(!doc.has_groups());
    }

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\n"), "a\nb\nc\n");
    }
}
