// src/model/special.rs

//! Special-provider integrations: free-form config plus a query list

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::{flag, or_default, text};
use crate::wire;

/// The three built-in query integrations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Integration {
    /// Carbon Black
    Cbc,
    /// NetWitness Investigator
    Nwi,
    /// RSA Security Analytics
    Rsa,
}

impl Integration {
    pub const ALL: [Integration; 3] = [Integration::Cbc, Integration::Nwi, Integration::Rsa];

    /// Document block name and store section key
    pub fn key(&self) -> &'static str {
        match self {
            Integration::Cbc => "CBC",
            Integration::Nwi => "NWI",
            Integration::Rsa => "RSA",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "CBC" => Some(Integration::Cbc),
            "NWI" => Some(Integration::Nwi),
            "RSA" => Some(Integration::Rsa),
            _ => None,
        }
    }
}

impl fmt::Display for Integration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A saved query for a special integration
///
/// Identity for merging is the exact `query` text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Query {
    pub menu_id: Value,
    #[serde(deserialize_with = "text")]
    pub label: String,
    /// Query template, may contain substitution placeholders
    #[serde(deserialize_with = "text")]
    pub query: String,
    #[serde(deserialize_with = "flag")]
    pub enabled: bool,
    /// Earlier texts of this query; only consulted while merging
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "or_default")]
    pub aliases: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct AliasBlock {
    #[serde(default)]
    alias: Vec<String>,
}

impl Query {
    pub fn new(label: &str, query: &str) -> Self {
        Self {
            label: label.to_string(),
            query: query.to_string(),
            enabled: true,
            ..Default::default()
        }
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = Some(aliases.iter().map(|a| a.to_string()).collect());
        self
    }

    /// Whether `text` is one of this query's earlier texts
    pub fn has_alias(&self, text: &str) -> bool {
        self.aliases
            .as_ref()
            .is_some_and(|aliases| aliases.iter().any(|alias| alias == text))
    }

    /// Decode a positional `Queries` row, including a trailing alias object
    pub fn from_wire(row: &Value) -> Option<Self> {
        let row = row.as_array()?;
        let record = wire::array_to_object(row, wire::QUERY);
        let mut query: Query = serde_json::from_value(Value::Object(record)).ok()?;
        query.aliases = row
            .get(wire::QUERY_ALIAS_POSITION)
            .and_then(|block| serde_json::from_value::<AliasBlock>(block.clone()).ok())
            .map(|block| block.alias);
        Some(query)
    }

    /// Encode as a positional `Queries` row
    pub fn to_wire(&self) -> Value {
        let record = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        let mut row = wire::object_to_array(&record, wire::QUERY);
        if let Some(aliases) = &self.aliases {
            let mut block = Map::new();
            block.insert(
                "alias".to_string(),
                Value::Array(aliases.iter().cloned().map(Value::String).collect()),
            );
            row.push(Value::Object(block));
        }
        Value::Array(row)
    }
}

/// Persisted state of one integration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialProviderData {
    /// Opaque key/value configuration; `None` when nothing has been stored yet
    pub config: Option<Map<String, Value>>,
    pub queries: Vec<Query>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integration_keys() {
        let keys: Vec<_> = Integration::ALL.iter().map(|i| i.key()).collect();
        assert_eq!(keys, vec!["CBC", "NWI", "RSA"]);
        assert_eq!(Integration::parse("nwi"), Some(Integration::Nwi));
        assert_eq!(Integration::parse("XYZ"), None);
    }

    #[test]
    fn test_query_with_alias_block() {
        let row = json!([null, "Process", "process_name:TESTSEARCH", true, {"alias": ["process:TESTSEARCH"]}]);
        let query = Query::from_wire(&row).unwrap();
        assert_eq!(query.query, "process_name:TESTSEARCH");
        assert!(query.has_alias("process:TESTSEARCH"));
        assert!(!query.has_alias("process_name:TESTSEARCH"));
        assert_eq!(query.to_wire(), row);
    }

    #[test]
    fn test_query_without_alias_block() {
        let row = json!([2, "Hash", "md5:TESTSEARCH", false]);
        let query = Query::from_wire(&row).unwrap();
        assert_eq!(query.aliases, None);
        assert_eq!(query.to_wire(), row);
    }

    #[test]
    fn test_malformed_alias_block_is_ignored() {
        let row = json!([null, "Hash", "md5:X", true, "not an object"]);
        let query = Query::from_wire(&row).unwrap();
        assert_eq!(query.aliases, None);
    }

    #[test]
    fn test_stored_query_with_string_flag() {
        let query: Query = serde_json::from_value(json!({
            "menuId": null,
            "label": "Hash",
            "query": "md5:X",
            "enabled": "true",
            "aliases": "junk"
        }))
        .unwrap();
        assert!(query.enabled);
        assert_eq!(query.aliases, None);
    }

    #[test]
    fn test_persisted_shape() {
        let data = SpecialProviderData {
            config: None,
            queries: vec![Query::new("a", "b")],
        };
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["config"], Value::Null);
        assert!(value["queries"][0].get("aliases").is_none());
        let back: SpecialProviderData = serde_json::from_value(value).unwrap();
        assert_eq!(back, data);
    }
}
