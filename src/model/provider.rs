// src/model/provider.rs

//! Search providers and provider rename rules

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{flag, optional_text, or_default, text};
use crate::groups::GroupMask;
use crate::wire;

/// A search-provider menu entry
///
/// Identity for merging is the exact `link` string.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchProvider {
    /// Assigned when the menu is rendered; carried through untouched
    pub menu_id: Value,
    #[serde(deserialize_with = "text")]
    pub label: String,
    /// Target link template, may contain substitution placeholders
    #[serde(deserialize_with = "text")]
    pub link: String,
    #[serde(deserialize_with = "flag")]
    pub enabled: bool,
    /// Came from a configuration document rather than the user
    #[serde(deserialize_with = "flag")]
    pub from_config: bool,
    #[serde(deserialize_with = "or_default")]
    pub group: GroupMask,
    #[serde(deserialize_with = "flag")]
    pub post_enabled: bool,
    #[serde(deserialize_with = "optional_text")]
    pub post_value: Option<String>,
    #[serde(deserialize_with = "flag")]
    pub proxy_enabled: bool,
    #[serde(deserialize_with = "optional_text")]
    pub proxy_url: Option<String>,
}

impl SearchProvider {
    pub fn new(label: &str, link: &str) -> Self {
        Self {
            label: label.to_string(),
            link: link.to_string(),
            enabled: true,
            ..Default::default()
        }
    }

    /// Decode a positional `searchproviders` row; `None` if it is not a usable row
    pub fn from_wire(row: &Value) -> Option<Self> {
        let row = row.as_array()?;
        let record = wire::array_to_object(row, wire::PROVIDER);
        serde_json::from_value(Value::Object(record)).ok()
    }

    /// Encode as a positional `searchproviders` row
    pub fn to_wire(&self) -> Value {
        let record = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        Value::Array(wire::object_to_array(&record, wire::PROVIDER))
    }
}

/// An `update.providers` entry: rewrite providers whose link contains any target
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenameRule {
    #[serde(rename = "target")]
    pub targets: Vec<String>,
    pub link: Option<String>,
    pub label: Option<String>,
}

impl RenameRule {
    pub fn matches(&self, provider: &SearchProvider) -> bool {
        self.targets
            .iter()
            .filter(|target| !target.is_empty())
            .any(|target| provider.link.contains(target.as_str()))
    }

    /// Apply the rule in place; returns whether the provider changed
    pub fn apply(&self, provider: &mut SearchProvider) -> bool {
        if !self.matches(provider) {
            return false;
        }
        let mut changed = false;
        if let Some(link) = &self.link {
            changed |= provider.link != *link;
            provider.link = link.clone();
        }
        if let Some(label) = &self.label {
            changed |= provider.label != *label;
            provider.label = label.clone();
        }
        changed
    }
}
