// src/model/settings.rs

//! Persisted settings section

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::policy::{MergePolicy, Policies, SpecialPolicy};
use super::special::Integration;
use super::{flag, optional_text, or_default, text};
use crate::groups::GROUP_SLOTS;
use crate::wire;

/// A group slot: a name and whether its submenu is shown
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Group {
    #[serde(deserialize_with = "text")]
    pub name: String,
    #[serde(deserialize_with = "flag")]
    pub enabled: bool,
}

impl Group {
    pub fn new(name: &str, enabled: bool) -> Self {
        Self {
            name: name.to_string(),
            enabled,
        }
    }

    /// Slots 0 and 1 start enabled, slot 2 starts disabled
    pub fn initial(index: usize, name: &str) -> Self {
        Self::new(name, index < 2)
    }
}

/// The five fields carried by a document's `config` row
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BasicSettings {
    #[serde(rename = "configURL", deserialize_with = "text")]
    pub config_url: String,
    #[serde(deserialize_with = "flag")]
    pub use_groups: bool,
    #[serde(deserialize_with = "flag")]
    pub config_encrypted: bool,
    #[serde(deserialize_with = "optional_text")]
    pub encryption_key: Option<String>,
    #[serde(deserialize_with = "flag")]
    pub auto_update: bool,
}

impl BasicSettings {
    /// Decode a positional `config` row
    pub fn from_wire(row: &[Value]) -> Option<Self> {
        let record = wire::array_to_object(row, wire::BASIC_SETTINGS);
        serde_json::from_value(Value::Object(record)).ok()
    }

    /// Encode as a positional `config` row
    pub fn to_wire(&self) -> Value {
        let record = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        Value::Array(wire::object_to_array(&record, wire::BASIC_SETTINGS))
    }
}

/// The `settings` section
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    #[serde(rename = "configURL", deserialize_with = "text")]
    pub config_url: String,
    /// Doubles as the "merge groups" switch for incoming documents
    #[serde(deserialize_with = "flag")]
    pub use_groups: bool,
    #[serde(deserialize_with = "flag")]
    pub config_encrypted: bool,
    #[serde(deserialize_with = "optional_text")]
    pub encryption_key: Option<String>,
    #[serde(deserialize_with = "flag")]
    pub auto_update: bool,
    #[serde(deserialize_with = "group_slots")]
    pub groups: Vec<Group>,
    #[serde(deserialize_with = "or_default")]
    pub policies: Policies,
}

/// Group list where each slot decodes on its own; a slot that is not an
/// object keeps its position as an empty, disabled group
fn group_slots<'de, D>(deserializer: D) -> Result<Vec<Group>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(slots) => slots
            .into_iter()
            .map(|slot| serde_json::from_value(slot).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}

impl Settings {
    pub fn basic(&self) -> BasicSettings {
        BasicSettings {
            config_url: self.config_url.clone(),
            use_groups: self.use_groups,
            config_encrypted: self.config_encrypted,
            encryption_key: self.encryption_key.clone(),
            auto_update: self.auto_update,
        }
    }

    /// Overwrite every basic field
    pub fn apply_basic(&mut self, basic: &BasicSettings) {
        self.config_url = basic.config_url.clone();
        self.use_groups = basic.use_groups;
        self.config_encrypted = basic.config_encrypted;
        self.encryption_key = basic.encryption_key.clone();
        self.auto_update = basic.auto_update;
    }

    /// Configured password, treating an empty string as unset
    pub fn password(&self) -> Option<&str> {
        self.encryption_key.as_deref().filter(|k| !k.is_empty())
    }

    pub fn special_policy(&self, integration: Integration) -> SpecialPolicy {
        match integration {
            Integration::Cbc => self.policies.cbc,
            Integration::Nwi => self.policies.nwi,
            Integration::Rsa => self.policies.rsa,
        }
    }

    pub fn special_policy_mut(&mut self, integration: Integration) -> &mut SpecialPolicy {
        match integration {
            Integration::Cbc => &mut self.policies.cbc,
            Integration::Nwi => &mut self.policies.nwi,
            Integration::Rsa => &mut self.policies.rsa,
        }
    }

    pub fn search_provider_policy(&self) -> MergePolicy {
        self.policies.search_providers
    }

    /// Pad or truncate the group list to exactly [`GROUP_SLOTS`] entries
    pub fn normalize_groups(&mut self) {
        self.groups.truncate(GROUP_SLOTS);
        while self.groups.len() < GROUP_SLOTS {
            self.groups.push(Group::new("", false));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_basic_from_wire() {
        let row = json!(["https://cfg.example/c.json", "true", true, null, false]);
        let basic = BasicSettings::from_wire(row.as_array().unwrap()).unwrap();
        assert_eq!(basic.config_url, "https://cfg.example/c.json");
        assert!(basic.use_groups);
        assert!(basic.config_encrypted);
        assert_eq!(basic.encryption_key, None);
        assert!(!basic.auto_update);
    }

    #[test]
    fn test_basic_wire_round_trip() {
        let basic = BasicSettings {
            config_url: "https://a.example".to_string(),
            use_groups: true,
            config_encrypted: false,
            encryption_key: Some("pw".to_string()),
            auto_update: true,
        };
        let row = basic.to_wire();
        assert_eq!(row, json!(["https://a.example", true, false, "pw", true]));
        assert_eq!(BasicSettings::from_wire(row.as_array().unwrap()).unwrap(), basic);
    }

    #[test]
    fn test_basic_reads_numeric_key_as_text() {
        let row = json!(["https://a.example", true, true, 1234, true]);
        let basic = BasicSettings::from_wire(row.as_array().unwrap()).unwrap();
        assert_eq!(basic.encryption_key.as_deref(), Some("1234"));
        assert!(basic.auto_update);
    }

    #[test]
    fn test_settings_survive_one_bad_field() {
        let settings: Settings = serde_json::from_value(json!({
            "configURL": "https://mine.example/c.json",
            "encryptionKey": "pw",
            "configEncrypted": true,
            "groups": null,
            "policies": "nonsense"
        }))
        .unwrap();
        assert_eq!(settings.config_url, "https://mine.example/c.json");
        assert_eq!(settings.password(), Some("pw"));
        assert!(settings.config_encrypted);
        assert!(settings.groups.is_empty());
        assert_eq!(settings.policies, Policies::default());
    }

    #[test]
    fn test_group_slots_keep_positions() {
        let settings: Settings = serde_json::from_value(json!({
            "groups": [{"name": "A", "enabled": "true"}, 7, {"name": null, "enabled": true}]
        }))
        .unwrap();
        assert_eq!(
            settings.groups,
            vec![Group::new("A", true), Group::default(), Group::new("", true)]
        );
    }

    #[test]
    fn test_settings_serde_defaults() {
        let settings: Settings = serde_json::from_value(json!({
            "configURL": "https://a.example",
            "groups": [{"name": "Intel", "enabled": true}]
        }))
        .unwrap();
        assert_eq!(settings.config_url, "https://a.example");
        assert_eq!(settings.groups.len(), 1);
        assert_eq!(settings.search_provider_policy(), MergePolicy::Merge);
        assert_eq!(settings.password(), None);
    }

    #[test]
    fn test_empty_password_is_unset() {
        let settings = Settings {
            encryption_key: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(settings.password(), None);
    }

    #[test]
    fn test_normalize_groups() {
        let mut settings = Settings {
            groups: vec![Group::new("a", true); 5],
            ..Default::default()
        };
        settings.normalize_groups();
        assert_eq!(settings.groups.len(), 3);

        settings.groups.truncate(1);
        settings.normalize_groups();
        assert_eq!(settings.groups[2], Group::new("", false));
    }
}
