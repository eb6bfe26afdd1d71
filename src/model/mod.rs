// src/model/mod.rs

//! Typed configuration records
//!
//! Each persisted section deserializes into one of these types. Field names
//! follow the keyed form produced by the [`wire`](crate::wire) mapping tables,
//! so a decoded wire row deserializes directly.
//!
//! Decoding is lenient per field: a value of an unexpected type falls back
//! for that field alone, so one odd value never discards a whole record.

mod policy;
mod provider;
mod record;
mod settings;
mod special;

pub use policy::{MergePolicy, Policies, SpecialPolicy};
pub use provider::{RenameRule, SearchProvider};
pub use record::SyncRecord;
pub use settings::{BasicSettings, Group, Settings};
pub use special::{Integration, Query, SpecialProviderData};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::wire;

/// Read an opaque value as text
///
/// Strings pass through, other scalars are printed, `null` is empty. Objects
/// and arrays become their JSON text.
pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opaque_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// Like [`text`], but `null` stays unset
pub(crate) fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opaque_text(Value::deserialize(deserializer)?))
}

fn opaque_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Read a flag the way the wire format coerces booleans
pub(crate) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(wire::coerce_bool(&Value::deserialize(deserializer)?))
}

/// Decode a nested value, falling back to the default when it does not fit
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    Ok(serde_json::from_value(Value::deserialize(deserializer)?).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Sample {
        #[serde(deserialize_with = "text")]
        label: String,
        #[serde(deserialize_with = "optional_text")]
        value: Option<String>,
        #[serde(deserialize_with = "flag")]
        enabled: bool,
        #[serde(deserialize_with = "or_default")]
        items: Vec<u32>,
    }

    #[test]
    fn test_lenient_fields() {
        let sample: Sample = serde_json::from_value(json!({
            "label": 42,
            "value": false,
            "enabled": "true",
            "items": "oops"
        }))
        .unwrap();
        assert_eq!(sample.label, "42");
        assert_eq!(sample.value.as_deref(), Some("false"));
        assert!(sample.enabled);
        assert!(sample.items.is_empty());

        let sample: Sample =
            serde_json::from_value(json!({"label": null, "value": null, "enabled": 1})).unwrap();
        assert_eq!(sample.label, "");
        assert_eq!(sample.value, None);
        assert!(!sample.enabled);
    }
}
