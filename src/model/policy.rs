// src/model/policy.rs

//! Per-section merge policies

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::{flag, or_default};

/// How incoming records reconcile with persisted ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MergePolicy {
    /// Append incoming records whose identity is not already present
    #[default]
    Merge,
    /// Replace the persisted list with the incoming one
    Override,
    /// Leave the persisted list unchanged
    ///
    /// Any unrecognized policy string decodes to this.
    Keep,
}

impl MergePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergePolicy::Merge => "merge",
            MergePolicy::Override => "override",
            MergePolicy::Keep => "keep",
        }
    }

    /// Parse a policy string; unknown values are a no-op policy, never an error
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "merge" => MergePolicy::Merge,
            "override" => MergePolicy::Override,
            _ => MergePolicy::Keep,
        }
    }

    /// `forceOverride` wins over whatever the user selected
    pub fn resolve(self, force_override: bool) -> Self {
        if force_override {
            MergePolicy::Override
        } else {
            self
        }
    }
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for MergePolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MergePolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(match raw {
            None | Some(serde_json::Value::Null) => MergePolicy::default(),
            Some(serde_json::Value::String(s)) => MergePolicy::parse(&s),
            Some(_) => MergePolicy::Keep,
        })
    }
}

/// Policy pair for one special-provider integration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecialPolicy {
    /// Replace the persisted config map on every sync
    #[serde(deserialize_with = "flag")]
    pub config_override: bool,
    /// Policy for the query list
    pub queries: MergePolicy,
}

/// Every merge-policy selector the user can set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Policies {
    pub search_providers: MergePolicy,
    #[serde(deserialize_with = "or_default")]
    pub cbc: SpecialPolicy,
    #[serde(deserialize_with = "or_default")]
    pub nwi: SpecialPolicy,
    #[serde(deserialize_with = "or_default")]
    pub rsa: SpecialPolicy,
}
