// src/wire.rs

//! Positional wire format used by exported and remote configuration documents
//!
//! Documents store records as fixed-length arrays of scalars. A mapping table
//! names each position and says whether the value is a boolean (coerced on read)
//! or passed through untouched:
//!
//! ```text
//! [menuId, label, link, enabled, ...]  <->  {"menuId": .., "label": .., "link": .., "enabled": ..}
//! ```
//!
//! Group records are the exception: they are `[slot-number-as-text, name]` pairs.

use serde_json::{Map, Value};

/// How a mapped value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// `true` and `"true"` read as true, everything else as false
    Boolean,
    /// Passed through unchanged
    Opaque,
}

/// One `{position, field, type}` entry of a mapping table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    pub position: usize,
    pub field: &'static str,
    pub kind: FieldType,
}

const fn opaque(position: usize, field: &'static str) -> FieldMapping {
    FieldMapping {
        position,
        field,
        kind: FieldType::Opaque,
    }
}

const fn boolean(position: usize, field: &'static str) -> FieldMapping {
    FieldMapping {
        position,
        field,
        kind: FieldType::Boolean,
    }
}

/// `config` rows: URL, useGroups, encrypted, encryptionKey, autoUpdate
pub const BASIC_SETTINGS: &[FieldMapping] = &[
    opaque(0, "configURL"),
    boolean(1, "useGroups"),
    boolean(2, "configEncrypted"),
    opaque(3, "encryptionKey"),
    boolean(4, "autoUpdate"),
];

/// `searchproviders` rows
pub const PROVIDER: &[FieldMapping] = &[
    opaque(0, "menuId"),
    opaque(1, "label"),
    opaque(2, "link"),
    boolean(3, "enabled"),
    boolean(4, "fromConfig"),
    opaque(5, "group"),
    boolean(6, "postEnabled"),
    opaque(7, "postValue"),
    boolean(8, "proxyEnabled"),
    opaque(9, "proxyUrl"),
];

/// Special-provider `Queries` rows (an optional alias object may follow at position 4)
pub const QUERY: &[FieldMapping] = &[
    opaque(0, "menuId"),
    opaque(1, "label"),
    opaque(2, "query"),
    boolean(3, "enabled"),
];

/// Position of the `{"alias": [...]}` object trailing a query row
pub const QUERY_ALIAS_POSITION: usize = 4;

/// Coerce a wire value to a boolean
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s == "true",
        _ => false,
    }
}

/// Convert a positional row into a keyed record
///
/// Positions past the end of `row` read as `null`.
pub fn array_to_object(row: &[Value], mapping: &[FieldMapping]) -> Map<String, Value> {
    let mut record = Map::with_capacity(mapping.len());
    for entry in mapping {
        let raw = row.get(entry.position).cloned().unwrap_or(Value::Null);
        let value = match entry.kind {
            FieldType::Boolean => Value::Bool(coerce_bool(&raw)),
            FieldType::Opaque => raw,
        };
        record.insert(entry.field.to_string(), value);
    }
    record
}

/// Convert a keyed record into a positional row
///
/// The row is sized to the largest mapped position + 1. Positions with no
/// mapping entry, and mapped fields missing from the record, are `null`.
pub fn object_to_array(record: &Map<String, Value>, mapping: &[FieldMapping]) -> Vec<Value> {
    let len = mapping
        .iter()
        .map(|entry| entry.position + 1)
        .max()
        .unwrap_or(0);
    let mut row = vec![Value::Null; len];
    for entry in mapping {
        if let Some(value) = record.get(entry.field) {
            row[entry.position] = value.clone();
        }
    }
    row
}

/// Build a `[slot, name]` group pair; slots are numbered from 1 on the wire
pub fn group_pair(index: usize, name: &str) -> Value {
    Value::Array(vec![
        Value::String((index + 1).to_string()),
        Value::String(name.to_string()),
    ])
}

/// Read the name out of a `[slot, name]` group pair
pub fn group_name(pair: &Value) -> Option<String> {
    match pair.as_array()?.get(1)? {
        Value::String(name) => Some(name.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
