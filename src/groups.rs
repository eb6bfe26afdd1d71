// src/groups.rs

//! Group membership bitmask
//!
//! Bit `i` set means "belongs to group slot `i`". Slots are positional, so the
//! bit position is the slot index in `Settings::groups`; there is no separate
//! group identifier.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

use crate::model::{Group, SearchProvider};

/// Number of group slots the menu exposes
pub const GROUP_SLOTS: usize = 3;

/// Membership bitmask for a search provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GroupMask(u32);

impl GroupMask {
    /// Member of no group
    pub const NONE: GroupMask = GroupMask(0);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Build a mask from slot indices; indices past the mask width are ignored
    pub fn from_slots(slots: impl IntoIterator<Item = usize>) -> Self {
        let mut mask = Self::NONE;
        for slot in slots {
            mask.insert(slot);
        }
        mask
    }

    pub fn contains(&self, slot: usize) -> bool {
        slot < u32::BITS as usize && self.0 & (1 << slot) != 0
    }

    pub fn insert(&mut self, slot: usize) {
        if slot < u32::BITS as usize {
            self.0 |= 1 << slot;
        }
    }

    pub fn remove(&mut self, slot: usize) {
        if slot < u32::BITS as usize {
            self.0 &= !(1 << slot);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Slot indices set in this mask, ascending
    pub fn slots(&self) -> impl Iterator<Item = usize> + '_ {
        (0..u32::BITS as usize).filter(move |slot| self.contains(*slot))
    }
}

impl fmt::Display for GroupMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for GroupMask {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.0)
    }
}

impl<'de> Deserialize<'de> for GroupMask {
    /// Accepts integers, numeric strings and null (no groups); documents are
    /// hand-edited and not always consistent about the type.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MaskVisitor;

        impl<'de> Visitor<'de> for MaskVisitor {
            type Value = GroupMask;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a group bitmask as integer or numeric string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<GroupMask, E> {
                u32::try_from(v)
                    .map(GroupMask)
                    .map_err(|_| E::custom(format!("group mask out of range: {v}")))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<GroupMask, E> {
                u32::try_from(v)
                    .map(GroupMask)
                    .map_err(|_| E::custom(format!("group mask out of range: {v}")))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<GroupMask, E> {
                if v.fract() == 0.0 && v >= 0.0 && v <= u32::MAX as f64 {
                    Ok(GroupMask(v as u32))
                } else {
                    Err(E::custom(format!("group mask out of range: {v}")))
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<GroupMask, E> {
                let trimmed = v.trim();
                if trimmed.is_empty() {
                    return Ok(GroupMask::NONE);
                }
                trimmed
                    .parse::<u32>()
                    .map(GroupMask)
                    .map_err(|_| E::custom(format!("invalid group mask: {v}")))
            }

            fn visit_unit<E: de::Error>(self) -> Result<GroupMask, E> {
                Ok(GroupMask::NONE)
            }

            fn visit_none<E: de::Error>(self) -> Result<GroupMask, E> {
                Ok(GroupMask::NONE)
            }
        }

        deserializer.deserialize_any(MaskVisitor)
    }
}

/// Enabled providers that should appear under group slot `slot`
///
/// Returns nothing when the slot is out of range or the group itself is disabled.
pub fn providers_in_group<'a>(
    providers: &'a [SearchProvider],
    groups: &[Group],
    slot: usize,
) -> Vec<&'a SearchProvider> {
    match groups.get(slot) {
        Some(group) if group.enabled => providers
            .iter()
            .filter(|p| p.enabled && p.group.contains(slot))
            .collect(),
        _ => Vec::new(),
    }
}

/// Enabled providers that belong to no enabled group (shown at the menu root)
pub fn ungrouped_providers<'a>(
    providers: &'a [SearchProvider],
    groups: &[Group],
) -> Vec<&'a SearchProvider> {
    providers
        .iter()
        .filter(|p| p.enabled)
        .filter(|p| {
            !p.group
                .slots()
                .any(|slot| groups.get(slot).is_some_and(|g| g.enabled))
        })
        .collect()
}
