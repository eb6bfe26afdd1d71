// src/sync/merge.rs

//! Reconciling an incoming document with persisted configuration
//!
//! Each section has its own policy:
//! - basic settings are only replaced under `force_override`
//! - groups are renamed/disabled positionally, or replaced wholesale
//! - providers are renamed by update rules, then merged by link or overridden
//! - special integrations replace their config map and merge queries by text,
//!   following aliases so that upstream edits rewrite rather than duplicate
//!
//! Every section is a separate read-modify-write against the store.

use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::document::{ConfigDocument, SpecialBlock};
use crate::error::Result;
use crate::groups::GROUP_SLOTS;
use crate::model::{Group, Integration, MergePolicy, Query, RenameRule, SearchProvider, Settings};
use crate::store::{self, SpecialSection, Store};

/// Overwrite basic settings from the document under `force_override`
///
/// Returns whether anything was applied.
pub fn merge_basic(settings: &mut Settings, doc: &ConfigDocument, force_override: bool) -> bool {
    match (&doc.basic, force_override) {
        (Some(basic), true) => {
            settings.apply_basic(basic);
            true
        }
        _ => false,
    }
}

/// Reconcile group slots with the document's group names
///
/// Returns whether the group list was touched.
pub fn merge_groups(
    groups: &mut Vec<Group>,
    incoming: &[Option<String>],
    use_groups: bool,
    force_override: bool,
) -> bool {
    if !(force_override || use_groups) || incoming.is_empty() {
        return false;
    }

    if (force_override && incoming.len() >= GROUP_SLOTS) || groups.is_empty() {
        debug!("Replacing group list from document");
        *groups = incoming
            .iter()
            .take(GROUP_SLOTS)
            .enumerate()
            .map(|(index, name)| Group::initial(index, name.as_deref().unwrap_or_default()))
            .collect();
    } else {
        debug!("Merging group names positionally");
        for (index, group) in groups.iter_mut().enumerate() {
            match incoming.get(index) {
                Some(Some(name)) => group.name = name.clone(),
                _ if index < GROUP_SLOTS => group.enabled = false,
                _ => {}
            }
        }
        groups.truncate(GROUP_SLOTS);
    }

    // Slots that still do not exist are added disabled, named from the document
    while groups.len() < GROUP_SLOTS {
        let index = groups.len();
        let name = incoming
            .get(index)
            .cloned()
            .flatten()
            .unwrap_or_default();
        groups.push(Group::new(&name, false));
    }
    true
}

/// Apply provider rename rules in place; returns the number of providers changed
pub fn apply_rename_rules(providers: &mut [SearchProvider], rules: &[RenameRule]) -> usize {
    let mut changed = 0;
    for rule in rules {
        for provider in providers.iter_mut() {
            if rule.apply(provider) {
                changed += 1;
            }
        }
    }
    changed
}

/// Reconcile the provider list under `policy`
pub fn merge_providers(
    existing: Vec<SearchProvider>,
    incoming: &[SearchProvider],
    policy: MergePolicy,
) -> Vec<SearchProvider> {
    match policy {
        MergePolicy::Override => incoming.to_vec(),
        MergePolicy::Merge => {
            let mut merged = existing;
            let mut links: HashSet<String> = merged.iter().map(|p| p.link.clone()).collect();
            for provider in incoming {
                if links.insert(provider.link.clone()) {
                    merged.push(provider.clone());
                }
            }
            merged
        }
        MergePolicy::Keep => existing,
    }
}

/// Reconcile a query list under `policy`
pub fn merge_queries(existing: Vec<Query>, incoming: &[Query], policy: MergePolicy) -> Vec<Query> {
    match policy {
        MergePolicy::Override => incoming.to_vec(),
        MergePolicy::Merge => {
            let mut merged = existing;
            for query in incoming {
                for persisted in merged.iter_mut() {
                    if query.has_alias(&persisted.query) {
                        persisted.query = query.query.clone();
                    }
                }
                if !merged.iter().any(|persisted| persisted.query == query.query) {
                    merged.push(query.clone());
                }
            }
            merged
        }
        MergePolicy::Keep => existing,
    }
}

/// Reconcile one integration's stored section with its document block
///
/// A stored field that could not be read is only replaced by an override;
/// otherwise it is left as it is. Returns whether anything in the block applied.
pub fn merge_special(
    section: &mut SpecialSection,
    block: &SpecialBlock,
    config_override: bool,
    queries_policy: MergePolicy,
) -> bool {
    let mut touched = false;

    if let Some(config) = &block.config {
        let readable = !section.unread.contains_key("config");
        if config_override || (readable && section.config.is_none()) {
            section.unread.remove("config");
            section.config = Some(config.clone());
            touched = true;
        }
    }

    if let Some(queries) = &block.queries {
        let overriding = queries_policy == MergePolicy::Override;
        if overriding || !section.unread.contains_key("queries") {
            section.unread.remove("queries");
            if overriding {
                section.queries.undecoded.clear();
            }
            let existing = std::mem::take(&mut section.queries.items);
            section.queries.items = merge_queries(existing, queries, queries_policy);
            touched = true;
        }
    }

    touched
}

/// Merge a decoded document into the store
///
/// With `force_override`, every policy resolves to "override" and basic
/// settings are replaced. Sections are written back whole, one at a time.
pub async fn apply_incoming_config(
    store: &dyn Store,
    doc: &ConfigDocument,
    force_override: bool,
) -> Result<()> {
    info!(
        "Applying configuration document (force override: {})",
        force_override
    );

    // Settings: basic fields and groups
    let mut settings = store::load_settings(store).await?;
    let basic_applied = merge_basic(&mut settings, doc, force_override);
    let use_groups = settings.use_groups;
    let groups_applied = merge_groups(&mut settings.groups, &doc.groups, use_groups, force_override);
    if basic_applied || groups_applied {
        store::save_settings(store, &settings).await?;
        debug!(
            "Settings updated (basic: {}, groups: {})",
            basic_applied, groups_applied
        );
    }

    // Search providers
    let policy = settings.search_provider_policy().resolve(force_override);
    match store::load_provider_list(store).await? {
        Some(mut list) => {
            let renamed = apply_rename_rules(&mut list.items, &doc.rename_rules);
            match &doc.search_providers {
                Some(incoming) => {
                    let before = list.items.len();
                    if policy == MergePolicy::Override {
                        list.undecoded.clear();
                    }
                    list.items = merge_providers(list.items, incoming, policy);
                    info!(
                        "Search providers: {} -> {} under policy '{}' ({} renamed)",
                        before,
                        list.items.len(),
                        policy,
                        renamed
                    );
                    store::save_provider_list(store, &list).await?;
                }
                None if renamed > 0 => {
                    info!("Renamed {} search provider(s)", renamed);
                    store::save_provider_list(store, &list).await?;
                }
                None => {}
            }
        }
        None if policy == MergePolicy::Override => {
            if let Some(incoming) = &doc.search_providers {
                info!("Replacing unreadable search providers with {}", incoming.len());
                store::save_providers(store, incoming).await?;
            }
        }
        None => warn!("Leaving unreadable search providers untouched"),
    }

    // Special integrations
    for integration in Integration::ALL {
        let block = doc.special(integration);
        if block.config.is_none() && block.queries.is_none() {
            continue;
        }

        let selected = settings.special_policy(integration);
        let config_override = force_override || selected.config_override;
        let queries_policy = selected.queries.resolve(force_override);

        let Some(mut section) = store::load_special_section(store, integration).await? else {
            warn!("Leaving unreadable {} data untouched", integration);
            continue;
        };
        if merge_special(&mut section, block, config_override, queries_policy) {
            debug!(
                "{}: {} queries under policy '{}'",
                integration,
                section.queries.items.len(),
                queries_policy
            );
            store::save_special_section(store, integration, &section).await?;
        }
    }

    Ok(())
}
