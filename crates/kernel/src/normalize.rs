//! Entry normalization.
//!
//! Expands action source declarations into flat menu entries: merges the
//! global and per-source exclusion policies, drops reserved and excluded
//! actions, derives stable ids and display titles, and emits an optional
//! group entry per source. Pure computation, no I/O and no cache access.

use std::collections::HashSet;

use tracing::debug;

use crate::config::MenuConfig;
use crate::entry::{MenuEntry, MenuTarget};
use crate::source::ActionSource;

/// Prefix marking actions as implementation-reserved, never menu-worthy.
const RESERVED_PREFIX: char = '_';

/// Convert text into a lowercase, hyphen-joined, URL-safe slug.
///
/// Non-alphanumeric characters become hyphens; consecutive hyphens collapse
/// and leading/trailing hyphens are trimmed.
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_was_hyphen = true; // start true to skip leading hyphens
    for c in text.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
            prev_was_hyphen = false;
        } else if !prev_was_hyphen {
            out.push('-');
            prev_was_hyphen = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Derive a human-readable title from an action or source name.
///
/// Underscores, hyphens, and camel-case boundaries split words; each word is
/// capitalized. `admin_index` becomes "Admin Index", `UserAccounts` becomes
/// "User Accounts".
pub fn humanize(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in name.chars() {
        if c == '_' || c == '-' || c == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
        } else {
            if c.is_ascii_uppercase() && prev_lower && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
            current.push(c);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|w| capitalize(w))
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Derive the stable entry id for a (source, action) pair.
pub fn entry_id(source: &str, action: &str) -> String {
    format!("{}-{}", slugify(source), slugify(action))
}

/// Merge the global exclusion list with a source's own exclusions into the
/// effective, case-normalized policy.
pub fn effective_exclusions(global: &[String], local: &[String]) -> HashSet<String> {
    global
        .iter()
        .chain(local.iter())
        .map(|a| a.to_lowercase())
        .collect()
}

/// Expand one action source into its flat menu entries.
///
/// Returns nothing when the source's options carry the wildcard exclusion;
/// that check runs before any per-action work.
pub fn normalize_source(config: &MenuConfig, source: &ActionSource) -> Vec<MenuEntry> {
    if source.options.excludes_all() {
        debug!(source = %source.name, "source excluded from menus entirely");
        return Vec::new();
    }

    let exclusions = effective_exclusions(&config.exclude_actions, &source.options.exclude);
    let group_id = slugify(&source.name);
    let admin_marker = config.admin_prefix.as_ref().map(|p| format!("{p}_"));

    let mut entries = Vec::new();
    let mut admin_source = false;

    for action in &source.actions {
        let lower = action.to_lowercase();
        if lower.starts_with(RESERVED_PREFIX) || exclusions.contains(&lower) {
            continue;
        }

        let admin = admin_marker
            .as_deref()
            .is_some_and(|marker| lower.starts_with(marker));
        if admin {
            admin_source = true;
        }

        let title = source
            .options
            .alias
            .get(action)
            .cloned()
            .unwrap_or_else(|| humanize(action));

        // With a group entry, actions nest under the source's own node;
        // otherwise they attach to the source's configured parent.
        let parent = if source.options.group_entry {
            Some(group_id.clone())
        } else {
            source.options.parent.clone()
        };

        entries.push(MenuEntry {
            id: entry_id(&source.name, action),
            parent,
            title,
            target: Some(MenuTarget {
                source: source.name.clone(),
                action: Some(action.clone()),
                admin,
            }),
            weight: 0,
            children: Vec::new(),
        });
    }

    if source.options.group_entry {
        // The group node points at the source's index, preferring the
        // administrative variant when the source exposes admin actions.
        let index_action = match (&config.admin_prefix, admin_source) {
            (Some(prefix), true) => format!("{prefix}_index"),
            _ => "index".to_string(),
        };
        entries.push(MenuEntry {
            id: group_id,
            parent: source.options.parent.clone(),
            title: humanize(&source.name),
            target: Some(MenuTarget {
                source: source.name.clone(),
                action: Some(index_action),
                admin: admin_source,
            }),
            weight: 0,
            children: Vec::new(),
        });
    }

    entries
}

/// Run the normalizer across every declared source.
pub fn discover(config: &MenuConfig, sources: &[ActionSource]) -> Vec<MenuEntry> {
    let mut entries = Vec::new();
    for source in sources {
        entries.extend(normalize_source(config, source));
    }
    debug!(
        sources = sources.len(),
        entries = entries.len(),
        "raw menu entries discovered"
    );
    entries
}
