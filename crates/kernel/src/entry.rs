//! Menu entry data model.

use serde::{Deserialize, Serialize};

/// Locator for the operation behind a menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuTarget {
    /// Action source name as declared (e.g. "Reports").
    pub source: String,

    /// Action name; `None` means the source's implicit default.
    #[serde(default)]
    pub action: Option<String>,

    /// Whether this targets the administrative variant of the action.
    #[serde(default)]
    pub admin: bool,
}

impl MenuTarget {
    /// Target a source's implicit default action.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            action: None,
            admin: false,
        }
    }

    /// Target a named action on a source.
    pub fn for_action(source: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            action: Some(action.into()),
            admin: false,
        }
    }
}

/// A single navigation node.
///
/// Flat entries (the raw list) carry an empty `children` vector; only the
/// tree assembler populates it. `id` values are unique within one raw set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuEntry {
    /// Unique id within one raw entry list.
    pub id: String,

    /// Parent entry id; `None` places the entry at the root.
    #[serde(default)]
    pub parent: Option<String>,

    /// Human-readable display title.
    pub title: String,

    /// Locator for the operation this entry navigates to. Manual entries
    /// that only group children may omit it.
    #[serde(default)]
    pub target: Option<MenuTarget>,

    /// Sibling ordering key; lower weights sort first (default: 0).
    #[serde(default)]
    pub weight: i32,

    /// Nested entries, populated by the tree assembler.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuEntry>,
}

impl MenuEntry {
    /// Create a flat root-level entry with default weight.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent: None,
            title: title.into(),
            target: None,
            weight: 0,
            children: Vec::new(),
        }
    }

    /// Set the parent id.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set the target.
    #[must_use]
    pub fn with_target(mut self, target: MenuTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the sibling ordering weight.
    #[must_use]
    pub fn with_weight(mut self, weight: i32) -> Self {
        self.weight = weight;
        self
    }
}

/// Input for manual menu registration.
///
/// Missing fields are derived or defaulted by the service: `id` from the
/// target via the slug rule, `title` from a humanized action name, `parent`
/// from the configured default parent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewEntry {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub parent: Option<String>,

    #[serde(default)]
    pub target: Option<MenuTarget>,

    #[serde(default)]
    pub weight: i32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn entry_builder() {
        let entry = MenuEntry::new("reports-export", "Download")
            .with_parent("reports")
            .with_target(MenuTarget::for_action("Reports", "export"))
            .with_weight(5);

        assert_eq!(entry.id, "reports-export");
        assert_eq!(entry.parent.as_deref(), Some("reports"));
        assert_eq!(entry.weight, 5);
        assert!(entry.children.is_empty());
    }

    #[test]
    fn flat_entry_serializes_without_children() {
        let entry = MenuEntry::new("reports", "Reports");
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("children"));
    }

    #[test]
    fn entry_roundtrips_with_defaults() {
        let json = r#"{"id": "reports", "title": "Reports"}"#;
        let entry: MenuEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.weight, 0);
        assert!(entry.parent.is_none());
        assert!(entry.target.is_none());
        assert!(entry.children.is_empty());
    }
}
