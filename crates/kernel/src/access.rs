//! Principals, the authorization predicate, and permission filtering.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::MenuConfig;
use crate::entry::MenuEntry;
use crate::error::MenuResult;

/// Identity a menu is built for: a type tag plus an identifier value, e.g.
/// `("role", "4")` or `("group", "editors")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    /// Principal kind ("user", "role", "group", ...).
    pub kind: String,

    /// Identifier within the kind.
    pub id: String,
}

impl Principal {
    /// Create a principal.
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Stable cache-key fragment. Kind and id are joined with a separator
    /// so neither kinds sharing numeric ids nor kind/id boundary shifts
    /// (`("role", "12")` vs `("role1", "2")`) can collide.
    pub fn cache_suffix(&self) -> String {
        format!("{}:{}", self.kind, self.id)
    }
}

/// The authorization predicate, injected by the host.
#[async_trait]
pub trait AccessPolicy: Send + Sync {
    /// Whether `principal` may access the resource named by `resource`.
    ///
    /// An `Err` means the check itself failed and aborts the build; a plain
    /// denial is `Ok(false)`.
    async fn can_access(&self, principal: &Principal, resource: &str) -> anyhow::Result<bool>;
}

/// Derive the resource identifier an entry is authorized against.
///
/// This is the sole bridge between menu entries and the access policy:
/// `{acl_path}/{source}`, suffixed with `{acl_separator}{action}` when the
/// target names an explicit action. `controllers/Reports/export` for the
/// `export` action of source `Reports` under the default config.
///
/// Entries without a target (manual grouping nodes) have no resource
/// identifier and are not access-gated.
pub fn resource_id(config: &MenuConfig, entry: &MenuEntry) -> Option<String> {
    let target = entry.target.as_ref()?;
    let mut resource = format!("{}/{}", config.acl_path, target.source);
    if let Some(action) = &target.action {
        resource.push(config.acl_separator);
        resource.push_str(action);
    }
    Some(resource)
}

/// Retain the entries `principal` is authorized for.
///
/// The predicate is evaluated exactly once per entry and input order is
/// preserved; result caching belongs to the service layer, not here.
pub async fn filter_entries(
    config: &MenuConfig,
    policy: &dyn AccessPolicy,
    principal: &Principal,
    entries: Vec<MenuEntry>,
) -> MenuResult<Vec<MenuEntry>> {
    let mut kept = Vec::with_capacity(entries.len());
    for entry in entries {
        match resource_id(config, &entry) {
            None => kept.push(entry),
            Some(resource) => {
                if policy.can_access(principal, &resource).await? {
                    kept.push(entry);
                }
            }
        }
    }
    Ok(kept)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::entry::MenuTarget;

    struct DenyExport;

    #[async_trait]
    impl AccessPolicy for DenyExport {
        async fn can_access(&self, _principal: &Principal, resource: &str) -> anyhow::Result<bool> {
            Ok(resource != "controllers/Reports/export")
        }
    }

    #[test]
    fn principal_cache_suffix_separates_kinds() {
        assert_ne!(
            Principal::new("role", "1").cache_suffix(),
            Principal::new("group", "1").cache_suffix()
        );
    }

    #[test]
    fn principal_cache_suffix_is_boundary_safe() {
        assert_ne!(
            Principal::new("role", "12").cache_suffix(),
            Principal::new("role1", "2").cache_suffix()
        );
    }

    #[test]
    fn resource_id_with_action() {
        let entry = MenuEntry::new("reports-export", "Export")
            .with_target(MenuTarget::for_action("Reports", "export"));
        assert_eq!(
            resource_id(&MenuConfig::default(), &entry).unwrap(),
            "controllers/Reports/export"
        );
    }

    #[test]
    fn resource_id_without_action() {
        let entry = MenuEntry::new("reports", "Reports").with_target(MenuTarget::new("Reports"));
        assert_eq!(
            resource_id(&MenuConfig::default(), &entry).unwrap(),
            "controllers/Reports"
        );
    }

    #[test]
    fn resource_id_absent_without_target() {
        let entry = MenuEntry::new("tools", "Tools");
        assert!(resource_id(&MenuConfig::default(), &entry).is_none());
    }

    #[tokio::test]
    async fn filter_drops_denied_and_preserves_order() {
        let config = MenuConfig::default();
        let principal = Principal::new("role", "1");
        let entries = vec![
            MenuEntry::new("reports-index", "Index")
                .with_target(MenuTarget::for_action("Reports", "index")),
            MenuEntry::new("reports-export", "Export")
                .with_target(MenuTarget::for_action("Reports", "export")),
            MenuEntry::new("tools", "Tools"),
        ];

        let kept = filter_entries(&config, &DenyExport, &principal, entries)
            .await
            .unwrap();

        let ids: Vec<&str> = kept.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["reports-index", "tools"]);
    }

    #[tokio::test]
    async fn filter_propagates_policy_errors() {
        struct Failing;

        #[async_trait]
        impl AccessPolicy for Failing {
            async fn can_access(
                &self,
                _principal: &Principal,
                _resource: &str,
            ) -> anyhow::Result<bool> {
                anyhow::bail!("acl backend unavailable")
            }
        }

        let entries = vec![
            MenuEntry::new("reports-index", "Index")
                .with_target(MenuTarget::for_action("Reports", "index")),
        ];
        let result = filter_entries(
            &MenuConfig::default(),
            &Failing,
            &Principal::new("role", "1"),
            entries,
        )
        .await;
        assert!(result.is_err());
    }
}
