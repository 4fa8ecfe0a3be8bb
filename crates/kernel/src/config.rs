//! Menu pipeline configuration.

use std::time::Duration;

/// Configuration for menu discovery, resource-id derivation, and caching.
#[derive(Debug, Clone)]
pub struct MenuConfig {
    /// Global key the raw (pre-filter) entry list is cached under. Also the
    /// suffix of every per-principal tree key.
    pub cache_key: String,

    /// Cache region all menu keys are written to.
    pub cache_namespace: String,

    /// TTL for the raw cache and for per-principal trees (default: 1 day).
    pub cache_ttl: Duration,

    /// Base path prepended to every derived resource identifier
    /// (default: "controllers").
    pub acl_path: String,

    /// Separator between the source segment and the action segment of a
    /// resource identifier (default: '/').
    pub acl_separator: char,

    /// Administrative action-name prefix, e.g. "admin" for `admin_index`.
    /// `None` disables administrative-variant handling.
    pub admin_prefix: Option<String>,

    /// Parent id assigned to manually registered entries that declare none.
    pub default_parent: Option<String>,

    /// Action names never turned into menu entries, merged with each
    /// source's own exclusions. Compared case-insensitively.
    pub exclude_actions: Vec<String>,
}

impl Default for MenuConfig {
    fn default() -> Self {
        let admin_prefix = Some("admin".to_string());
        Self {
            cache_key: "menu_storage".to_string(),
            cache_namespace: "menu".to_string(),
            cache_ttl: Duration::from_secs(24 * 60 * 60),
            acl_path: "controllers".to_string(),
            acl_separator: '/',
            exclude_actions: default_exclusions(admin_prefix.as_deref()),
            admin_prefix,
            default_parent: None,
        }
    }
}

/// Conventionally non-menu actions: per-record endpoints and their
/// administrative variants when an admin prefix is configured.
pub fn default_exclusions(admin_prefix: Option<&str>) -> Vec<String> {
    let base = ["view", "edit", "delete"];
    let mut out: Vec<String> = base.iter().map(|a| (*a).to_string()).collect();
    if let Some(prefix) = admin_prefix {
        out.extend(base.iter().map(|a| format!("{prefix}_{a}")));
    }
    out
}
