//! Menu service: the cache manager and the public menu-building API.
//!
//! Owns two cached artifacts. The raw (pre-filter) entry list lives under a
//! global key shared across principals; assembled trees live under one key
//! per principal. Entries registered manually after the raw cache was
//! populated are detected as drift and force a full rebuild, so stale
//! per-principal trees are never trusted for the principal being built.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::access::{filter_entries, AccessPolicy, Principal};
use crate::config::MenuConfig;
use crate::entry::{MenuEntry, NewEntry};
use crate::error::{MenuError, MenuResult};
use crate::normalize::{discover, humanize, slugify};
use crate::source::ActionSource;
use crate::store::CacheStore;
use crate::tree::assemble;

/// Persisted shape of the raw entry cache.
#[derive(Debug, Serialize, Deserialize)]
struct RawCacheRecord {
    entries: Vec<MenuEntry>,
}

/// Mutable build state, guarded by one mutex and never held across awaits.
#[derive(Default)]
struct RawState {
    /// Current raw entry list, cached or freshly discovered.
    entries: Vec<MenuEntry>,

    /// Entries registered through `add_entry`, kept separately so drift
    /// against a loaded raw cache can be detected on merge.
    manual: Vec<MenuEntry>,

    /// The raw list is known stale; per-principal trees must not be trusted.
    rebuild: bool,

    /// Whether the raw cache has been consulted this service lifetime.
    loaded: bool,
}

/// Builds, filters, assembles, and caches per-principal menus.
#[derive(Clone)]
pub struct MenuService {
    inner: Arc<MenuServiceInner>,
}

struct MenuServiceInner {
    config: MenuConfig,
    sources: Vec<ActionSource>,
    store: Arc<dyn CacheStore>,
    policy: Arc<dyn AccessPolicy>,
    raw: Mutex<RawState>,
}

impl MenuService {
    /// Create a service over an injected source list, cache store, and
    /// access policy.
    pub fn new(
        config: MenuConfig,
        sources: Vec<ActionSource>,
        store: Arc<dyn CacheStore>,
        policy: Arc<dyn AccessPolicy>,
    ) -> Self {
        Self {
            inner: Arc::new(MenuServiceInner {
                config,
                sources,
                store,
                policy,
                raw: Mutex::new(RawState::default()),
            }),
        }
    }

    /// Register an ad hoc entry, bypassing discovery.
    ///
    /// The entry joins the raw list on the next [`build_menu`] call; trees
    /// already returned in this cycle are not retroactively updated.
    ///
    /// [`build_menu`]: MenuService::build_menu
    pub fn add_entry(&self, entry: NewEntry) -> MenuResult<()> {
        let entry = self.prepare_manual(entry)?;
        debug!(id = %entry.id, "manual menu entry registered");
        self.inner.raw.lock().manual.push(entry);
        Ok(())
    }

    /// Build the navigation tree for a principal.
    ///
    /// Returns the cached tree when the raw set is not stale; otherwise
    /// discovers, filters, assembles, and caches a fresh one. Cache store
    /// failures degrade to recomputation or a lost write, never to an error.
    pub async fn build_menu(&self, principal: &Principal) -> MenuResult<Vec<MenuEntry>> {
        self.load_raw_cache().await;
        self.merge_manual();

        let principal_key = self.principal_key(principal);
        let (rebuild, empty) = {
            let raw = self.inner.raw.lock();
            (raw.rebuild, raw.entries.is_empty())
        };

        if !rebuild {
            if let Some(tree) = self.read_tree(&principal_key).await {
                debug!(key = %principal_key, "menu tree cache hit");
                return Ok(tree);
            }
        }

        if rebuild || empty {
            let discovered = discover(&self.inner.config, &self.inner.sources);
            let entries = {
                let mut raw = self.inner.raw.lock();
                raw.entries = discovered;
                let manual = raw.manual.clone();
                for entry in manual {
                    if raw.entries.iter().any(|e| e.id == entry.id) {
                        continue;
                    }
                    raw.entries.push(entry);
                }
                raw.rebuild = false;
                raw.entries.clone()
            };
            self.write_raw_cache(&entries).await;
        }

        let entries = self.inner.raw.lock().entries.clone();
        let filtered =
            filter_entries(&self.inner.config, self.inner.policy.as_ref(), principal, entries)
                .await?;
        let tree = assemble(filtered);
        self.write_tree(&principal_key, &tree).await;
        Ok(tree)
    }

    /// Delete the global raw cache entry.
    ///
    /// Per-principal trees are not swept (their keys are not tracked); they
    /// expire by TTL or are replaced on the next rebuild. Returns whether a
    /// cached value was present.
    pub async fn clear_raw_cache(&self) -> bool {
        let deleted = match self
            .inner
            .store
            .delete(&self.inner.config.cache_key, &self.inner.config.cache_namespace)
            .await
        {
            Ok(deleted) => deleted,
            Err(e) => {
                warn!(error = %e, "failed to delete raw menu cache");
                false
            }
        };

        let mut raw = self.inner.raw.lock();
        raw.entries.clear();
        raw.loaded = false;
        raw.rebuild = false;
        deleted
    }

    /// Snapshot of the current raw entry list, pending manual entries
    /// included. For inspection and tests.
    pub fn get_raw_entries(&self) -> Vec<MenuEntry> {
        let raw = self.inner.raw.lock();
        let mut out = raw.entries.clone();
        for entry in &raw.manual {
            if out.iter().any(|e| e.id == entry.id) {
                continue;
            }
            out.push(entry.clone());
        }
        out
    }

    /// Fill in the derivable fields of a manually registered entry.
    fn prepare_manual(&self, entry: NewEntry) -> MenuResult<MenuEntry> {
        let id = match entry.id {
            Some(id) => id,
            None => match &entry.target {
                Some(target) => match &target.action {
                    Some(action) => {
                        format!("{}-{}", slugify(&target.source), slugify(action))
                    }
                    None => slugify(&target.source),
                },
                None => {
                    return Err(MenuError::InvalidEntry(
                        "an id or a target to derive one from is required".to_string(),
                    ))
                }
            },
        };

        let title = match entry.title {
            Some(title) => title,
            None => entry
                .target
                .as_ref()
                .and_then(|t| t.action.as_deref())
                .map_or_else(|| humanize(&id), humanize),
        };

        let parent = entry
            .parent
            .or_else(|| self.inner.config.default_parent.clone());

        Ok(MenuEntry {
            id,
            parent,
            title,
            target: entry.target,
            weight: entry.weight,
            children: Vec::new(),
        })
    }

    /// Per-principal tree key: `{kind}{id}_{cache_key}`.
    fn principal_key(&self, principal: &Principal) -> String {
        format!("{}_{}", principal.cache_suffix(), self.inner.config.cache_key)
    }

    /// Consult the raw cache once per service lifetime. A read failure or a
    /// corrupt payload is a miss and forces a rebuild.
    async fn load_raw_cache(&self) {
        if self.inner.raw.lock().loaded {
            return;
        }

        let read = self
            .inner
            .store
            .read(&self.inner.config.cache_key, &self.inner.config.cache_namespace)
            .await;

        let mut raw = self.inner.raw.lock();
        if raw.loaded {
            // Another task finished loading while we were reading.
            return;
        }
        raw.loaded = true;
        match read {
            Ok(Some(payload)) => match serde_json::from_str::<RawCacheRecord>(&payload) {
                Ok(record) => {
                    debug!(entries = record.entries.len(), "raw menu cache loaded");
                    raw.entries = record.entries;
                }
                Err(e) => {
                    warn!(error = %e, "raw menu cache corrupt, forcing rebuild");
                    raw.rebuild = true;
                }
            },
            Ok(None) => {
                debug!("raw menu cache absent, rebuild required");
                raw.rebuild = true;
            }
            Err(e) => {
                warn!(error = %e, "raw menu cache read failed, treating as miss");
                raw.rebuild = true;
            }
        }
    }

    /// Append manually registered entries the raw list has not seen. Any
    /// unseen id means trees computed from the old raw list would miss it,
    /// so the rebuild flag flips.
    fn merge_manual(&self) {
        let mut raw = self.inner.raw.lock();
        if raw.manual.is_empty() {
            return;
        }
        let manual = raw.manual.clone();
        let mut added = 0usize;
        for entry in manual {
            if raw.entries.iter().any(|e| e.id == entry.id) {
                continue;
            }
            raw.entries.push(entry);
            added += 1;
        }
        if added > 0 {
            raw.rebuild = true;
            debug!(added, "manual menu entries merged, rebuild forced");
        }
    }

    async fn read_tree(&self, key: &str) -> Option<Vec<MenuEntry>> {
        match self
            .inner
            .store
            .read(key, &self.inner.config.cache_namespace)
            .await
        {
            Ok(Some(payload)) => match serde_json::from_str(&payload) {
                Ok(tree) => Some(tree),
                Err(e) => {
                    warn!(error = %e, key = %key, "cached menu tree corrupt, rebuilding");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, key = %key, "menu tree cache read failed, treating as miss");
                None
            }
        }
    }

    async fn write_tree(&self, key: &str, tree: &[MenuEntry]) {
        let Ok(payload) = serde_json::to_string(tree) else {
            warn!(key = %key, "failed to serialize menu tree for caching");
            return;
        };
        if let Err(e) = self
            .inner
            .store
            .write(
                key,
                &payload,
                &self.inner.config.cache_namespace,
                self.inner.config.cache_ttl,
            )
            .await
        {
            // Degraded performance only; the computed tree is still returned.
            warn!(error = %e, key = %key, "failed to write menu tree cache");
        }
    }

    async fn write_raw_cache(&self, entries: &[MenuEntry]) {
        let record = RawCacheRecord {
            entries: entries.to_vec(),
        };
        let Ok(payload) = serde_json::to_string(&record) else {
            warn!("failed to serialize raw menu entries for caching");
            return;
        };
        if let Err(e) = self
            .inner
            .store
            .write(
                &self.inner.config.cache_key,
                &payload,
                &self.inner.config.cache_namespace,
                self.inner.config.cache_ttl,
            )
            .await
        {
            warn!(error = %e, "failed to write raw menu cache");
        }
    }
}

impl std::fmt::Debug for MenuService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuService")
            .field("sources", &self.inner.sources.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::entry::MenuTarget;
    use crate::store::MemoryStore;
    use async_trait::async_trait;

    struct AllowAll;

    #[async_trait]
    impl AccessPolicy for AllowAll {
        async fn can_access(&self, _principal: &Principal, _resource: &str) -> anyhow::Result<bool> {
            Ok(true)
        }
    }

    fn service(sources: Vec<ActionSource>) -> MenuService {
        MenuService::new(
            MenuConfig::default(),
            sources,
            Arc::new(MemoryStore::new()),
            Arc::new(AllowAll),
        )
    }

    #[test]
    fn manual_entry_id_derived_from_target() {
        let svc = service(Vec::new());
        svc.add_entry(NewEntry {
            target: Some(MenuTarget::for_action("Reports", "export")),
            ..NewEntry::default()
        })
        .unwrap();

        let raw = svc.get_raw_entries();
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].id, "reports-export");
        assert_eq!(raw[0].title, "Export");
        assert_eq!(raw[0].weight, 0);
    }

    #[test]
    fn manual_entry_without_action_slugs_the_source() {
        let svc = service(Vec::new());
        svc.add_entry(NewEntry {
            target: Some(MenuTarget::new("User Accounts")),
            ..NewEntry::default()
        })
        .unwrap();

        assert_eq!(svc.get_raw_entries()[0].id, "user-accounts");
    }

    #[test]
    fn manual_entry_without_id_or_target_is_rejected() {
        let svc = service(Vec::new());
        let err = svc
            .add_entry(NewEntry {
                title: Some("Dangling".to_string()),
                ..NewEntry::default()
            })
            .unwrap_err();
        assert!(matches!(err, MenuError::InvalidEntry(_)));
    }

    #[test]
    fn manual_entry_inherits_default_parent() {
        let config = MenuConfig {
            default_parent: Some("main".to_string()),
            ..MenuConfig::default()
        };
        let svc = MenuService::new(
            config,
            Vec::new(),
            Arc::new(MemoryStore::new()),
            Arc::new(AllowAll),
        );
        svc.add_entry(NewEntry {
            id: Some("custom".to_string()),
            title: Some("Custom".to_string()),
            ..NewEntry::default()
        })
        .unwrap();

        assert_eq!(svc.get_raw_entries()[0].parent.as_deref(), Some("main"));
    }

    #[test]
    fn principal_keys_do_not_collide_across_kinds() {
        let svc = service(Vec::new());
        assert_ne!(
            svc.principal_key(&Principal::new("role", "7")),
            svc.principal_key(&Principal::new("group", "7"))
        );
    }
}
