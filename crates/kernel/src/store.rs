//! Cache store abstraction and the in-memory reference implementation.
//!
//! The kernel treats the store as an opaque namespaced key/value collaborator
//! with per-write TTLs; any backend with those semantics can be plugged in.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

/// Namespaced key/value store with per-write TTLs.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read a value; `Ok(None)` is a miss.
    async fn read(&self, key: &str, namespace: &str) -> anyhow::Result<Option<String>>;

    /// Write a value that expires after `ttl`.
    async fn write(
        &self,
        key: &str,
        value: &str,
        namespace: &str,
        ttl: Duration,
    ) -> anyhow::Result<()>;

    /// Delete a value; returns whether one was present.
    async fn delete(&self, key: &str, namespace: &str) -> anyhow::Result<bool>;
}

struct StoredValue {
    value: String,
    expires_at: Instant,
}

/// In-process store backed by a concurrent map. Entries expire lazily on
/// read. Suitable for tests and single-process deployments.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, StoredValue>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn full_key(namespace: &str, key: &str) -> String {
        format!("{namespace}:{key}")
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn read(&self, key: &str, namespace: &str) -> anyhow::Result<Option<String>> {
        let full = Self::full_key(namespace, key);
        if let Some(stored) = self.entries.get(&full) {
            if stored.expires_at > Instant::now() {
                return Ok(Some(stored.value.clone()));
            }
        }
        // Expired entries are removed on the read that notices them.
        self.entries
            .remove_if(&full, |_, stored| stored.expires_at <= Instant::now());
        Ok(None)
    }

    async fn write(
        &self,
        key: &str,
        value: &str,
        namespace: &str,
        ttl: Duration,
    ) -> anyhow::Result<()> {
        self.entries.insert(
            Self::full_key(namespace, key),
            StoredValue {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str, namespace: &str) -> anyhow::Result<bool> {
        Ok(self.entries.remove(&Self::full_key(namespace, key)).is_some())
    }
}
