//! Time-boxed memoization of computed views.
//!
//! A read hits when `now - captured_at < ttl`. Writers that change a view
//! evict its key instead of waiting for expiry. The trait is the seam for a
//! shared store; the in-memory map is process-local.

use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;

/// Cache of values keyed by logical view name.
pub trait ViewCache<V>: Send + Sync {
    /// Fresh value for `key`, if any.
    fn get(&self, key: &str) -> Option<V>;

    /// Store `value`, stamping it with the current instant.
    fn insert(&self, key: &str, value: V);

    /// Drop `key` regardless of age.
    fn evict(&self, key: &str);

    /// Drop every expired entry; returns how many were removed.
    fn evict_expired(&self) -> usize;
}

struct Entry<V> {
    value: V,
    captured_at: Instant,
}

/// In-process [`ViewCache`] with one TTL for all its keys.
pub struct MemoryViewCache<V> {
    entries: DashMap<String, Entry<V>>,
    ttl: Duration,
}

impl<V> MemoryViewCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self { entries: DashMap::new(), ttl }
    }
}

impl<V: Clone + Send + Sync> ViewCache<V> for MemoryViewCache<V> {
    fn get(&self, key: &str) -> Option<V> {
        let entry = self.entries.get(key)?;
        (entry.captured_at.elapsed() < self.ttl).then(|| entry.value.clone())
    }

    fn insert(&self, key: &str, value: V) {
        self.entries.insert(key.to_owned(), Entry { value, captured_at: Instant::now() });
    }

    fn evict(&self, key: &str) {
        self.entries.remove(key);
    }

    fn evict_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.captured_at.elapsed() < self.ttl);
        before.saturating_sub(self.entries.len())
    }
}
