//! In-process snapshot cache backed by DashMap. The record store only
//! changes on ingest, so entries are invalidated explicitly on store
//! replacement rather than by TTL.

use dashmap::DashMap;
use mailpulse_engine::dashboard::DashboardSnapshot;
use std::sync::Arc;

/// Cache key: the exact, normalized filter selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectionKey {
    pub range: String,
    pub scope: String,
    pub flow_name: Option<String>,
}

/// Lock-free cache for computed dashboard snapshots, so repeated hits for
/// the same selection do not re-scan the record store.
pub struct SnapshotCache {
    store: DashMap<SelectionKey, Arc<DashboardSnapshot>>,
    max_entries: usize,
}

impl SnapshotCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            store: DashMap::with_capacity(max_entries),
            max_entries,
        }
    }

    pub fn get(&self, key: &SelectionKey) -> Option<Arc<DashboardSnapshot>> {
        self.store.get(key).map(|entry| entry.value().clone())
    }

    /// Insert unless at capacity. Ingest clears the cache, so capacity is
    /// only reachable through an unusually large number of distinct
    /// selections; skipping the insert keeps the map bounded.
    pub fn put(&self, key: SelectionKey, snapshot: Arc<DashboardSnapshot>) {
        if self.store.len() >= self.max_entries && !self.store.contains_key(&key) {
            return;
        }
        self.store.insert(key, snapshot);
    }

    /// Drop every cached selection; called when the record store is
    /// replaced.
    pub fn clear(&self) {
        self.store.clear();
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use mailpulse_core::types::Scope;
    use mailpulse_engine::dashboard::{self, DashboardQuery};
    use mailpulse_engine::store::RecordStore;

    fn key(range: &str) -> SelectionKey {
        SelectionKey {
            range: range.to_string(),
            scope: "all".to_string(),
            flow_name: None,
        }
    }

    fn sample_snapshot() -> Arc<DashboardSnapshot> {
        let reference: DateTime<Utc> = "2025-06-30T00:00:00Z".parse().unwrap();
        Arc::new(dashboard::snapshot(
            &RecordStore::default(),
            reference,
            &DashboardQuery::new("30d", Scope::All),
        ))
    }

    #[test]
    fn test_get_put_roundtrip() {
        let cache = SnapshotCache::new(8);
        assert!(cache.get(&key("30d")).is_none());

        cache.put(key("30d"), sample_snapshot());
        assert!(cache.get(&key("30d")).is_some());
        assert!(cache.get(&key("90d")).is_none());
    }

    #[test]
    fn test_clear_empties_cache() {
        let cache = SnapshotCache::new(8);
        cache.put(key("30d"), sample_snapshot());
        cache.put(key("90d"), sample_snapshot());
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_capacity_guard_skips_new_keys() {
        let cache = SnapshotCache::new(1);
        cache.put(key("30d"), sample_snapshot());
        cache.put(key("90d"), sample_snapshot());

        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key("30d")).is_some());
        assert!(cache.get(&key("90d")).is_none());

        // Existing keys can still be refreshed at capacity.
        cache.put(key("30d"), sample_snapshot());
        assert_eq!(cache.len(), 1);
    }
}
