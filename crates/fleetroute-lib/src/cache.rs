//! Concurrent per-routing-group cache with invalidation barriers.
//!
//! Lookups and inserts go through a sharded [`DashMap`], so readers of
//! different groups never contend on one lock. Values are computed outside
//! the map; two threads missing the same key may both compute, and the last
//! insert wins.
//!
//! Every invalidation bumps a generation counter before clearing. A value
//! computed under an older generation is handed back to its caller but never
//! stored, so nothing computed before an invalidation can reappear in the
//! cache after the invalidation returns.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

pub(crate) struct GroupCache<V> {
    entries: DashMap<String, Arc<V>>,
    generation: AtomicU64,
}

impl<V> GroupCache<V> {
    pub(crate) fn new() -> Self {
        Self {
            entries: DashMap::new(),
            generation: AtomicU64::new(0),
        }
    }

    pub(crate) fn get(&self, key: &str) -> Option<Arc<V>> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Return the cached value for `key`, computing and storing it if absent.
    pub(crate) fn get_or_compute(&self, key: &str, compute: impl FnOnce() -> V) -> Arc<V> {
        if let Some(value) = self.get(key) {
            return value;
        }

        let generation = self.generation.load(Ordering::Acquire);
        let value = Arc::new(compute());

        // The shard lock is held from the generation check through the
        // insert, so a concurrent clear cannot slip in between.
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if self.generation.load(Ordering::Acquire) == generation {
                    occupied.insert(value.clone());
                }
            }
            Entry::Vacant(vacant) => {
                if self.generation.load(Ordering::Acquire) == generation {
                    vacant.insert(value.clone());
                }
            }
        }
        value
    }

    /// Replace every cached value with `update(key, value)`.
    pub(crate) fn update_all(&self, mut update: impl FnMut(&str, &V) -> V) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        for mut entry in self.entries.iter_mut() {
            let updated = update(entry.key().as_str(), &**entry.value());
            *entry.value_mut() = Arc::new(updated);
        }
    }

    pub(crate) fn clear(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.entries.clear();
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        keys
    }

    pub(crate) fn snapshot(&self) -> BTreeMap<String, Arc<V>> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_once_per_key() {
        let cache = GroupCache::new();
        let first = cache.get_or_compute("a", || 1);
        let second = cache.get_or_compute("a", || 2);
        assert_eq!(*first, 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.keys().len(), 1);
    }

    #[test]
    fn value_computed_across_a_clear_is_not_stored() {
        let cache: GroupCache<i32> = GroupCache::new();
        let value = cache.get_or_compute("a", || {
            cache.clear();
            7
        });
        assert_eq!(*value, 7);
        assert!(cache.get("a").is_none());
    }

    #[test]
    fn update_all_replaces_values() {
        let cache = GroupCache::new();
        cache.get_or_compute("a", || 1);
        cache.get_or_compute("b", || 2);
        cache.update_all(|_, value| value * 10);
        assert_eq!(cache.snapshot().values().map(|v| **v).collect::<Vec<_>>(), vec![10, 20]);
        assert_eq!(cache.keys(), vec!["a".to_string(), "b".to_string()]);
    }
}
