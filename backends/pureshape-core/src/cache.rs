// this_file: backends/pureshape-core/src/cache.rs

//! Concurrent memoization used for shaping plans.

use crate::Result;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use log::debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Concurrent map of immutable, shared values.
///
/// Values are built outside any shard lock. When two callers race on the
/// same key, the first insert wins and the loser's value is discarded, so
/// every caller observes the same `Arc`.
///
/// A bounded cache is emptied before an insert that would exceed its limit;
/// concurrent inserts may overshoot the limit by the number of racing callers.
pub struct SharedCache<K, V> {
    entries: DashMap<K, Arc<V>>,
    max_entries: Option<usize>,
    hits: AtomicU64,
    misses: AtomicU64,
    flushes: AtomicU64,
}

impl<K: Eq + Hash, V> SharedCache<K, V> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: None,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            flushes: AtomicU64::new(0),
        }
    }

    /// A cache holding at most `max_entries` values (at least one).
    pub fn bounded(max_entries: usize) -> Self {
        Self {
            max_entries: Some(max_entries.max(1)),
            ..Self::new()
        }
    }

    /// Look up a value without building it
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let found = self.entries.get(key).map(|entry| entry.value().clone());
        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    /// Return the cached value for `key`, building and inserting it on a miss.
    pub fn get_or_try_insert_with<F>(&self, key: K, build: F) -> Result<Arc<V>>
    where
        F: FnOnce() -> Result<V>,
    {
        if let Some(existing) = self.get(&key) {
            return Ok(existing);
        }

        let built = Arc::new(build()?);
        self.make_room();
        match self.entries.entry(key) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                entry.insert(built.clone());
                Ok(built)
            }
        }
    }

    /// Insert or replace a value
    pub fn insert(&self, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        if !self.entries.contains_key(&key) {
            self.make_room();
        }
        self.entries.insert(key, value.clone());
        value
    }

    fn make_room(&self) {
        if let Some(max) = self.max_entries {
            if self.entries.len() >= max {
                self.entries.clear();
                self.flushes.fetch_add(1, Ordering::Relaxed);
                debug!(target: "pureshape::cache", "cache reached {max} entries, flushed");
            }
        }
    }

    pub fn remove(&self, key: &K) -> Option<Arc<V>> {
        self.entries.remove(key).map(|(_, value)| value)
    }

    /// Keep only the entries for which `keep` returns true
    pub fn retain(&self, mut keep: impl FnMut(&K, &V) -> bool) {
        self.entries.retain(|key, value| keep(key, value));
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
        }
    }
}

impl<K: Eq + Hash, V> Default for SharedCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    /// Times a bounded cache was emptied to stay under its limit
    pub flushes: u64,
}
