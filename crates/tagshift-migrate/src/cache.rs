//! Bounded, time-evicting memo table for identifier translation.
//!
//! Lookups and inserts may race from any number of threads. A race can
//! compute the same value twice; the later insert wins, which is harmless
//! because the mapping being memoised is pure.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use tracing::trace;

/// Retention limits for an [`IdCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    /// Maximum number of entries; 0 means unbounded.
    pub capacity: usize,
    /// Entry lifetime; zero means entries never expire.
    pub ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            capacity: 4096,
            ttl: Duration::from_secs(600),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

struct Entry<V> {
    value: V,
    inserted: Instant,
}

pub struct IdCache<K, V> {
    entries: RwLock<HashMap<K, Entry<V>>>,
    settings: CacheSettings,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, V> IdCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(settings: CacheSettings) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            settings,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    fn is_expired(&self, entry: &Entry<V>, now: Instant) -> bool {
        !self.settings.ttl.is_zero() && now.duration_since(entry.inserted) > self.settings.ttl
    }

    /// Cached value for `key`, if present and not expired.
    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let found = entries
            .get(key)
            .filter(|entry| !self.is_expired(entry, Instant::now()))
            .map(|entry| entry.value.clone());
        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    pub fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        let capacity = self.settings.capacity;
        if capacity > 0 && entries.len() >= capacity && !entries.contains_key(&key) {
            entries.retain(|_, entry| !self.is_expired(entry, now));
            if entries.len() >= capacity {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.inserted)
                    .map(|(key, _)| key.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                    trace!(capacity, "evicted oldest cache entry");
                }
            }
        }
        entries.insert(key, Entry { value, inserted: now });
    }

    /// Cached value for `key`, computing and storing it on a miss. The lock
    /// is not held while `compute` runs.
    pub fn get_or_compute(&self, key: K, compute: impl FnOnce(&K) -> V) -> V {
        if let Some(value) = self.get(&key) {
            return value;
        }
        let value = compute(&key);
        self.insert(key, value.clone());
        value
    }

    /// Drop every expired entry.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|_, entry| !self.is_expired(entry, now));
    }

    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl<K, V> Default for IdCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new(CacheSettings::default())
    }
}
