//! Bounded query cache
//!
//! A fixed-capacity LRU split into independently locked shards. Readers and
//! writers of different keys rarely contend, and every shard's bookkeeping
//! is guarded by its own mutex.

use lru::LruCache;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

/// Sharded LRU cache keyed by query text
pub struct QueryCache<V: Clone> {
    shards: Vec<Mutex<LruCache<String, V>>>,
    capacity: usize,
}

impl<V: Clone> QueryCache<V> {
    /// Create a cache holding at most about `capacity` entries
    ///
    /// Capacity is split evenly across shards, rounding up. A capacity or
    /// shard count of zero is treated as one.
    pub fn new(capacity: usize, shards: usize) -> Self {
        let shards = shards.clamp(1, capacity.max(1));
        let per_shard = NonZeroUsize::new(capacity.max(1).div_ceil(shards)).unwrap_or(NonZeroUsize::MIN);

        Self {
            shards: (0..shards)
                .map(|_| Mutex::new(LruCache::new(per_shard)))
                .collect(),
            capacity: per_shard.get() * shards,
        }
    }

    fn shard(&self, key: &str) -> MutexGuard<'_, LruCache<String, V>> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let index = (hasher.finish() as usize) % self.shards.len();
        // A panic while holding the lock leaves the LRU itself consistent
        self.shards[index]
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Look up a key, marking it most recently used
    pub fn get(&self, key: &str) -> Option<V> {
        self.shard(key).get(key).cloned()
    }

    /// Insert or replace a value, evicting the shard's least recent entry when full
    pub fn insert(&self, key: String, value: V) {
        let mut shard = self.shard(&key);
        shard.put(key, value);
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.lock().unwrap_or_else(|p| p.into_inner()).len())
            .sum()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total capacity across shards
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every entry
    pub fn clear(&self) {
        for shard in &self.shards {
            shard.lock().unwrap_or_else(|p| p.into_inner()).clear();
        }
    }
}
