use std::collections::{HashMap, VecDeque};

use tracing::debug;

/// Maximum number of cached search results.
/// Users type many distinct queries; 50 keeps recent ones warm without
/// holding every keystroke's result list forever.
pub const SEARCH_CACHE_SIZE: usize = 50;

/// Maximum number of cached filter results.
/// There are only four filter ids, so 10 leaves generous headroom.
pub const FILTER_CACHE_SIZE: usize = 10;

/// A fixed-capacity key/value cache with strict FIFO eviction.
///
/// Insertion order determines the eviction victim: when a new key arrives
/// at capacity, the oldest-inserted key is removed first. Unlike an LRU,
/// `get` never promotes an entry and re-inserting an existing key does not
/// reset its age. Staleness from that simplification is bounded because
/// every catalog refresh clears the cache outright.
#[derive(Debug, Clone)]
pub struct QueryCache<T> {
    capacity: usize,
    entries: HashMap<String, T>,
    /// Keys oldest-first; eviction pops from the front.
    order: VecDeque<String>,
}

impl<T> QueryCache<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }

    /// Look up a cached result. No side effects - FIFO, not LRU.
    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }

    /// Insert a result, evicting the oldest entry first when a new key
    /// would exceed capacity. Existing keys keep their position.
    pub fn put(&mut self, key: &str, value: T) {
        if self.capacity == 0 {
            return;
        }

        if self.entries.contains_key(key) {
            self.entries.insert(key.to_string(), value);
            return;
        }

        if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
                debug!(key = %oldest, "Evicted oldest cached query result");
            }
        }

        self.order.push_back(key.to_string());
        self.entries.insert(key.to_string(), value);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Rebuild a cache from its persisted pair form. Pairs beyond the
    /// capacity evict from the front, keeping the bound structural.
    pub fn from_pairs(capacity: usize, pairs: Vec<(String, T)>) -> Self {
        let mut cache = Self::new(capacity);
        for (key, value) in pairs {
            cache.put(&key, value);
        }
        cache
    }
}

impl<T: Clone> QueryCache<T> {
    /// Export entries as ordered pairs, oldest first. This is the persisted
    /// form: a plain array round-trips through JSON while a map would lose
    /// insertion order.
    pub fn to_pairs(&self) -> Vec<(String, T)> {
        self.order
            .iter()
            .filter_map(|key| self.entries.get(key).map(|value| (key.clone(), value.clone())))
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
