//! Single-entry memoization keyed by structural equality.
//!
//! `CachedValue<K, V>` remembers the last `(key, value)` pair it computed.
//! Asking again with a key that compares equal returns the stored value
//! without recomputing. Slider drags that bounce between the same few
//! states hit the cache instead of rerunning the metrics pipeline.

/// Hit/miss counters for a `CachedValue`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// A cached value tagged with the key it was computed from
#[derive(Debug)]
pub struct CachedValue<K, V> {
    entry: Option<(K, V)>,
    stats: CacheStats,
}

impl<K, V> Default for CachedValue<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> CachedValue<K, V> {
    /// Create a new empty cache
    pub const fn new() -> Self {
        Self {
            entry: None,
            stats: CacheStats { hits: 0, misses: 0 },
        }
    }

    /// Explicitly invalidate the cache.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

impl<K: PartialEq + Clone, V> CachedValue<K, V> {
    /// Get the cached value if it was computed from a key equal to `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        match &self.entry {
            Some((cached, value)) if cached == key => Some(value),
            _ => None,
        }
    }

    pub fn is_valid(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Get or compute the value for `key`, replacing any previous entry.
    pub fn get_or_compute<F>(&mut self, key: &K, compute: F) -> &V
    where
        F: FnOnce(&K) -> V,
    {
        let entry = match self.entry.take() {
            Some((cached, value)) if cached == *key => {
                self.stats.hits += 1;
                (cached, value)
            }
            _ => {
                self.stats.misses += 1;
                (key.clone(), compute(key))
            }
        };
        &self.entry.insert(entry).1
    }
}
