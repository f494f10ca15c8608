//! Thread-safe wrapper around the LRU store.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::lru::LruStore;
use crate::ByteView;

/// Hit/miss counters for one group's cache.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
}

impl CacheStats {
    /// Calculate hit rate (0.0 to 1.0).
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Exclusive-lock guard over an [`LruStore`] of [`ByteView`] values.
///
/// Reads serialize with writes because an LRU hit mutates recency order.
/// The backing store is allocated lazily on the first `add` so that a cold
/// namespace costs nothing.
pub(crate) struct MainCache {
    max_bytes: i64,
    inner: Mutex<Option<LruStore<ByteView>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MainCache {
    pub(crate) fn new(max_bytes: i64) -> Self {
        Self {
            max_bytes,
            inner: Mutex::new(None),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub(crate) fn get(&self, key: &str) -> Option<ByteView> {
        let mut guard = self.inner.lock();
        let view = guard.as_mut().and_then(|store| store.get(key).cloned());
        match view {
            Some(view) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(view)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub(crate) fn add(&self, key: &str, value: ByteView) {
        let mut guard = self.inner.lock();
        let store = guard.get_or_insert_with(|| LruStore::new(self.max_bytes));
        store.add(key, value);
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.lock().as_ref().map_or(0, LruStore::len)
    }

    pub(crate) fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
