//! Byte-budgeted LRU store.
//!
//! Single-threaded by design; the concurrent wrapper lives in `cache`.
//! Eviction is driven by cumulative size (`key bytes + value weight`), not by
//! entry count, so one oversized value can displace many small ones.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

/// Capability every cached value must provide: its size in bytes.
pub trait Weighted {
    /// Size of the value in bytes, counted against the store's budget.
    fn weight(&self) -> usize;
}

impl Weighted for crate::ByteView {
    fn weight(&self) -> usize {
        self.len()
    }
}

impl Weighted for Vec<u8> {
    fn weight(&self) -> usize {
        self.len()
    }
}

impl Weighted for String {
    fn weight(&self) -> usize {
        self.len()
    }
}

/// Callback invoked with the key and value of every evicted entry.
///
/// Side effect only: eviction itself can never fail.
pub type EvictionHook<V> = Box<dyn Fn(&str, &V) + Send>;

/// LRU store with a byte budget.
///
/// A `max_bytes` of zero or below means unbounded: entries are never evicted.
/// After any mutating operation returns, the invariant
/// `sum(len(key) + value.weight()) <= max_bytes` holds (when bounded).
pub struct LruStore<V: Weighted> {
    max_bytes: i64,
    used_bytes: i64,
    map: FxHashMap<String, V>,
    /// Recency order (front = LRU, back = MRU).
    order: VecDeque<String>,
    on_evicted: Option<EvictionHook<V>>,
}

impl<V: Weighted> LruStore<V> {
    /// Creates a store with the given byte budget and no eviction hook.
    #[must_use]
    pub fn new(max_bytes: i64) -> Self {
        Self::with_eviction_hook(max_bytes, None)
    }

    /// Creates a store that invokes `on_evicted` for every evicted entry.
    #[must_use]
    pub fn with_eviction_hook(max_bytes: i64, on_evicted: Option<EvictionHook<V>>) -> Self {
        Self {
            max_bytes,
            used_bytes: 0,
            map: FxHashMap::default(),
            order: VecDeque::new(),
            on_evicted,
        }
    }

    /// Number of entries currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Bytes currently occupied, including key bytes.
    #[must_use]
    pub fn used_bytes(&self) -> i64 {
        self.used_bytes
    }

    /// Looks up `key`, marking the entry most-recently-used on a hit.
    pub fn get(&mut self, key: &str) -> Option<&V> {
        if self.map.contains_key(key) {
            Self::touch(&mut self.order, key);
        }
        self.map.get(key)
    }

    /// Inserts or replaces `key`, then evicts from the LRU end until the
    /// budget holds again. A single entry larger than the whole budget is
    /// evicted immediately by the same loop.
    pub fn add(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        let weight = value.weight() as i64;
        if let Some(old) = self.map.get(&key) {
            self.used_bytes += weight - old.weight() as i64;
            Self::touch(&mut self.order, &key);
            self.map.insert(key, value);
        } else {
            self.used_bytes += key.len() as i64 + weight;
            self.order.push_back(key.clone());
            self.map.insert(key, value);
        }
        while self.max_bytes > 0 && self.used_bytes > self.max_bytes {
            if !self.remove_oldest() {
                break;
            }
        }
    }

    /// Evicts the least-recently-used entry, firing the eviction hook.
    ///
    /// Returns false if the store was already empty.
    pub fn remove_oldest(&mut self) -> bool {
        let Some(key) = self.order.pop_front() else {
            return false;
        };
        if let Some(value) = self.map.remove(&key) {
            self.used_bytes -= key.len() as i64 + value.weight() as i64;
            if let Some(hook) = &self.on_evicted {
                hook(&key, &value);
            }
        }
        true
    }

    /// Moves `key` to the back (most-recently-used) of the order queue.
    fn touch(order: &mut VecDeque<String>, key: &str) {
        if let Some(pos) = order.iter().position(|k| k == key) {
            if let Some(k) = order.remove(pos) {
                order.push_back(k);
            }
        }
    }
}
