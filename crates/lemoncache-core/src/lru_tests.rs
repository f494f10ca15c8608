//! Tests for the byte-budgeted LRU store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::lru::LruStore;

#[test]
fn get_hit_and_miss() {
    let mut store: LruStore<String> = LruStore::new(0);
    store.add("key1", "1234".to_string());
    assert_eq!(store.get("key1").map(String::as_str), Some("1234"));
    assert!(store.get("key2").is_none());
    assert_eq!(store.len(), 1);
}

#[test]
fn overflow_evicts_least_recently_used() {
    // Budget sized for exactly two 2-byte key + 2-byte value entries.
    let cap = i64::try_from("k1".len() + "v1".len() + "k2".len() + "v2".len()).unwrap();
    let mut store: LruStore<String> = LruStore::new(cap);
    store.add("k1", "v1".to_string());
    store.add("k2", "v2".to_string());
    store.add("k3", "v3".to_string());

    assert!(store.get("k1").is_none(), "k1 should have been evicted");
    assert!(store.get("k2").is_some());
    assert!(store.get("k3").is_some());
    assert_eq!(store.len(), 2);
}

#[test]
fn get_refreshes_recency() {
    let cap = 8; // two entries of "kN" + "vN"
    let mut store: LruStore<String> = LruStore::new(cap);
    store.add("k1", "v1".to_string());
    store.add("k2", "v2".to_string());

    // Touch k1 so k2 becomes the eviction candidate.
    assert!(store.get("k1").is_some());
    store.add("k3", "v3".to_string());

    assert!(store.get("k1").is_some());
    assert!(store.get("k2").is_none());
}

#[test]
fn replacing_a_value_adjusts_used_bytes() {
    let mut store: LruStore<String> = LruStore::new(0);
    store.add("key", "ab".to_string());
    let before = store.used_bytes();
    store.add("key", "abcdef".to_string());
    assert_eq!(store.used_bytes(), before + 4);
    assert_eq!(store.len(), 1);
}

#[test]
fn replacement_over_budget_evicts() {
    let mut store: LruStore<String> = LruStore::new(8);
    store.add("k1", "v1".to_string());
    store.add("k2", "v2".to_string());
    // Growing k2 pushes the total over budget; k1 is the LRU entry.
    store.add("k2", "longer".to_string());
    assert!(store.get("k1").is_none());
    assert!(store.get("k2").is_some());
}

#[test]
fn zero_or_negative_budget_never_evicts() {
    for budget in [0, -1] {
        let mut store: LruStore<String> = LruStore::new(budget);
        for i in 0..100 {
            store.add(format!("key-{i}"), "x".repeat(64));
        }
        assert_eq!(store.len(), 100);
    }
}

#[test]
fn oversized_entry_is_inserted_then_evicted() {
    let evicted = Arc::new(AtomicUsize::new(0));
    let hook_counter = Arc::clone(&evicted);
    let mut store: LruStore<String> = LruStore::with_eviction_hook(
        4,
        Some(Box::new(move |_key, _value| {
            hook_counter.fetch_add(1, Ordering::SeqCst);
        })),
    );
    store.add("big", "way-over-budget".to_string());
    assert_eq!(store.len(), 0);
    assert_eq!(store.used_bytes(), 0);
    assert_eq!(evicted.load(Ordering::SeqCst), 1);
}

#[test]
fn eviction_hook_sees_key_and_value() {
    let seen: Arc<parking_lot::Mutex<Vec<(String, String)>>> =
        Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mut store: LruStore<String> = LruStore::with_eviction_hook(
        8,
        Some(Box::new(move |key, value| {
            sink.lock().push((key.to_string(), value.clone()));
        })),
    );
    store.add("k1", "v1".to_string());
    store.add("k2", "v2".to_string());
    store.add("k3", "v3".to_string());

    let seen = seen.lock();
    assert_eq!(seen.as_slice(), &[("k1".to_string(), "v1".to_string())]);
}

#[test]
fn remove_oldest_on_empty_store_is_a_noop() {
    let mut store: LruStore<String> = LruStore::new(16);
    assert!(!store.remove_oldest());
    assert_eq!(store.used_bytes(), 0);
}

#[test]
fn multiple_evictions_in_one_add() {
    let mut store: LruStore<String> = LruStore::new(8);
    store.add("k1", "v1".to_string());
    store.add("k2", "v2".to_string());
    // One entry as large as the full budget displaces both residents.
    store.add("kx", "123456".to_string());
    assert_eq!(store.len(), 1);
    assert!(store.get("kx").is_some());
}
