//! Single-flight call deduplication.
//!
//! Collapses concurrent calls for the same key into one underlying
//! execution and fans the result out to every waiter. Distinct keys never
//! block each other: the lock only guards call-map membership, never the
//! wrapped execution itself.

use std::future::Future;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

type SharedCall<T> = Shared<BoxFuture<'static, T>>;

/// Per-key deduplication gate.
///
/// The first caller for a key installs a shared call; every overlapping
/// caller joins it instead of starting its own execution. The call-map entry
/// is removed exactly once, by whichever caller finishes first (guarded by
/// pointer identity), so a later burst for the same key starts fresh rather
/// than observing a stale result. Because the call is a [`Shared`] future,
/// any surviving waiter drives it to completion even if the caller that
/// installed it is cancelled.
pub struct SingleFlight<T: Clone> {
    calls: Mutex<FxHashMap<String, SharedCall<T>>>,
}

impl<T> SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates an empty gate.
    #[must_use]
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(FxHashMap::default()),
        }
    }

    /// Runs `fut` for `key`, deduplicating overlapping calls.
    ///
    /// Exactly one execution happens per burst of overlapping callers; all
    /// of them observe the same result.
    pub async fn run<F>(&self, key: &str, fut: F) -> T
    where
        F: Future<Output = T> + Send + 'static,
    {
        let call = {
            let mut calls = self.calls.lock();
            if let Some(existing) = calls.get(key) {
                existing.clone()
            } else {
                let call = fut.boxed().shared();
                calls.insert(key.to_owned(), call.clone());
                call
            }
        };

        let result = call.clone().await;

        let mut calls = self.calls.lock();
        if let Some(existing) = calls.get(key) {
            if existing.ptr_eq(&call) {
                calls.remove(key);
            }
        }
        result
    }

    /// Number of calls currently in flight (or completed but not yet
    /// detached by a finishing caller).
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.calls.lock().len()
    }
}

impl<T> Default for SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn single_caller_gets_the_result() {
        let flight: SingleFlight<u32> = SingleFlight::new();
        let value = flight.run("key", async { 42 }).await;
        assert_eq!(value, 42);
        assert_eq!(flight.in_flight(), 0);
    }

    #[tokio::test]
    async fn overlapping_callers_share_one_execution() {
        let flight: Arc<SingleFlight<String>> = Arc::new(SingleFlight::new());
        let executions = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let flight = Arc::clone(&flight);
            let executions = Arc::clone(&executions);
            handles.push(tokio::spawn(async move {
                flight
                    .run("slow-key", async move {
                        executions.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        "v".to_string()
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), "v");
        }
        assert_eq!(executions.load(Ordering::SeqCst), 1);
        assert_eq!(flight.in_flight(), 0);
    }

    #[tokio::test]
    async fn sequential_bursts_execute_again() {
        let flight: SingleFlight<usize> = SingleFlight::new();
        let executions = Arc::new(AtomicUsize::new(0));

        for expected in 1..=3 {
            let executions = Arc::clone(&executions);
            let got = flight
                .run("key", async move {
                    executions.fetch_add(1, Ordering::SeqCst) + 1
                })
                .await;
            assert_eq!(got, expected);
        }
        assert_eq!(executions.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn distinct_keys_do_not_block_each_other() {
        let flight: Arc<SingleFlight<&'static str>> = Arc::new(SingleFlight::new());

        // Key A is stuck until we allow it to finish; key B must complete
        // regardless.
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let slow = {
            let flight = Arc::clone(&flight);
            tokio::spawn(async move {
                flight
                    .run("a", async move {
                        let _ = rx.await;
                        "a-done"
                    })
                    .await
            })
        };

        let fast = tokio::time::timeout(
            Duration::from_secs(1),
            flight.run("b", async { "b-done" }),
        )
        .await
        .expect("key b must not wait on key a");
        assert_eq!(fast, "b-done");

        tx.send(()).unwrap();
        assert_eq!(slow.await.unwrap(), "a-done");
    }

    #[tokio::test]
    async fn errors_fan_out_to_all_waiters() {
        let flight: Arc<SingleFlight<Result<u32, String>>> = Arc::new(SingleFlight::new());
        let executions = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let flight = Arc::clone(&flight);
            let executions = Arc::clone(&executions);
            handles.push(tokio::spawn(async move {
                flight
                    .run("bad", async move {
                        executions.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Err::<u32, _>("boom".to_string())
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Err("boom".to_string()));
        }
        assert_eq!(executions.load(Ordering::SeqCst), 1);
    }
}
