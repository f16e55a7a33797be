//! Shared resolution cache with per-key single-flight.
//!
//! Concurrent resolutions of an equal normalized key must perform the
//! external work at most once and all observe the same result. The map
//! mutex only guards entry creation; the per-key `OnceCell` serializes the
//! compute-and-store, so distinct keys resolve in parallel.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;

use super::Resolution;

type Entry = Arc<OnceCell<Arc<Resolution>>>;

#[derive(Default)]
pub struct ResolutionCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached resolution for `key`, computing it with `resolve`
    /// on first use. Callers racing on the same key share one computation.
    pub async fn get_or_resolve<F, Fut>(&self, key: &str, resolve: F) -> Arc<Resolution>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Resolution>,
    {
        let cell = {
            let mut entries = self.entries.lock().expect("cache mutex poisoned");
            entries
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };
        cell.get_or_init(|| async move { Arc::new(resolve().await) })
            .await
            .clone()
    }

    /// Already-resolved entry for `key`, if any.
    pub fn peek(&self, key: &str) -> Option<Arc<Resolution>> {
        let entries = self.entries.lock().expect("cache mutex poisoned");
        entries.get(key).and_then(|cell| cell.get().cloned())
    }

    /// Insert a previously persisted resolution. Loses to an entry already
    /// present for the key.
    pub fn seed(&self, key: String, resolution: Resolution) {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        entries
            .entry(key)
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .set(Arc::new(resolution))
            .ok();
    }

    /// All resolved entries, for persistence at the end of a run.
    pub fn snapshot(&self) -> Vec<Arc<Resolution>> {
        let entries = self.entries.lock().expect("cache mutex poisoned");
        entries
            .values()
            .filter_map(|cell| cell.get().cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn resolution_with_method(method: &str) -> Resolution {
        Resolution {
            method: method.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn same_key_computes_once() {
        let cache = Arc::new(ResolutionCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let cache = cache.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_resolve("2 old walcott ave, jamestown ri", || async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                        resolution_with_method("number_street_zip")
                    })
                    .await
            }));
        }

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for result in &results {
            assert!(Arc::ptr_eq(result, &results[0]));
        }
    }

    #[tokio::test]
    async fn distinct_keys_compute_separately() {
        let cache = ResolutionCache::new();
        let a = cache
            .get_or_resolve("a", || async { resolution_with_method("m1") })
            .await;
        let b = cache
            .get_or_resolve("b", || async { resolution_with_method("m2") })
            .await;
        assert_eq!(a.method, "m1");
        assert_eq!(b.method, "m2");
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn seeded_entry_is_returned_without_compute() {
        let cache = ResolutionCache::new();
        cache.seed("k".to_string(), resolution_with_method("cached"));
        let hit = cache
            .get_or_resolve("k", || async {
                panic!("seeded key must not recompute");
            })
            .await;
        assert_eq!(hit.method, "cached");
    }

    #[tokio::test]
    async fn second_call_returns_identical_result() {
        let cache = ResolutionCache::new();
        let first = cache
            .get_or_resolve("k", || async { resolution_with_method("m") })
            .await;
        let second = cache
            .get_or_resolve("k", || async { resolution_with_method("other") })
            .await;
        assert!(Arc::ptr_eq(&first, &second));
    }
}
