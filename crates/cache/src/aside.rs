//! Cache-aside reads and synchronous invalidation.
//!
//! Services call [`CacheAside::get_json`] before reading the store,
//! [`CacheAside::put_json`] after a miss, and [`CacheAside::invalidate`]
//! after every acknowledged write. None of these return an error: a backend
//! failure is reported to the observer and treated as a miss, so the store
//! stays the source of truth. If an invalidation fails, the stale entry
//! lives at most until its TTL runs out.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::observer::{CacheObserver, CacheOp, TracingObserver};
use crate::{Cache, CacheError};

#[derive(Clone)]
pub struct CacheAside {
    backend: Arc<dyn Cache>,
    observer: Arc<dyn CacheObserver>,
    ttl: Duration,
}

impl CacheAside {
    /// Cache-aside over `backend`, reporting to [`TracingObserver`].
    pub fn new(backend: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self::with_observer(backend, Arc::new(TracingObserver), ttl)
    }

    pub fn with_observer(
        backend: Arc<dyn Cache>,
        observer: Arc<dyn CacheObserver>,
        ttl: Duration,
    ) -> Self {
        Self {
            backend,
            observer,
            ttl,
        }
    }

    /// The cached value under `key`, or `None` on a miss, an unreachable
    /// backend, or an undecodable entry.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.observer.miss(key);
                return None;
            }
            Err(err) => {
                self.observer.failure(CacheOp::Get, key, &err);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                self.observer.hit(key);
                Some(value)
            }
            Err(err) => {
                // The repopulating put overwrites the bad entry.
                self.observer
                    .failure(CacheOp::Decode, key, &CacheError::Serialization(err));
                None
            }
        }
    }

    /// Store `value` under `key` with the configured TTL.
    pub async fn put_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                self.observer
                    .failure(CacheOp::Set, key, &CacheError::Serialization(err));
                return;
            }
        };
        if let Err(err) = self.backend.set(key, &raw, self.ttl).await {
            self.observer.failure(CacheOp::Set, key, &err);
        }
    }

    /// Delete every key in `keys`, in order. A failed delete does not stop
    /// the remaining ones.
    pub async fn invalidate<K: AsRef<str>>(&self, keys: &[K]) {
        for key in keys {
            let key = key.as_ref();
            match self.backend.delete(key).await {
                Ok(()) => tracing::debug!(key, "Cache key invalidated"),
                Err(err) => self.observer.failure(CacheOp::Delete, key, &err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::memory::MemoryCache;
    use crate::observer::CountingObserver;

    /// Backend whose every call fails.
    struct DownCache;

    #[async_trait]
    impl Cache for DownCache {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Backend("connection refused".into()))
        }

        async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Backend("connection refused".into()))
        }

        async fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::Timeout(Duration::from_millis(500)))
        }
    }

    fn aside_over(backend: Arc<dyn Cache>) -> (CacheAside, Arc<CountingObserver>) {
        let observer = Arc::new(CountingObserver::new());
        let aside = CacheAside::with_observer(backend, observer.clone(), Duration::from_secs(300));
        (aside, observer)
    }

    #[tokio::test]
    async fn miss_then_hit() {
        let (aside, observer) = aside_over(Arc::new(MemoryCache::new()));

        assert_eq!(aside.get_json::<Vec<u32>>("nums").await, None);
        aside.put_json("nums", &vec![1, 2, 3]).await;
        assert_eq!(aside.get_json::<Vec<u32>>("nums").await, Some(vec![1, 2, 3]));

        assert_eq!(observer.misses(), 1);
        assert_eq!(observer.hits(), 1);
        assert_eq!(observer.failures(), 0);
    }

    #[tokio::test]
    async fn invalidate_removes_every_key() {
        let backend = Arc::new(MemoryCache::new());
        let (aside, _) = aside_over(backend.clone());
        aside.put_json("a", "1").await;
        aside.put_json("b", "2").await;

        aside.invalidate(&["a", "b", "never-set"]).await;

        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn undecodable_entry_is_a_reported_miss() {
        let backend = Arc::new(MemoryCache::new());
        backend
            .set("list", "{not json", Duration::from_secs(60))
            .await
            .unwrap();
        let (aside, observer) = aside_over(backend);

        assert_eq!(aside.get_json::<Vec<String>>("list").await, None);
        assert_eq!(observer.failures(), 1);
    }

    #[tokio::test]
    async fn backend_failures_are_swallowed_and_counted() {
        let (aside, observer) = aside_over(Arc::new(DownCache));

        assert_eq!(aside.get_json::<String>("k").await, None);
        aside.put_json("k", "v").await;
        aside.invalidate(&["k", "other"]).await;

        assert_eq!(observer.failures(), 4);
        assert_eq!(observer.hits(), 0);
    }
}
