//! Test doubles shared by unit and integration tests.
//!
//! Compiled for `cfg(test)` and for the `test-support` feature, which the
//! integration tests enable through the crate's self dev-dependency.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, Utc};
use complaints_cache::memory::MemoryCache;
use complaints_cache::{Cache, CacheAside, CacheError, CountingObserver};
use complaints_db::memory::MemoryStore;
use mockable::Clock;

use crate::auth::jwt::JwtConfig;
use crate::config::{CacheConfig, DatabaseConfig, LogFormat, ServerConfig};
use crate::state::{AppState, Stores};

pub const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

/// A clock that only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance(&self, delta: Duration) {
        *self.lock_clock() +=
            TimeDelta::from_std(delta).expect("duration should fit in a TimeDelta");
    }

    pub fn advance_minutes(&self, minutes: i64) {
        *self.lock_clock() += TimeDelta::minutes(minutes);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        self.0.lock().expect("clock mutex should not be poisoned")
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// A cache backend that is always down.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableCache;

#[async_trait]
impl Cache for UnavailableCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Backend("connection refused".into()))
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Backend("connection refused".into()))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::Backend("connection refused".into()))
    }
}

/// A `ServerConfig` with safe defaults and the test JWT secret.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            max_connections: 1,
            acquire_timeout_secs: 1,
        },
        cache: CacheConfig {
            redis_url: None,
            ttl_secs: 300,
            io_timeout_ms: 500,
        },
        jwt: JwtConfig::new(TEST_JWT_SECRET),
        admin_bootstrap: None,
        log_format: LogFormat::Pretty,
    }
}

/// Everything a test needs to drive and inspect the services.
pub struct TestHarness {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub cache: Arc<MemoryCache>,
    pub observer: Arc<CountingObserver>,
    pub clock: Arc<MutableClock>,
}

impl TestHarness {
    /// Memory store, memory cache, and a mutable clock at the current time.
    pub fn new() -> Self {
        let cache = Arc::new(MemoryCache::new());
        Self::with_backend(cache.clone(), cache)
    }

    /// Like [`TestHarness::new`], but the services talk to a cache that
    /// always fails. `cache` stays empty.
    pub fn with_unavailable_cache() -> Self {
        Self::with_backend(Arc::new(UnavailableCache), Arc::new(MemoryCache::new()))
    }

    fn with_backend(backend: Arc<dyn Cache>, cache: Arc<MemoryCache>) -> Self {
        let config = test_config();
        let store = Arc::new(MemoryStore::new());
        let observer = Arc::new(CountingObserver::new());
        let clock = Arc::new(MutableClock::new(Utc::now()));
        let aside = CacheAside::with_observer(backend, observer.clone(), config.cache.ttl());

        let state = AppState::new(config, Stores::memory(store.clone()), aside, clock.clone());

        Self {
            state,
            store,
            cache,
            observer,
            clock,
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
