//! Key/value cache used in front of the complaint and category stores.
//!
//! - [`Cache`] -- the backend port: string keys, JSON string values, TTL.
//! - [`memory::MemoryCache`] -- in-process backend.
//! - [`redis::RedisCache`] -- Redis backend over a `bb8` pool.
//! - [`aside::CacheAside`] -- the read-through / write-invalidate helper the
//!   services use. It never surfaces a cache failure to its caller.
//! - [`observer`] -- hooks that receive hits, misses, and swallowed failures.

use std::time::Duration;

use async_trait::async_trait;

pub mod aside;
pub mod memory;
pub mod observer;
pub mod redis;

pub use aside::CacheAside;
pub use observer::{CacheObserver, CacheOp, CountingObserver, TracingObserver};

/// Failure raised by a cache backend or while decoding a cached value.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),

    #[error("cache call timed out after {0:?}")]
    Timeout(Duration),

    #[error("cached value could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A key/value store with per-entry expiry.
///
/// `get` returns `Ok(None)` for a missing or expired key; a miss is not an
/// error.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;
    /// Deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}
