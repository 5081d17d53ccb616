//! Observation hooks for cache activity.
//!
//! [`CacheAside`](crate::CacheAside) swallows every backend failure so a
//! broken cache never fails a request. The observer is where those failures
//! stay visible.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::CacheError;

/// The cache operation a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOp {
    Get,
    Set,
    Delete,
    /// A cached value existed but did not decode into the expected type.
    Decode,
}

impl fmt::Display for CacheOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CacheOp::Get => "get",
            CacheOp::Set => "set",
            CacheOp::Delete => "delete",
            CacheOp::Decode => "decode",
        };
        f.write_str(name)
    }
}

pub trait CacheObserver: Send + Sync {
    fn hit(&self, _key: &str) {}
    fn miss(&self, _key: &str) {}
    fn failure(&self, op: CacheOp, key: &str, error: &CacheError);
}

/// Default observer: structured `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl CacheObserver for TracingObserver {
    fn hit(&self, key: &str) {
        tracing::trace!(key, "Cache hit");
    }

    fn miss(&self, key: &str) {
        tracing::debug!(key, "Cache miss");
    }

    fn failure(&self, op: CacheOp, key: &str, error: &CacheError) {
        tracing::warn!(%op, key, error = %error, "Cache operation failed; continuing without cache");
    }
}

/// Counts hits, misses, and failures. Also logs failures through
/// [`TracingObserver`].
#[derive(Debug, Default)]
pub struct CountingObserver {
    hits: AtomicU64,
    misses: AtomicU64,
    failures: AtomicU64,
}

impl CountingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

impl CacheObserver for CountingObserver {
    fn hit(&self, _key: &str) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn miss(&self, _key: &str) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn failure(&self, op: CacheOp, key: &str, error: &CacheError) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        TracingObserver.failure(op, key, error);
    }
}
