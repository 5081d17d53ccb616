//! Redis cache backend over a `bb8` connection pool.
//!
//! Every call (pool checkout plus the command) is bounded by `io_timeout`, so
//! a slow or unreachable Redis degrades reads to the store instead of
//! stalling requests.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::bb8::Pool;
use bb8_redis::redis::{cmd, RedisError};
use bb8_redis::RedisConnectionManager;

use crate::{Cache, CacheError};

/// Default upper bound on pooled Redis connections.
const DEFAULT_MAX_CONNECTIONS: u32 = 16;

impl From<RedisError> for CacheError {
    fn from(err: RedisError) -> Self {
        CacheError::Backend(err.to_string())
    }
}

#[derive(Clone)]
pub struct RedisCache {
    pool: Pool<RedisConnectionManager>,
    io_timeout: Duration,
}

impl RedisCache {
    /// Build a pool for `url`. Connections are opened lazily, so this
    /// succeeds even if Redis is currently down.
    pub fn new(url: &str, io_timeout: Duration) -> Result<Self, CacheError> {
        let manager = RedisConnectionManager::new(url)?;
        let pool = Pool::builder()
            .max_size(DEFAULT_MAX_CONNECTIONS)
            .connection_timeout(io_timeout)
            .build_unchecked(manager);
        Ok(Self { pool, io_timeout })
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, CacheError>
    where
        F: Future<Output = Result<T, CacheError>>,
    {
        tokio::time::timeout(self.io_timeout, fut)
            .await
            .map_err(|_| CacheError::Timeout(self.io_timeout))?
    }

    async fn connection(
        &self,
    ) -> Result<bb8_redis::bb8::PooledConnection<'_, RedisConnectionManager>, CacheError> {
        self.pool
            .get()
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.bounded(async {
            let mut conn = self.connection().await?;
            let value: Option<String> = cmd("GET").arg(key).query_async(&mut *conn).await?;
            Ok(value)
        })
        .await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        // Redis rejects EX 0; a sub-second TTL is rounded up.
        let seconds = ttl.as_secs().max(1);
        self.bounded(async {
            let mut conn = self.connection().await?;
            let () = cmd("SET")
                .arg(key)
                .arg(value)
                .arg("EX")
                .arg(seconds)
                .query_async(&mut *conn)
                .await?;
            Ok(())
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.bounded(async {
            let mut conn = self.connection().await?;
            let _removed: i64 = cmd("DEL").arg(key).query_async(&mut *conn).await?;
            Ok(())
        })
        .await
    }
}
