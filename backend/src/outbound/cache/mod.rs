//! Redis-backed verdict cache adapter.
//!
//! Verdicts are stored as JSON under `check-email:{domain}` keys with a
//! per-entry TTL, so entries expire on their own and the cache never needs
//! a sweeper. All operations go through a bb8 connection pool.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::redis::AsyncCommands;
use bb8_redis::{bb8, redis, RedisConnectionManager};

use crate::domain::ports::{VerdictCache, VerdictCacheError, VerdictCacheKey};
use crate::domain::CheckOutcome;

/// Configuration for the Redis connection pool.
#[derive(Debug, Clone)]
pub struct RedisCacheConfig {
    redis_url: String,
    max_size: u32,
    connection_timeout: Duration,
}

impl RedisCacheConfig {
    /// Create a configuration with defaults: 10 connections, 5 second
    /// checkout timeout.
    pub fn new(redis_url: impl Into<String>) -> Self {
        Self {
            redis_url: redis_url.into(),
            max_size: 10,
            connection_timeout: Duration::from_secs(5),
        }
    }

    /// Set the maximum number of pooled connections.
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set the connection checkout timeout.
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }
}

/// Redis implementation of the `VerdictCache` port.
#[derive(Clone)]
pub struct RedisVerdictCache {
    pool: bb8::Pool<RedisConnectionManager>,
}

impl RedisVerdictCache {
    /// Build the connection pool and verify the URL parses.
    ///
    /// # Errors
    ///
    /// Returns [`VerdictCacheError::Backend`] if the URL is invalid or the
    /// pool cannot be constructed.
    pub async fn connect(config: RedisCacheConfig) -> Result<Self, VerdictCacheError> {
        let manager = RedisConnectionManager::new(config.redis_url.as_str())
            .map_err(|err| VerdictCacheError::backend(err.to_string()))?;
        let pool = bb8::Pool::builder()
            .max_size(config.max_size)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|err| VerdictCacheError::backend(err.to_string()))?;
        Ok(Self { pool })
    }

    async fn conn(
        &self,
    ) -> Result<bb8::PooledConnection<'_, RedisConnectionManager>, VerdictCacheError> {
        self.pool
            .get()
            .await
            .map_err(|err| VerdictCacheError::backend(err.to_string()))
    }
}

fn encode(outcome: &CheckOutcome) -> Result<String, VerdictCacheError> {
    serde_json::to_string(outcome).map_err(|err| VerdictCacheError::serialization(err.to_string()))
}

fn decode(payload: &str) -> Result<CheckOutcome, VerdictCacheError> {
    serde_json::from_str(payload).map_err(|err| VerdictCacheError::serialization(err.to_string()))
}

fn ttl_seconds(ttl: Duration) -> u64 {
    // Redis rejects a zero expiry, so clamp to at least one second.
    ttl.as_secs().max(1)
}

#[async_trait]
impl VerdictCache for RedisVerdictCache {
    async fn get(
        &self,
        key: &VerdictCacheKey,
    ) -> Result<Option<CheckOutcome>, VerdictCacheError> {
        let mut conn = self.conn().await?;
        let payload: Option<String> = conn
            .get(key.as_str())
            .await
            .map_err(|err| VerdictCacheError::backend(err.to_string()))?;
        payload.as_deref().map(decode).transpose()
    }

    async fn put(
        &self,
        key: &VerdictCacheKey,
        outcome: &CheckOutcome,
        ttl: Duration,
    ) -> Result<(), VerdictCacheError> {
        let payload = encode(outcome)?;
        let mut conn = self.conn().await?;
        let _: () = conn
            .set_ex(key.as_str(), payload, ttl_seconds(ttl))
            .await
            .map_err(|err| VerdictCacheError::backend(err.to_string()))?;
        Ok(())
    }

    async fn invalidate(&self, key: &VerdictCacheKey) -> Result<(), VerdictCacheError> {
        let mut conn = self.conn().await?;
        let _: () = conn
            .del(key.as_str())
            .await
            .map_err(|err| VerdictCacheError::backend(err.to_string()))?;
        Ok(())
    }

    async fn put_many(
        &self,
        entries: Vec<(VerdictCacheKey, CheckOutcome)>,
        ttl: Duration,
    ) -> Result<(), VerdictCacheError> {
        if entries.is_empty() {
            return Ok(());
        }
        let seconds = ttl_seconds(ttl);
        let mut pipe = redis::pipe();
        for (key, outcome) in &entries {
            pipe.set_ex(key.as_str(), encode(outcome)?, seconds).ignore();
        }
        let mut conn = self.conn().await?;
        let _: () = pipe
            .query_async(&mut *conn)
            .await
            .map_err(|err| VerdictCacheError::backend(err.to_string()))?;
        Ok(())
    }
}
