//! Redis key-expiry cache
//!
//! Thin wrapper over a Redis client exposing the operations the services
//! need: set-with-TTL, get, delete, and a health check. Expiry is enforced
//! by Redis itself; callers never poll for expired keys.

use crate::error::{CacheError, CacheResult};
use redis::{AsyncCommands, Client};
use tracing::info;

/// Configuration for the Redis connection
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis connection URL (e.g., "redis://localhost:6379")
    pub url: String,
}

impl RedisConfig {
    /// Create a new RedisConfig from environment variables
    ///
    /// # Environment Variables
    /// - `REDIS_URL`: Redis connection URL (default: "redis://localhost:6379")
    pub fn from_env() -> CacheResult<Self> {
        let url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        Ok(RedisConfig { url })
    }
}

/// Handle to the Redis cache
///
/// Cloning is cheap; the underlying client multiplexes connections.
#[derive(Clone)]
pub struct RedisPool {
    client: Client,
}

impl RedisPool {
    /// Open a client against the configured Redis instance
    pub fn new(config: &RedisConfig) -> CacheResult<Self> {
        let client = Client::open(config.url.as_str()).map_err(CacheError::Connection)?;
        info!(url = %config.url, "redis client initialized");
        Ok(RedisPool { client })
    }

    async fn connection(&self) -> CacheResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(CacheError::Connection)
    }

    /// Store a value under `key` with the given time-to-live
    ///
    /// An existing value under the same key is overwritten and its TTL
    /// restarted.
    pub async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        let _: () = conn
            .set_ex(key, value, ttl_seconds)
            .await
            .map_err(CacheError::Command)?;
        Ok(())
    }

    /// Fetch the value stored under `key`, if it exists and has not expired
    pub async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection().await?;
        conn.get(key).await.map_err(CacheError::Command)
    }

    /// Remove `key`; removing an absent key is not an error
    pub async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.connection().await?;
        let _: u64 = conn.del(key).await.map_err(CacheError::Command)?;
        Ok(())
    }

    /// Check that Redis is reachable
    pub async fn health_check(&self) -> CacheResult<bool> {
        let mut conn = self.connection().await?;
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(CacheError::Command)?;
        Ok(pong == "PONG")
    }
}
