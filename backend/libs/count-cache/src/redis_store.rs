//! Redis cache backend

use crate::{CacheBackend, CacheError, CacheResult};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;

/// Redis-backed cache. `ConnectionManager` reconnects on its own and is cheap
/// to clone, so each call works on a clone.
#[derive(Clone)]
pub struct RedisCache {
    redis: ConnectionManager,
}

impl RedisCache {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    /// Open a client and build a connection manager from a Redis URL
    pub async fn connect(url: &str) -> CacheResult<Self> {
        let client = redis::Client::open(url).map_err(CacheError::Redis)?;
        let redis = ConnectionManager::new(client)
            .await
            .map_err(CacheError::Redis)?;
        Ok(Self { redis })
    }

    /// PING the server
    pub async fn health_check(&self) -> CacheResult<()> {
        let _: String = redis::cmd("PING")
            .query_async(&mut self.redis.clone())
            .await
            .map_err(CacheError::Redis)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl CacheBackend for RedisCache {
    async fn get_raw(&self, key: &str) -> CacheResult<Option<String>> {
        let value: Option<String> = self
            .redis
            .clone()
            .get(key)
            .await
            .map_err(CacheError::Redis)?;
        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()> {
        // SETEX rejects a zero expiry
        let seconds = ttl.as_secs().max(1);
        let _: () = self
            .redis
            .clone()
            .set_ex(key, value, seconds)
            .await
            .map_err(CacheError::Redis)?;
        Ok(())
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        let _: () = self
            .redis
            .clone()
            .del(key)
            .await
            .map_err(CacheError::Redis)?;
        Ok(())
    }

    async fn del_many(&self, keys: &[String]) -> CacheResult<()> {
        if keys.is_empty() {
            return Ok(());
        }

        let mut pipe = redis::pipe();
        for key in keys {
            pipe.del(key).ignore();
        }

        pipe.query_async::<_, ()>(&mut self.redis.clone())
            .await
            .map_err(CacheError::Redis)?;
        Ok(())
    }
}
