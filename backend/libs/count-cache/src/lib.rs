//! Read-through count cache
//!
//! Memoizes per-user aggregate counts (followers, following, posts) with:
//! - A versioned key schema built from `(entity, user_id, metric)`
//! - `remember` / `forget` semantics over a pluggable backend
//! - Redis and in-process backends
//! - Metrics integration
//!
//! Cached counts are never a source of truth. Writers forget the affected keys
//! in the same operation that mutates the underlying rows, so the next read
//! recomputes.

mod error;
mod keys;
mod metrics;

pub mod memory;
pub mod redis_store;

pub use error::{CacheError, CacheResult};
pub use keys::{CacheKey, EntityKind, Metric, CACHE_VERSION};
pub use memory::MemoryCache;
pub use metrics::CacheMetrics;
pub use redis_store::RedisCache;

use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

/// Default TTL values
pub mod ttl {
    use std::time::Duration;

    /// Follower / following / post counts (2 hours)
    pub const COUNTS: Duration = Duration::from_secs(2 * 60 * 60);
}

/// Raw key-value operations a cache backend must provide
#[async_trait::async_trait]
pub trait CacheBackend: Send + Sync {
    /// Get a raw value, `None` when absent or expired
    async fn get_raw(&self, key: &str) -> CacheResult<Option<String>>;

    /// Store a raw value with TTL
    async fn set_raw(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()>;

    /// Delete a key; deleting a missing key is not an error
    async fn del(&self, key: &str) -> CacheResult<()>;

    /// Delete several keys
    async fn del_many(&self, keys: &[String]) -> CacheResult<()> {
        for key in keys {
            self.del(key).await?;
        }
        Ok(())
    }
}

/// Count cache service, constructed once at startup and shared by handle
#[derive(Clone)]
pub struct CountCache {
    backend: Arc<dyn CacheBackend>,
    metrics: CacheMetrics,
    default_ttl: Duration,
}

impl CountCache {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend,
            metrics: CacheMetrics::new(),
            default_ttl: ttl::COUNTS,
        }
    }

    /// Count cache backed by an in-process map
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryCache::new()))
    }

    pub fn with_default_ttl(mut self, default_ttl: Duration) -> Self {
        self.default_ttl = default_ttl;
        self
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Read a cached value without computing it on a miss
    pub async fn peek<T: DeserializeOwned>(&self, key: &CacheKey) -> CacheResult<Option<T>> {
        let key = key.render();

        let raw = match self.backend.get_raw(&key).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache get error");
                self.metrics.record_error(&key, "backend");
                return Err(e);
            }
        };

        match raw {
            Some(data) => match serde_json::from_str::<T>(&data) {
                Ok(value) => {
                    debug!(key = %key, "Cache hit");
                    self.metrics.record_hit(&key);
                    Ok(Some(value))
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Cache deserialization failed");
                    self.metrics.record_error(&key, "deserialize");
                    // Drop the corrupted entry so the next read recomputes
                    if let Err(del_err) = self.backend.del(&key).await {
                        warn!(key = %key, error = %del_err, "Failed to drop corrupted cache entry");
                        self.metrics.record_error(&key, "backend");
                    }
                    Ok(None)
                }
            },
            None => {
                debug!(key = %key, "Cache miss");
                self.metrics.record_miss(&key);
                Ok(None)
            }
        }
    }

    /// Store a value under `key` for `ttl`
    pub async fn put<T: Serialize>(&self, key: &CacheKey, value: &T, ttl: Duration) -> CacheResult<()> {
        let key = key.render();
        let data = serde_json::to_string(value)?;

        if let Err(e) = self.backend.set_raw(&key, data, ttl).await {
            warn!(key = %key, error = %e, "Cache set error");
            self.metrics.record_error(&key, "backend");
            return Err(e);
        }

        debug!(key = %key, ttl_secs = ttl.as_secs(), "Cache set");
        self.metrics.record_write(&key);
        Ok(())
    }

    /// Return the cached value, or compute, store and return it.
    pub async fn remember<T, E, F, Fut>(&self, key: &CacheKey, ttl: Duration, compute: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.peek::<T>(key).await? {
            return Ok(cached);
        }

        let value = compute().await?;
        self.put(key, &value, ttl).await?;
        Ok(value)
    }

    /// `remember` with the cache's default TTL
    pub async fn remember_default<T, E, F, Fut>(&self, key: &CacheKey, compute: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.remember(key, self.default_ttl, compute).await
    }

    /// Remove an entry unconditionally. Idempotent.
    pub async fn forget(&self, key: &CacheKey) -> CacheResult<()> {
        let key = key.render();

        if let Err(e) = self.backend.del(&key).await {
            warn!(key = %key, error = %e, "Cache delete error");
            self.metrics.record_error(&key, "backend");
            return Err(e);
        }

        debug!(key = %key, "Cache forget");
        self.metrics.record_invalidation(&key);
        Ok(())
    }

    pub async fn forget_many(&self, keys: &[CacheKey]) -> CacheResult<()> {
        if keys.is_empty() {
            return Ok(());
        }

        let rendered: Vec<String> = keys.iter().map(CacheKey::render).collect();

        if let Err(e) = self.backend.del_many(&rendered).await {
            warn!(count = rendered.len(), error = %e, "Cache batch delete error");
            for key in &rendered {
                self.metrics.record_error(key, "backend");
            }
            return Err(e);
        }

        for key in &rendered {
            self.metrics.record_invalidation(key);
        }
        debug!(count = rendered.len(), "Cache forget many");
        Ok(())
    }

    /// Forget the follower and following counts of a user
    pub async fn clear_follow_counts(&self, user_id: Uuid) -> CacheResult<()> {
        self.forget_many(&CacheKey::follow_counts(user_id)).await
    }

    /// Forget every count of a user
    pub async fn clear_user_counts(&self, user_id: Uuid) -> CacheResult<()> {
        self.forget_many(&CacheKey::user_counts(user_id)).await
    }
}
