/// Integration tests for the count cache over the in-process backend
use count_cache::{CacheBackend, CacheError, CacheKey, CacheResult, CountCache, MemoryCache};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

async fn count_from(calls: &AtomicU32, value: i64) -> Result<i64, CacheError> {
    calls.fetch_add(1, Ordering::SeqCst);
    Ok(value)
}

#[tokio::test]
async fn test_remember_computes_once_until_forgotten() {
    let cache = CountCache::in_memory();
    let key = CacheKey::followers_count(Uuid::new_v4());
    let calls = AtomicU32::new(0);

    let first: i64 = cache
        .remember(&key, Duration::from_secs(60), || count_from(&calls, 3))
        .await
        .unwrap();
    let second: i64 = cache
        .remember(&key, Duration::from_secs(60), || count_from(&calls, 99))
        .await
        .unwrap();

    assert_eq!(first, 3);
    assert_eq!(second, 3, "second read must come from cache");
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    cache.forget(&key).await.unwrap();

    let third: i64 = cache
        .remember(&key, Duration::from_secs(60), || count_from(&calls, 4))
        .await
        .unwrap();
    assert_eq!(third, 4, "read after forget must recompute");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_forget_is_idempotent() {
    let cache = CountCache::in_memory();
    let key = CacheKey::following_count(Uuid::new_v4());

    cache.forget(&key).await.unwrap();
    cache.forget(&key).await.unwrap();
    assert!(cache.peek::<i64>(&key).await.unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_remember_recomputes_after_ttl() {
    let cache = CountCache::in_memory();
    let key = CacheKey::posts_count(Uuid::new_v4());
    let calls = AtomicU32::new(0);

    let _: i64 = cache
        .remember(&key, Duration::from_secs(30), || count_from(&calls, 1))
        .await
        .unwrap();

    tokio::time::advance(Duration::from_secs(31)).await;

    let value: i64 = cache
        .remember(&key, Duration::from_secs(30), || count_from(&calls, 2))
        .await
        .unwrap();
    assert_eq!(value, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_clear_follow_counts_keeps_posts_count() {
    let cache = CountCache::in_memory();
    let user_id = Uuid::new_v4();
    let ttl = cache.default_ttl();

    cache.put(&CacheKey::followers_count(user_id), &5i64, ttl).await.unwrap();
    cache.put(&CacheKey::following_count(user_id), &6i64, ttl).await.unwrap();
    cache.put(&CacheKey::posts_count(user_id), &7i64, ttl).await.unwrap();

    cache.clear_follow_counts(user_id).await.unwrap();

    assert!(cache
        .peek::<i64>(&CacheKey::followers_count(user_id))
        .await
        .unwrap()
        .is_none());
    assert!(cache
        .peek::<i64>(&CacheKey::following_count(user_id))
        .await
        .unwrap()
        .is_none());
    assert_eq!(
        cache
            .peek::<i64>(&CacheKey::posts_count(user_id))
            .await
            .unwrap(),
        Some(7)
    );

    cache.clear_user_counts(user_id).await.unwrap();
    assert!(cache
        .peek::<i64>(&CacheKey::posts_count(user_id))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_corrupted_entry_is_treated_as_miss() {
    let backend = Arc::new(MemoryCache::new());
    let cache = CountCache::new(backend.clone());
    let key = CacheKey::followers_count(Uuid::new_v4());

    backend
        .set_raw(&key.render(), "not-a-number".to_string(), Duration::from_secs(60))
        .await
        .unwrap();

    let calls = AtomicU32::new(0);
    let value: i64 = cache
        .remember(&key, Duration::from_secs(60), || count_from(&calls, 8))
        .await
        .unwrap();

    assert_eq!(value, 8);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

/// Serves a corrupt value and cannot delete it
struct StuckCorruptBackend {
    deletes: AtomicU32,
}

#[async_trait::async_trait]
impl CacheBackend for StuckCorruptBackend {
    async fn get_raw(&self, _key: &str) -> CacheResult<Option<String>> {
        Ok(Some("{not json".to_string()))
    }

    async fn set_raw(&self, _key: &str, _value: String, _ttl: Duration) -> CacheResult<()> {
        Ok(())
    }

    async fn del(&self, _key: &str) -> CacheResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::Unavailable("read-only replica".into()))
    }
}

#[tokio::test]
async fn test_failed_cleanup_of_corrupt_entry_is_still_a_miss() {
    let backend = Arc::new(StuckCorruptBackend {
        deletes: AtomicU32::new(0),
    });
    let cache = CountCache::new(backend.clone());
    let key = CacheKey::posts_count(Uuid::new_v4());

    let peeked = cache.peek::<i64>(&key).await.unwrap();
    assert!(peeked.is_none());
    assert_eq!(backend.deletes.load(Ordering::SeqCst), 1);

    let calls = AtomicU32::new(0);
    let value: i64 = cache
        .remember(&key, Duration::from_secs(60), || count_from(&calls, 5))
        .await
        .unwrap();
    assert_eq!(value, 5);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

struct DownBackend;

#[async_trait::async_trait]
impl CacheBackend for DownBackend {
    async fn get_raw(&self, _key: &str) -> CacheResult<Option<String>> {
        Err(CacheError::Unavailable("connection refused".into()))
    }

    async fn set_raw(&self, _key: &str, _value: String, _ttl: Duration) -> CacheResult<()> {
        Err(CacheError::Unavailable("connection refused".into()))
    }

    async fn del(&self, _key: &str) -> CacheResult<()> {
        Err(CacheError::Unavailable("connection refused".into()))
    }
}

#[tokio::test]
async fn test_backend_failure_propagates() {
    let cache = CountCache::new(Arc::new(DownBackend));
    let key = CacheKey::followers_count(Uuid::new_v4());
    let calls = AtomicU32::new(0);

    let result: Result<i64, CacheError> = cache
        .remember(&key, Duration::from_secs(60), || count_from(&calls, 1))
        .await;

    assert!(matches!(result, Err(CacheError::Unavailable(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 0, "compute must not run when the cache is down");
    assert!(cache.forget(&key).await.is_err());
}
