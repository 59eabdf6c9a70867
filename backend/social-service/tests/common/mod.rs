//! Shared fixtures: in-memory stores and cache wired into the services
#![allow(dead_code)]

use count_cache::{CacheBackend, CacheError, CacheResult, CountCache, MemoryCache};
use social_service::app::{AppState, Stores};
use social_service::config::SocialConfig;
use social_service::domain::{FollowEdge, User};
use social_service::error::ServiceResult;
use social_service::repository::{FollowStore, MemoryFollowStore, MemoryPostStore, MemoryUserStore};
use social_service::services::{
    ChatHub, FeedComposer, FeedPolicy, FollowService, PostService,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub struct TestEnv {
    pub users: Arc<MemoryUserStore>,
    pub follow_store: Arc<MemoryFollowStore>,
    pub post_store: Arc<MemoryPostStore>,
    pub cache: CountCache,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_cache(CountCache::in_memory())
    }

    pub fn with_cache(cache: CountCache) -> Self {
        Self {
            users: Arc::new(MemoryUserStore::new()),
            follow_store: Arc::new(MemoryFollowStore::new()),
            post_store: Arc::new(MemoryPostStore::new()),
            cache,
        }
    }

    pub async fn user(&self, username: &str) -> User {
        self.users.insert(username).await
    }

    pub fn follow_service(&self) -> FollowService {
        FollowService::new(
            self.follow_store.clone(),
            self.users.clone(),
            self.cache.clone(),
        )
    }

    pub fn post_service(&self, search_per_minute: u32) -> PostService {
        PostService::new(self.post_store.clone(), self.cache.clone(), search_per_minute)
    }

    pub fn feed(&self, include_own_posts: bool) -> FeedComposer {
        FeedComposer::new(
            self.follow_store.clone(),
            self.post_store.clone(),
            FeedPolicy { include_own_posts },
        )
    }
}

pub fn social_config() -> SocialConfig {
    SocialConfig {
        search_rate_limit_per_minute: 30,
        feed_include_own_posts: false,
        chat_channel_capacity: 16,
    }
}

/// Full application state over in-memory stores
pub fn app_state(users: Arc<MemoryUserStore>, hub: Arc<ChatHub>) -> AppState {
    AppState::new(
        Stores::in_memory(users),
        CountCache::in_memory(),
        &social_config(),
        hub,
    )
}

/// Backend whose every call fails, as if Redis were unreachable
pub struct DownBackend;

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

/// In-memory backend whose deletes start failing after `healthy_deletes` calls
pub struct FlakyBackend {
    inner: MemoryCache,
    deletes: AtomicU32,
    healthy_deletes: u32,
}

impl FlakyBackend {
    pub fn new(healthy_deletes: u32) -> Self {
        Self {
            inner: MemoryCache::new(),
            deletes: AtomicU32::new(0),
            healthy_deletes,
        }
    }
}

#[async_trait::async_trait]
impl CacheBackend for FlakyBackend {
    async fn get_raw(&self, key: &str) -> CacheResult<Option<String>> {
        self.inner.get_raw(key).await
    }

    async fn set_raw(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()> {
        self.inner.set_raw(key, value, ttl).await
    }

    async fn del(&self, key: &str) -> CacheResult<()> {
        if self.deletes.fetch_add(1, Ordering::SeqCst) >= self.healthy_deletes {
            return Err(CacheError::Unavailable("connection reset".into()));
        }
        self.inner.del(key).await
    }
}

/// Follow store whose existence check is stale: it answers `edge_exists`
/// with a fixed value, then every write finds the row already changed by
/// someone else.
pub struct RacingFollowStore {
    inner: MemoryFollowStore,
    stale_exists: bool,
    pub writes: AtomicU32,
}

impl RacingFollowStore {
    pub fn new(stale_exists: bool) -> Self {
        Self {
            inner: MemoryFollowStore::new(),
            stale_exists,
            writes: AtomicU32::new(0),
        }
    }
}

#[async_trait::async_trait]
impl FollowStore for RacingFollowStore {
    async fn insert_edge(&self, _follower_id: Uuid, _followed_id: Uuid) -> ServiceResult<bool> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(false)
    }

    async fn delete_edge(&self, _follower_id: Uuid, _followed_id: Uuid) -> ServiceResult<bool> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(false)
    }

    async fn edge_exists(&self, _follower_id: Uuid, _followed_id: Uuid) -> ServiceResult<bool> {
        Ok(self.stale_exists)
    }

    async fn edges_from(&self, user_id: Uuid) -> ServiceResult<Vec<Uuid>> {
        self.inner.edges_from(user_id).await
    }

    async fn edges_to(&self, user_id: Uuid) -> ServiceResult<Vec<Uuid>> {
        self.inner.edges_to(user_id).await
    }

    async fn count_from(&self, user_id: Uuid) -> ServiceResult<i64> {
        self.inner.count_from(user_id).await
    }

    async fn count_to(&self, user_id: Uuid) -> ServiceResult<i64> {
        self.inner.count_to(user_id).await
    }

    async fn page_from(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<FollowEdge>> {
        self.inner.page_from(user_id, limit, offset).await
    }

    async fn page_to(&self, user_id: Uuid, limit: i64, offset: i64) -> ServiceResult<Vec<FollowEdge>> {
        self.inner.page_to(user_id, limit, offset).await
    }
}
