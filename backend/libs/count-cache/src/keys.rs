//! Count cache key schema
//!
//! Every key is built from `(entity kind, user id, metric)`.
//! Key format: v{VERSION}:{entity}:{user_id}:{metric}

use std::fmt;
use uuid::Uuid;

/// Cache schema version - increment when changing key formats
pub const CACHE_VERSION: u32 = 1;

/// Kind of entity a cached count belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::User => "user",
        }
    }
}

/// Aggregate metric stored under a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    FollowersCount,
    FollowingCount,
    PostsCount,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::FollowersCount => "followers_count",
            Metric::FollowingCount => "following_count",
            Metric::PostsCount => "posts_count",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub entity: EntityKind,
    pub user_id: Uuid,
    pub metric: Metric,
}

impl CacheKey {
    pub fn new(entity: EntityKind, user_id: Uuid, metric: Metric) -> Self {
        Self {
            entity,
            user_id,
            metric,
        }
    }

    /// Format: v1:user:{user_id}:followers_count
    pub fn followers_count(user_id: Uuid) -> Self {
        Self::new(EntityKind::User, user_id, Metric::FollowersCount)
    }

    /// Format: v1:user:{user_id}:following_count
    pub fn following_count(user_id: Uuid) -> Self {
        Self::new(EntityKind::User, user_id, Metric::FollowingCount)
    }

    /// Format: v1:user:{user_id}:posts_count
    pub fn posts_count(user_id: Uuid) -> Self {
        Self::new(EntityKind::User, user_id, Metric::PostsCount)
    }

    /// Keys touched by a follow edge mutation for one endpoint of the edge
    pub fn follow_counts(user_id: Uuid) -> [Self; 2] {
        [
            Self::followers_count(user_id),
            Self::following_count(user_id),
        ]
    }

    /// All count keys of a user
    pub fn user_counts(user_id: Uuid) -> [Self; 3] {
        [
            Self::followers_count(user_id),
            Self::following_count(user_id),
            Self::posts_count(user_id),
        ]
    }

    pub fn render(&self) -> String {
        format!(
            "v{}:{}:{}:{}",
            CACHE_VERSION,
            self.entity.as_str(),
            self.user_id,
            self.metric.as_str()
        )
    }

    /// Extract entity type from a rendered key
    pub fn entity_type(key: &str) -> Option<&str> {
        let mut parts = key.split(':');
        parts.next()?;
        parts.next()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
