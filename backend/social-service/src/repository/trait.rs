use crate::domain::{FollowEdge, Post, User};
use crate::error::ServiceResult;
use uuid::Uuid;

/// Persistence of directed follow edges.
///
/// Implemented by `PgFollowStore` (PostgreSQL) and `MemoryFollowStore`
/// (tests). Only `services::follow` is allowed to call the mutating methods,
/// since it is the one place that also invalidates the affected counts.
#[async_trait::async_trait]
pub trait FollowStore: Send + Sync {
    /// Insert `follower -> followed`. Returns false when the edge already existed.
    async fn insert_edge(&self, follower_id: Uuid, followed_id: Uuid) -> ServiceResult<bool>;

    /// Delete `follower -> followed`. Returns false when there was no such edge.
    async fn delete_edge(&self, follower_id: Uuid, followed_id: Uuid) -> ServiceResult<bool>;

    async fn edge_exists(&self, follower_id: Uuid, followed_id: Uuid) -> ServiceResult<bool>;

    /// Ids of every user `user_id` follows
    async fn edges_from(&self, user_id: Uuid) -> ServiceResult<Vec<Uuid>>;

    /// Ids of every user following `user_id`.
    ///
    /// Inverse of `edges_from`, kept so both directions of the relation can be
    /// read whole. Paged follower listings go through `page_to` instead.
    async fn edges_to(&self, user_id: Uuid) -> ServiceResult<Vec<Uuid>>;

    /// Number of users `user_id` follows
    async fn count_from(&self, user_id: Uuid) -> ServiceResult<i64>;

    /// Number of followers of `user_id`
    async fn count_to(&self, user_id: Uuid) -> ServiceResult<i64>;

    /// Outgoing edges, newest first
    async fn page_from(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<FollowEdge>>;

    /// Incoming edges, newest first
    async fn page_to(&self, user_id: Uuid, limit: i64, offset: i64)
        -> ServiceResult<Vec<FollowEdge>>;
}

/// Persistence of posts
#[async_trait::async_trait]
pub trait PostStore: Send + Sync {
    async fn insert(&self, author_id: Uuid, title: &str, body: &str) -> ServiceResult<Post>;

    async fn find(&self, post_id: Uuid) -> ServiceResult<Option<Post>>;

    /// Overwrite title and body; `None` when the post no longer exists
    async fn update(&self, post_id: Uuid, title: &str, body: &str) -> ServiceResult<Option<Post>>;

    async fn delete(&self, post_id: Uuid) -> ServiceResult<bool>;

    /// All posts, newest first
    async fn recent(&self, limit: i64, offset: i64) -> ServiceResult<Vec<Post>>;

    /// Posts written by any of `author_ids`, newest first
    async fn recent_by_authors(
        &self,
        author_ids: &[Uuid],
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Post>>;

    async fn count_by_author(&self, author_id: Uuid) -> ServiceResult<i64>;

    /// Case-insensitive substring match over title and body, newest first
    async fn search(&self, needle: &str, limit: i64, offset: i64) -> ServiceResult<Vec<Post>>;
}

/// Read access to users plus the avatar reference, the only field this
/// service mutates
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, user_id: Uuid) -> ServiceResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> ServiceResult<Option<User>>;

    /// Users with the given ids, in the order of `user_ids`; unknown ids are skipped
    async fn find_many(&self, user_ids: &[Uuid]) -> ServiceResult<Vec<User>>;

    async fn update_avatar(&self, user_id: Uuid, avatar: &str) -> ServiceResult<bool>;
}
