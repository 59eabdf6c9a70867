use super::rate_limit::UserRateLimiter;
use super::sanitize::strip_tags;
use crate::domain::{Post, PostSummary};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::{page_offset, PostStore};
use count_cache::{CacheKey, CountCache};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

/// Posts per profile and search page
pub const POSTS_PER_PAGE: i64 = 10;

/// Shortest search needle, in characters, that reaches the store
pub const MIN_SEARCH_CHARS: usize = 2;

/// Title and body of a post after tag stripping
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PostInput {
    #[validate(length(min = 3, max = 100, message = "must be between 3 and 100 characters"))]
    pub title: String,
    #[validate(length(min = 10, max = 1000, message = "must be between 10 and 1000 characters"))]
    pub body: String,
}

impl PostInput {
    /// Strip markup and surrounding whitespace, then validate
    pub fn sanitized(title: &str, body: &str) -> ServiceResult<Self> {
        let input = Self {
            title: strip_tags(title).trim().to_string(),
            body: strip_tags(body).trim().to_string(),
        };
        input.validate()?;
        Ok(input)
    }
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostStore>,
    cache: CountCache,
    search_limiter: Arc<UserRateLimiter>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostStore>, cache: CountCache, search_per_minute: u32) -> Self {
        Self {
            posts,
            cache,
            search_limiter: Arc::new(UserRateLimiter::per_minute(search_per_minute)),
        }
    }

    #[tracing::instrument(skip(self, title, body))]
    pub async fn create_post(&self, author_id: Uuid, title: &str, body: &str) -> ServiceResult<Post> {
        let input = PostInput::sanitized(title, body)?;

        let key = CacheKey::posts_count(author_id);
        self.cache.forget(&key).await?;

        let post = self
            .posts
            .insert(author_id, &input.title, &input.body)
            .await?;

        self.forget_after_write(&key).await;

        info!(post_id = %post.id, author = %author_id, "Post created");
        Ok(post)
    }

    pub async fn get_post(&self, post_id: Uuid) -> ServiceResult<Post> {
        self.posts
            .find(post_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Post not found".to_string()))
    }

    #[tracing::instrument(skip(self, title, body))]
    pub async fn update_post(
        &self,
        actor_id: Uuid,
        post_id: Uuid,
        title: &str,
        body: &str,
    ) -> ServiceResult<Post> {
        self.authorize(actor_id, post_id).await?;
        let input = PostInput::sanitized(title, body)?;

        let post = self
            .posts
            .update(post_id, &input.title, &input.body)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Post not found".to_string()))?;

        info!(post_id = %post_id, "Post updated");
        Ok(post)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_post(&self, actor_id: Uuid, post_id: Uuid) -> ServiceResult<()> {
        let post = self.authorize(actor_id, post_id).await?;

        let key = CacheKey::posts_count(post.user_id);
        self.cache.forget(&key).await?;

        if !self.posts.delete(post_id).await? {
            return Err(ServiceError::NotFound("Post not found".to_string()));
        }

        self.forget_after_write(&key).await;

        info!(post_id = %post_id, "Post deleted");
        Ok(())
    }

    /// Posts of one author, newest first
    pub async fn user_posts(&self, user_id: Uuid, page: u32) -> ServiceResult<Vec<PostSummary>> {
        let posts = self
            .posts
            .recent_by_authors(&[user_id], POSTS_PER_PAGE, page_offset(page, POSTS_PER_PAGE))
            .await?;
        Ok(posts.into_iter().map(PostSummary::from).collect())
    }

    pub async fn post_count(&self, user_id: Uuid) -> ServiceResult<i64> {
        let posts = self.posts.clone();
        self.cache
            .remember_default(&CacheKey::posts_count(user_id), || async move {
                posts.count_by_author(user_id).await
            })
            .await
    }

    /// Substring search over titles and bodies, counted against the caller's quota
    pub async fn search(&self, actor_id: Uuid, query: &str, page: u32) -> ServiceResult<Vec<PostSummary>> {
        if !self.search_limiter.check(actor_id) {
            warn!(user = %actor_id, "Search rate limit exceeded");
            return Err(ServiceError::RateLimited(format!(
                "Too many searches, limit is {} per minute",
                self.search_limiter.limit()
            )));
        }

        let needle = strip_tags(query);
        let needle = needle.trim();
        if needle.chars().count() < MIN_SEARCH_CHARS {
            return Ok(Vec::new());
        }

        let posts = self
            .posts
            .search(needle, POSTS_PER_PAGE, page_offset(page, POSTS_PER_PAGE))
            .await?;
        Ok(posts.into_iter().map(PostSummary::from).collect())
    }

    /// Load the post and check `actor_id` wrote it
    async fn authorize(&self, actor_id: Uuid, post_id: Uuid) -> ServiceResult<Post> {
        let post = self.get_post(post_id).await?;
        if post.user_id != actor_id {
            warn!(post_id = %post_id, actor = %actor_id, "Rejected edit of another user's post");
            return Err(ServiceError::Forbidden(
                "You can only modify your own posts".to_string(),
            ));
        }
        Ok(post)
    }

    async fn forget_after_write(&self, key: &CacheKey) {
        if let Err(e) = self.cache.forget(key).await {
            warn!(error = %e, key = %key, "Failed to invalidate post count after write");
        }
    }
}
