use crate::domain::{FeedMode, PostSummary};
use crate::error::ServiceResult;
use crate::repository::{page_offset, FollowStore, PostStore};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Posts per feed page when the caller does not choose
pub const DEFAULT_FEED_PAGE_SIZE: i64 = 10;

/// Largest page a caller may ask for
pub const MAX_FEED_PAGE_SIZE: i64 = 100;

/// Whether the viewer's own posts appear in their "following" feed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedPolicy {
    pub include_own_posts: bool,
}

/// Builds the home feed from the follow graph and the post store
#[derive(Clone)]
pub struct FeedComposer {
    follows: Arc<dyn FollowStore>,
    posts: Arc<dyn PostStore>,
    policy: FeedPolicy,
}

impl FeedComposer {
    pub fn new(follows: Arc<dyn FollowStore>, posts: Arc<dyn PostStore>, policy: FeedPolicy) -> Self {
        Self {
            follows,
            posts,
            policy,
        }
    }

    pub fn policy(&self) -> FeedPolicy {
        self.policy
    }

    /// One page of the feed, newest first. `page` is 1-based; `page_size` is
    /// clamped to `1..=MAX_FEED_PAGE_SIZE`.
    pub async fn feed(
        &self,
        user_id: Uuid,
        mode: FeedMode,
        page: u32,
        page_size: i64,
    ) -> ServiceResult<Vec<PostSummary>> {
        let page_size = page_size.clamp(1, MAX_FEED_PAGE_SIZE);
        let offset = page_offset(page, page_size);

        let posts = match mode {
            FeedMode::All => self.posts.recent(page_size, offset).await?,
            FeedMode::Following => {
                let mut authors = self.follows.edges_from(user_id).await?;
                if self.policy.include_own_posts {
                    authors.push(user_id);
                }

                if authors.is_empty() {
                    debug!(user = %user_id, "Following feed has no authors");
                    return Ok(Vec::new());
                }

                self.posts
                    .recent_by_authors(&authors, page_size, offset)
                    .await?
            }
        };

        Ok(posts.into_iter().map(PostSummary::from).collect())
    }
}
