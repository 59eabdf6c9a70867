use crate::domain::UserSummary;
use crate::error::ServiceResult;
use crate::repository::{page_offset, FollowStore, UserStore};
use count_cache::{CacheKey, CountCache};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Users per followers / following page
pub const FOLLOWS_PER_PAGE: i64 = 15;

/// Why a follow or unfollow was not applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    SelfFollow,
    AlreadyFollowing,
    NotFollowing,
}

impl RejectReason {
    pub fn message(&self) -> &'static str {
        match self {
            RejectReason::SelfFollow => "You cannot follow yourself.",
            RejectReason::AlreadyFollowing => "You are already following this user.",
            RejectReason::NotFollowing => "You are not following this user.",
        }
    }
}

/// Result of a follow or unfollow that did not fail on infrastructure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowOutcome {
    Applied,
    Rejected(RejectReason),
}

impl FollowOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, FollowOutcome::Applied)
    }
}

/// Follow graph operations.
///
/// The only writer of follow edges. Every mutation forgets the follower and
/// following counts of both users before touching the store (a cache failure
/// there aborts with nothing changed) and again afterwards, so a read racing
/// the write cannot leave a stale count behind.
#[derive(Clone)]
pub struct FollowService {
    store: Arc<dyn FollowStore>,
    users: Arc<dyn UserStore>,
    cache: CountCache,
}

impl FollowService {
    pub fn new(store: Arc<dyn FollowStore>, users: Arc<dyn UserStore>, cache: CountCache) -> Self {
        Self {
            store,
            users,
            cache,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn follow(&self, follower_id: Uuid, target_id: Uuid) -> ServiceResult<FollowOutcome> {
        if follower_id == target_id {
            return Ok(FollowOutcome::Rejected(RejectReason::SelfFollow));
        }

        if self.store.edge_exists(follower_id, target_id).await? {
            return Ok(FollowOutcome::Rejected(RejectReason::AlreadyFollowing));
        }

        self.forget_pair(follower_id, target_id).await?;

        if !self.store.insert_edge(follower_id, target_id).await? {
            // Lost a race against a concurrent follow of the same pair
            return Ok(FollowOutcome::Rejected(RejectReason::AlreadyFollowing));
        }

        self.forget_pair_after_write(follower_id, target_id).await;

        info!(follower = %follower_id, followed = %target_id, "User followed");
        Ok(FollowOutcome::Applied)
    }

    #[tracing::instrument(skip(self))]
    pub async fn unfollow(
        &self,
        follower_id: Uuid,
        target_id: Uuid,
    ) -> ServiceResult<FollowOutcome> {
        if !self.store.edge_exists(follower_id, target_id).await? {
            return Ok(FollowOutcome::Rejected(RejectReason::NotFollowing));
        }

        self.forget_pair(follower_id, target_id).await?;

        if !self.store.delete_edge(follower_id, target_id).await? {
            return Ok(FollowOutcome::Rejected(RejectReason::NotFollowing));
        }

        self.forget_pair_after_write(follower_id, target_id).await;

        info!(follower = %follower_id, followed = %target_id, "User unfollowed");
        Ok(FollowOutcome::Applied)
    }

    pub async fn is_following(&self, follower_id: Uuid, target_id: Uuid) -> ServiceResult<bool> {
        self.store.edge_exists(follower_id, target_id).await
    }

    pub async fn follower_count(&self, user_id: Uuid) -> ServiceResult<i64> {
        let store = self.store.clone();
        self.cache
            .remember_default(&CacheKey::followers_count(user_id), || async move {
                store.count_to(user_id).await
            })
            .await
    }

    pub async fn following_count(&self, user_id: Uuid) -> ServiceResult<i64> {
        let store = self.store.clone();
        self.cache
            .remember_default(&CacheKey::following_count(user_id), || async move {
                store.count_from(user_id).await
            })
            .await
    }

    /// Users following `user_id`, most recent first
    pub async fn followers(&self, user_id: Uuid, page: u32) -> ServiceResult<Vec<UserSummary>> {
        let edges = self
            .store
            .page_to(user_id, FOLLOWS_PER_PAGE, page_offset(page, FOLLOWS_PER_PAGE))
            .await?;
        let ids: Vec<Uuid> = edges.iter().map(|e| e.follower_id).collect();
        self.summaries(&ids).await
    }

    /// Users `user_id` follows, most recent first
    pub async fn following(&self, user_id: Uuid, page: u32) -> ServiceResult<Vec<UserSummary>> {
        let edges = self
            .store
            .page_from(user_id, FOLLOWS_PER_PAGE, page_offset(page, FOLLOWS_PER_PAGE))
            .await?;
        let ids: Vec<Uuid> = edges.iter().map(|e| e.followed_id).collect();
        self.summaries(&ids).await
    }

    async fn summaries(&self, ids: &[Uuid]) -> ServiceResult<Vec<UserSummary>> {
        let users = self.users.find_many(ids).await?;
        Ok(users.iter().map(UserSummary::from).collect())
    }

    fn pair_keys(follower_id: Uuid, target_id: Uuid) -> Vec<CacheKey> {
        CacheKey::follow_counts(follower_id)
            .into_iter()
            .chain(CacheKey::follow_counts(target_id))
            .collect()
    }

    async fn forget_pair(&self, follower_id: Uuid, target_id: Uuid) -> ServiceResult<()> {
        self.cache
            .forget_many(&Self::pair_keys(follower_id, target_id))
            .await?;
        Ok(())
    }

    async fn forget_pair_after_write(&self, follower_id: Uuid, target_id: Uuid) {
        if let Err(e) = self
            .cache
            .forget_many(&Self::pair_keys(follower_id, target_id))
            .await
        {
            warn!(
                error = %e,
                follower = %follower_id,
                followed = %target_id,
                "Failed to invalidate follow counts after write"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_messages() {
        assert_eq!(
            RejectReason::SelfFollow.message(),
            "You cannot follow yourself."
        );
        assert_eq!(
            RejectReason::AlreadyFollowing.message(),
            "You are already following this user."
        );
        assert_eq!(
            RejectReason::NotFollowing.message(),
            "You are not following this user."
        );
    }

    #[test]
    fn test_pair_keys_cover_both_users() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let keys = FollowService::pair_keys(a, b);
        assert_eq!(keys.len(), 4);
        assert!(keys.contains(&CacheKey::followers_count(b)));
        assert!(keys.contains(&CacheKey::following_count(a)));
    }
}
