use super::follow::FollowService;
use super::posts::PostService;
use crate::domain::{User, UserProfile};
use crate::error::{ServiceError, ServiceResult};
use crate::repository::UserStore;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Longest accepted avatar file name
const MAX_AVATAR_NAME: usize = 255;

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    follows: FollowService,
    posts: PostService,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, follows: FollowService, posts: PostService) -> Self {
        Self {
            users,
            follows,
            posts,
        }
    }

    /// Look up by username, `NotFound` when absent
    pub async fn resolve(&self, username: &str) -> ServiceResult<User> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }

    pub async fn get(&self, user_id: Uuid) -> ServiceResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))
    }

    /// Profile header of `username` as seen by `viewer_id`
    pub async fn profile(&self, viewer_id: Uuid, username: &str) -> ServiceResult<UserProfile> {
        let user = self.resolve(username).await?;

        let posts_count = self.posts.post_count(user.id).await?;
        let followers_count = self.follows.follower_count(user.id).await?;
        let following_count = self.follows.following_count(user.id).await?;
        let is_following = viewer_id != user.id && self.follows.is_following(viewer_id, user.id).await?;

        Ok(UserProfile {
            id: user.id,
            avatar: user.avatar_path(),
            username: user.username,
            posts_count,
            followers_count,
            following_count,
            is_following,
        })
    }

    /// Point the user's avatar at an uploaded file name; returns its public path
    pub async fn update_avatar(&self, user_id: Uuid, avatar: &str) -> ServiceResult<String> {
        let avatar = avatar.trim();
        if avatar.is_empty()
            || avatar.len() > MAX_AVATAR_NAME
            || avatar.contains(['/', '\\'])
            || avatar.starts_with('.')
        {
            return Err(ServiceError::Validation(
                "avatar: must be a plain file name".to_string(),
            ));
        }

        if !self.users.update_avatar(user_id, avatar).await? {
            return Err(ServiceError::NotFound("User not found".to_string()));
        }

        info!(user = %user_id, "Avatar updated");
        Ok(crate::domain::avatar_path(Some(avatar)))
    }
}
