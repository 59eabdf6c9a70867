use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Avatar file used when a user has not uploaded one
pub const DEFAULT_AVATAR: &str = "default-avatar.svg";

const AVATAR_PREFIX: &str = "/storage/avatars";

/// Characters of the body shown in feed listings
pub const EXCERPT_CHARS: usize = 200;

/// User entity
///
/// Registration and credentials are handled upstream; this service only reads
/// users and updates their avatar reference.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Public path of the user's avatar image
    pub fn avatar_path(&self) -> String {
        avatar_path(self.avatar.as_deref())
    }
}

pub fn avatar_path(avatar: Option<&str>) -> String {
    match avatar.map(str::trim) {
        None | Some("") => format!("{}/{}", AVATAR_PREFIX, DEFAULT_AVATAR),
        Some(name) => format!("{}/{}", AVATAR_PREFIX, name),
    }
}

/// Post entity, owned by its author
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Directed follow edge (follower -> followed)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FollowEdge {
    pub follower_id: Uuid,
    pub followed_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Post as shown in feeds, search results and profile listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub body: String,
    pub excerpt: String,
    pub created_at: DateTime<Utc>,
}

impl From<Post> for PostSummary {
    fn from(post: Post) -> Self {
        let excerpt = excerpt(&post.body);
        Self {
            id: post.id,
            user_id: post.user_id,
            title: post.title,
            body: post.body,
            excerpt,
            created_at: post.created_at,
        }
    }
}

fn excerpt(body: &str) -> String {
    match body.char_indices().nth(EXCERPT_CHARS) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

/// Which posts a feed draws from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedMode {
    #[default]
    All,
    Following,
}

/// One user in a followers / following listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub avatar: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            avatar: user.avatar_path(),
        }
    }
}

/// Profile header: identity plus cached counts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub avatar: String,
    pub posts_count: i64,
    pub followers_count: i64,
    pub following_count: i64,
    pub is_following: bool,
}

/// Chat message handed to the broadcaster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender_id: Uuid,
    pub username: String,
    pub text: String,
    pub avatar: String,
}
