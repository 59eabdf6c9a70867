//! In-process stores
//!
//! Back the integration tests and local runs without PostgreSQL. Ordering
//! mirrors the SQL stores: newest first, ties broken by insertion sequence.

use super::{FollowStore, PostStore, UserStore};
use crate::domain::{FollowEdge, Post, User};
use crate::error::ServiceResult;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

fn page<T>(items: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    items
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

#[derive(Default)]
pub struct MemoryFollowStore {
    edges: RwLock<HashMap<(Uuid, Uuid), (FollowEdge, u64)>>,
    seq: AtomicU64,
}

impl MemoryFollowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of edges in the store
    pub async fn len(&self) -> usize {
        self.edges.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.edges.read().await.is_empty()
    }

    async fn newest_first<F>(&self, filter: F) -> Vec<FollowEdge>
    where
        F: Fn(&FollowEdge) -> bool,
    {
        let edges = self.edges.read().await;
        let mut matching: Vec<&(FollowEdge, u64)> =
            edges.values().filter(|(edge, _)| filter(edge)).collect();
        matching.sort_by(|a, b| b.1.cmp(&a.1));
        matching.into_iter().map(|(edge, _)| edge.clone()).collect()
    }
}

#[async_trait::async_trait]
impl FollowStore for MemoryFollowStore {
    async fn insert_edge(&self, follower_id: Uuid, followed_id: Uuid) -> ServiceResult<bool> {
        let mut edges = self.edges.write().await;
        if edges.contains_key(&(follower_id, followed_id)) {
            return Ok(false);
        }

        let edge = FollowEdge {
            follower_id,
            followed_id,
            created_at: Utc::now(),
        };
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        edges.insert((follower_id, followed_id), (edge, seq));
        Ok(true)
    }

    async fn delete_edge(&self, follower_id: Uuid, followed_id: Uuid) -> ServiceResult<bool> {
        let mut edges = self.edges.write().await;
        Ok(edges.remove(&(follower_id, followed_id)).is_some())
    }

    async fn edge_exists(&self, follower_id: Uuid, followed_id: Uuid) -> ServiceResult<bool> {
        let edges = self.edges.read().await;
        Ok(edges.contains_key(&(follower_id, followed_id)))
    }

    async fn edges_from(&self, user_id: Uuid) -> ServiceResult<Vec<Uuid>> {
        let edges = self.newest_first(|e| e.follower_id == user_id).await;
        Ok(edges.into_iter().map(|e| e.followed_id).collect())
    }

    async fn edges_to(&self, user_id: Uuid) -> ServiceResult<Vec<Uuid>> {
        let edges = self.newest_first(|e| e.followed_id == user_id).await;
        Ok(edges.into_iter().map(|e| e.follower_id).collect())
    }

    async fn count_from(&self, user_id: Uuid) -> ServiceResult<i64> {
        let edges = self.edges.read().await;
        Ok(edges.keys().filter(|(from, _)| *from == user_id).count() as i64)
    }

    async fn count_to(&self, user_id: Uuid) -> ServiceResult<i64> {
        let edges = self.edges.read().await;
        Ok(edges.keys().filter(|(_, to)| *to == user_id).count() as i64)
    }

    async fn page_from(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<FollowEdge>> {
        let edges = self.newest_first(|e| e.follower_id == user_id).await;
        Ok(page(edges, limit, offset))
    }

    async fn page_to(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<FollowEdge>> {
        let edges = self.newest_first(|e| e.followed_id == user_id).await;
        Ok(page(edges, limit, offset))
    }
}

#[derive(Default)]
pub struct MemoryPostStore {
    posts: RwLock<HashMap<Uuid, (Post, u64)>>,
    seq: AtomicU64,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn newest_first<F>(&self, filter: F) -> Vec<Post>
    where
        F: Fn(&Post) -> bool,
    {
        let posts = self.posts.read().await;
        let mut matching: Vec<&(Post, u64)> =
            posts.values().filter(|(post, _)| filter(post)).collect();
        matching.sort_by(|a, b| b.1.cmp(&a.1));
        matching.into_iter().map(|(post, _)| post.clone()).collect()
    }
}

#[async_trait::async_trait]
impl PostStore for MemoryPostStore {
    async fn insert(&self, author_id: Uuid, title: &str, body: &str) -> ServiceResult<Post> {
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            user_id: author_id,
            title: title.to_string(),
            body: body.to_string(),
            created_at: now,
            updated_at: now,
        };
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        self.posts.write().await.insert(post.id, (post.clone(), seq));
        Ok(post)
    }

    async fn find(&self, post_id: Uuid) -> ServiceResult<Option<Post>> {
        let posts = self.posts.read().await;
        Ok(posts.get(&post_id).map(|(post, _)| post.clone()))
    }

    async fn update(&self, post_id: Uuid, title: &str, body: &str) -> ServiceResult<Option<Post>> {
        let mut posts = self.posts.write().await;
        Ok(posts.get_mut(&post_id).map(|(post, _)| {
            post.title = title.to_string();
            post.body = body.to_string();
            post.updated_at = Utc::now();
            post.clone()
        }))
    }

    async fn delete(&self, post_id: Uuid) -> ServiceResult<bool> {
        Ok(self.posts.write().await.remove(&post_id).is_some())
    }

    async fn recent(&self, limit: i64, offset: i64) -> ServiceResult<Vec<Post>> {
        let posts = self.newest_first(|_| true).await;
        Ok(page(posts, limit, offset))
    }

    async fn recent_by_authors(
        &self,
        author_ids: &[Uuid],
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<Post>> {
        let posts = self
            .newest_first(|p| author_ids.contains(&p.user_id))
            .await;
        Ok(page(posts, limit, offset))
    }

    async fn count_by_author(&self, author_id: Uuid) -> ServiceResult<i64> {
        let posts = self.posts.read().await;
        Ok(posts
            .values()
            .filter(|(post, _)| post.user_id == author_id)
            .count() as i64)
    }

    async fn search(&self, needle: &str, limit: i64, offset: i64) -> ServiceResult<Vec<Post>> {
        let needle = needle.to_lowercase();
        let posts = self
            .newest_first(|p| {
                p.title.to_lowercase().contains(&needle) || p.body.to_lowercase().contains(&needle)
            })
            .await;
        Ok(page(posts, limit, offset))
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user with a default avatar
    pub async fn insert(&self, username: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: String::new(),
            avatar: None,
            created_at: Utc::now(),
        };
        self.users.write().await.insert(user.id, user.clone());
        user
    }
}

#[async_trait::async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, user_id: Uuid) -> ServiceResult<Option<User>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> ServiceResult<Option<User>> {
        let username = username.trim();
        if username.is_empty() {
            return Ok(None);
        }

        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_many(&self, user_ids: &[Uuid]) -> ServiceResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(user_ids
            .iter()
            .filter_map(|id| users.get(id).cloned())
            .collect())
    }

    async fn update_avatar(&self, user_id: Uuid, avatar: &str) -> ServiceResult<bool> {
        let mut users = self.users.write().await;
        Ok(users
            .get_mut(&user_id)
            .map(|u| u.avatar = Some(avatar.to_string()))
            .is_some())
    }
}
