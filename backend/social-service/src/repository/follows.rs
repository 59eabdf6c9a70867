use super::FollowStore;
use crate::domain::FollowEdge;
use crate::error::ServiceResult;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

/// PostgreSQL follow store over the `follows` table
#[derive(Clone)]
pub struct PgFollowStore {
    pool: PgPool,
}

impl PgFollowStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl FollowStore for PgFollowStore {
    async fn insert_edge(&self, follower_id: Uuid, followed_id: Uuid) -> ServiceResult<bool> {
        // The primary key decides concurrent inserts of the same pair; the
        // loser gets no row back.
        let inserted = sqlx::query_as::<_, (Uuid,)>(
            r#"
            INSERT INTO follows (follower_id, followed_id, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (follower_id, followed_id) DO NOTHING
            RETURNING follower_id
            "#,
        )
        .bind(follower_id)
        .bind(followed_id)
        .fetch_optional(&self.pool)
        .await?;

        debug!(
            follower = %follower_id,
            followed = %followed_id,
            inserted = inserted.is_some(),
            "Insert follow edge"
        );
        Ok(inserted.is_some())
    }

    async fn delete_edge(&self, follower_id: Uuid, followed_id: Uuid) -> ServiceResult<bool> {
        let affected = sqlx::query(
            r#"
            DELETE FROM follows
            WHERE follower_id = $1 AND followed_id = $2
            "#,
        )
        .bind(follower_id)
        .bind(followed_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        debug!(
            follower = %follower_id,
            followed = %followed_id,
            affected,
            "Delete follow edge"
        );
        Ok(affected > 0)
    }

    async fn edge_exists(&self, follower_id: Uuid, followed_id: Uuid) -> ServiceResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM follows
                WHERE follower_id = $1 AND followed_id = $2
            )
            "#,
        )
        .bind(follower_id)
        .bind(followed_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn edges_from(&self, user_id: Uuid) -> ServiceResult<Vec<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT followed_id FROM follows
            WHERE follower_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn edges_to(&self, user_id: Uuid) -> ServiceResult<Vec<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT follower_id FROM follows
            WHERE followed_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn count_from(&self, user_id: Uuid) -> ServiceResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE follower_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn count_to(&self, user_id: Uuid) -> ServiceResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE followed_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn page_from(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<FollowEdge>> {
        let edges = sqlx::query_as::<_, FollowEdge>(
            r#"
            SELECT follower_id, followed_id, created_at
            FROM follows
            WHERE follower_id = $1
            ORDER BY created_at DESC, followed_id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(edges)
    }

    async fn page_to(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<Vec<FollowEdge>> {
        let edges = sqlx::query_as::<_, FollowEdge>(
            r#"
            SELECT follower_id, followed_id, created_at
            FROM follows
            WHERE followed_id = $1
            ORDER BY created_at DESC, follower_id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(edges)
    }
}
