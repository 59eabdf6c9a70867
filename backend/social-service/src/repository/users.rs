use super::UserStore;
use crate::domain::User;
use crate::error::ServiceResult;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

/// PostgreSQL user store
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, user_id: Uuid) -> ServiceResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, avatar, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> ServiceResult<Option<User>> {
        let username = username.trim();
        if username.is_empty() {
            return Ok(None);
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, avatar, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_many(&self, user_ids: &[Uuid]) -> ServiceResult<Vec<User>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, avatar, created_at
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        // ANY() does not preserve order
        let mut by_id: HashMap<Uuid, User> = rows.into_iter().map(|u| (u.id, u)).collect();
        Ok(user_ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn update_avatar(&self, user_id: Uuid, avatar: &str) -> ServiceResult<bool> {
        let result = sqlx::query("UPDATE users SET avatar = $2 WHERE id = $1")
            .bind(user_id)
            .bind(avatar)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
