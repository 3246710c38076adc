use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewUser, UserRecord};
use crate::error::{ApiError, ApiResult};

/// Persistence for user identities and their favorites list.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<UserRecord>>;

    /// `email` is expected to be normalized already.
    async fn find_by_email(&self, email: &str) -> ApiResult<Option<UserRecord>>;

    /// Fails with `DuplicateEmail` when the email is taken.
    async fn create(&self, user: NewUser) -> ApiResult<UserRecord>;

    /// Adds `offer_id` to the favorites set. `None` if the user does not exist.
    async fn add_favorite(&self, user_id: Uuid, offer_id: Uuid) -> ApiResult<Option<UserRecord>>;

    /// Removes `offer_id` from the favorites set. `None` if the user does not exist.
    async fn remove_favorite(&self, user_id: Uuid, offer_id: Uuid)
        -> ApiResult<Option<UserRecord>>;
}

pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, avatar, password_hash, role, favorite_offer_ids, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> ApiResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, avatar, password_hash, role, favorite_offer_ids, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create(&self, user: NewUser) -> ApiResult<UserRecord> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (id, name, email, avatar, password_hash, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, email, avatar, password_hash, role, favorite_offer_ids, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.avatar)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => ApiError::DuplicateEmail,
            other => ApiError::Database(other),
        })
    }

    async fn add_favorite(&self, user_id: Uuid, offer_id: Uuid) -> ApiResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            UPDATE users
               SET favorite_offer_ids = CASE
                       WHEN $2 = ANY(favorite_offer_ids) THEN favorite_offer_ids
                       ELSE array_append(favorite_offer_ids, $2)
                   END
             WHERE id = $1
            RETURNING id, name, email, avatar, password_hash, role, favorite_offer_ids, created_at
            "#,
        )
        .bind(user_id)
        .bind(offer_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn remove_favorite(
        &self,
        user_id: Uuid,
        offer_id: Uuid,
    ) -> ApiResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            UPDATE users
               SET favorite_offer_ids = array_remove(favorite_offer_ids, $2)
             WHERE id = $1
            RETURNING id, name, email, avatar, password_hash, role, favorite_offer_ids, created_at
            "#,
        )
        .bind(user_id)
        .bind(offer_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }
}
