use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{CommentRecord, NewComment};
use crate::error::ApiResult;

#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Newest first.
    async fn list_by_offer(&self, offer_id: Uuid) -> ApiResult<Vec<CommentRecord>>;

    async fn create(&self, comment: NewComment) -> ApiResult<CommentRecord>;

    /// Ratings of every comment on the offer, in no particular order.
    async fn ratings_by_offer(&self, offer_id: Uuid) -> ApiResult<Vec<i16>>;

    /// Ratings grouped per offer in one round trip. Offers without
    /// comments are absent from the map.
    async fn ratings_by_offers(&self, offer_ids: &[Uuid]) -> ApiResult<HashMap<Uuid, Vec<i16>>>;

    async fn delete_by_offer(&self, offer_id: Uuid) -> ApiResult<u64>;
}

pub struct PgCommentStore {
    db: PgPool,
}

impl PgCommentStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommentStore for PgCommentStore {
    async fn list_by_offer(&self, offer_id: Uuid) -> ApiResult<Vec<CommentRecord>> {
        let rows = sqlx::query_as::<_, CommentRecord>(
            r#"
            SELECT id, offer_id, author_id, text, rating, publish_date
            FROM comments
            WHERE offer_id = $1
            ORDER BY publish_date DESC
            "#,
        )
        .bind(offer_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn create(&self, comment: NewComment) -> ApiResult<CommentRecord> {
        let row = sqlx::query_as::<_, CommentRecord>(
            r#"
            INSERT INTO comments (id, offer_id, author_id, text, rating, publish_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, offer_id, author_id, text, rating, publish_date
            "#,
        )
        .bind(comment.id)
        .bind(comment.offer_id)
        .bind(comment.author_id)
        .bind(&comment.text)
        .bind(comment.rating)
        .bind(comment.publish_date)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn ratings_by_offer(&self, offer_id: Uuid) -> ApiResult<Vec<i16>> {
        let ratings = sqlx::query_scalar::<_, i16>("SELECT rating FROM comments WHERE offer_id = $1")
            .bind(offer_id)
            .fetch_all(&self.db)
            .await?;
        Ok(ratings)
    }

    async fn ratings_by_offers(&self, offer_ids: &[Uuid]) -> ApiResult<HashMap<Uuid, Vec<i16>>> {
        if offer_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query_as::<_, (Uuid, Vec<i16>)>(
            r#"
            SELECT offer_id, array_agg(rating)
            FROM comments
            WHERE offer_id = ANY($1)
            GROUP BY offer_id
            "#,
        )
        .bind(offer_ids)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().collect())
    }

    async fn delete_by_offer(&self, offer_id: Uuid) -> ApiResult<u64> {
        let result = sqlx::query("DELETE FROM comments WHERE offer_id = $1")
            .bind(offer_id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }
}
