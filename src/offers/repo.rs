use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewOffer, OfferPatch, OfferRecord};
use crate::error::ApiResult;

#[async_trait]
pub trait OfferStore: Send + Sync {
    /// Newest first.
    async fn list(&self, limit: i64) -> ApiResult<Vec<OfferRecord>>;

    async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<OfferRecord>>;

    /// Offers among `ids` that still exist, newest first.
    async fn find_many(&self, ids: &[Uuid]) -> ApiResult<Vec<OfferRecord>>;

    /// Premium offers of one city, newest first.
    async fn premium_by_city(&self, city: &str, limit: i64) -> ApiResult<Vec<OfferRecord>>;

    async fn create(&self, offer: NewOffer) -> ApiResult<OfferRecord>;

    async fn update(&self, id: Uuid, patch: OfferPatch) -> ApiResult<Option<OfferRecord>>;

    async fn delete(&self, id: Uuid) -> ApiResult<bool>;
}

pub struct PgOfferStore {
    db: PgPool,
}

impl PgOfferStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OfferStore for PgOfferStore {
    async fn list(&self, limit: i64) -> ApiResult<Vec<OfferRecord>> {
        let rows = sqlx::query_as::<_, OfferRecord>(
            r#"
            SELECT id, title, description, publish_date, city, preview_image, photos,
                   is_premium, housing_type, rooms, guests, price, facilities, author_id,
                   latitude, longitude
            FROM offers
            ORDER BY publish_date DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<OfferRecord>> {
        let row = sqlx::query_as::<_, OfferRecord>(
            r#"
            SELECT id, title, description, publish_date, city, preview_image, photos,
                   is_premium, housing_type, rooms, guests, price, facilities, author_id,
                   latitude, longitude
            FROM offers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn find_many(&self, ids: &[Uuid]) -> ApiResult<Vec<OfferRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, OfferRecord>(
            r#"
            SELECT id, title, description, publish_date, city, preview_image, photos,
                   is_premium, housing_type, rooms, guests, price, facilities, author_id,
                   latitude, longitude
            FROM offers
            WHERE id = ANY($1)
            ORDER BY publish_date DESC
            "#,
        )
        .bind(ids)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn premium_by_city(&self, city: &str, limit: i64) -> ApiResult<Vec<OfferRecord>> {
        let rows = sqlx::query_as::<_, OfferRecord>(
            r#"
            SELECT id, title, description, publish_date, city, preview_image, photos,
                   is_premium, housing_type, rooms, guests, price, facilities, author_id,
                   latitude, longitude
            FROM offers
            WHERE city = $1 AND is_premium
            ORDER BY publish_date DESC
            LIMIT $2
            "#,
        )
        .bind(city)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn create(&self, offer: NewOffer) -> ApiResult<OfferRecord> {
        let r = offer.into_record();
        let row = sqlx::query_as::<_, OfferRecord>(
            r#"
            INSERT INTO offers (id, title, description, publish_date, city, preview_image, photos,
                                is_premium, housing_type, rooms, guests, price, facilities,
                                author_id, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING id, title, description, publish_date, city, preview_image, photos,
                      is_premium, housing_type, rooms, guests, price, facilities, author_id,
                      latitude, longitude
            "#,
        )
        .bind(r.id)
        .bind(&r.title)
        .bind(&r.description)
        .bind(r.publish_date)
        .bind(&r.city)
        .bind(&r.preview_image)
        .bind(&r.photos)
        .bind(r.is_premium)
        .bind(&r.housing_type)
        .bind(r.rooms)
        .bind(r.guests)
        .bind(r.price)
        .bind(&r.facilities)
        .bind(r.author_id)
        .bind(r.latitude)
        .bind(r.longitude)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, patch: OfferPatch) -> ApiResult<Option<OfferRecord>> {
        let row = sqlx::query_as::<_, OfferRecord>(
            r#"
            UPDATE offers
               SET title         = COALESCE($2, title),
                   description   = COALESCE($3, description),
                   city          = COALESCE($4, city),
                   preview_image = COALESCE($5, preview_image),
                   photos        = COALESCE($6, photos),
                   is_premium    = COALESCE($7, is_premium),
                   housing_type  = COALESCE($8, housing_type),
                   rooms         = COALESCE($9, rooms),
                   guests        = COALESCE($10, guests),
                   price         = COALESCE($11, price),
                   facilities    = COALESCE($12, facilities),
                   latitude      = COALESCE($13, latitude),
                   longitude     = COALESCE($14, longitude)
             WHERE id = $1
            RETURNING id, title, description, publish_date, city, preview_image, photos,
                      is_premium, housing_type, rooms, guests, price, facilities, author_id,
                      latitude, longitude
            "#,
        )
        .bind(id)
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.city)
        .bind(patch.preview_image)
        .bind(patch.photos)
        .bind(patch.is_premium)
        .bind(patch.housing_type)
        .bind(patch.rooms)
        .bind(patch.guests)
        .bind(patch.price)
        .bind(patch.facilities)
        .bind(patch.latitude)
        .bind(patch.longitude)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> ApiResult<bool> {
        let result = sqlx::query("DELETE FROM offers WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
