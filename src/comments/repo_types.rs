use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::Comment;

#[derive(Debug, Clone, FromRow)]
pub struct CommentRecord {
    pub id: Uuid,
    pub offer_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub rating: i16,
    pub publish_date: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub id: Uuid,
    pub offer_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub rating: i16,
    pub publish_date: OffsetDateTime,
}

impl From<NewComment> for CommentRecord {
    fn from(c: NewComment) -> Self {
        Self {
            id: c.id,
            offer_id: c.offer_id,
            author_id: c.author_id,
            text: c.text,
            rating: c.rating,
            publish_date: c.publish_date,
        }
    }
}

impl From<CommentRecord> for Comment {
    fn from(r: CommentRecord) -> Self {
        Self {
            id: r.id,
            text: r.text,
            rating: r.rating,
            publish_date: r.publish_date,
            author_id: r.author_id,
            offer_id: r.offer_id,
        }
    }
}
