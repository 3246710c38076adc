use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use super::{
    dto::{Comment, CreateCommentRequest},
    repo_types::NewComment,
};
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

async fn ensure_offer_exists(state: &AppState, offer_id: Uuid) -> ApiResult<()> {
    state
        .offers
        .find_by_id(offer_id)
        .await?
        .map(|_| ())
        .ok_or(ApiError::NotFound("offer not found"))
}

pub async fn list_for_offer(state: &AppState, offer_id: Uuid) -> ApiResult<Vec<Comment>> {
    ensure_offer_exists(state, offer_id).await?;
    let rows = state.comments.list_by_offer(offer_id).await?;
    Ok(rows.into_iter().map(Comment::from).collect())
}

pub async fn create_comment(
    state: &AppState,
    author_id: Uuid,
    offer_id: Uuid,
    req: CreateCommentRequest,
) -> ApiResult<Comment> {
    req.validate()?;
    ensure_offer_exists(state, offer_id).await?;

    let record = state
        .comments
        .create(NewComment {
            id: Uuid::new_v4(),
            offer_id,
            author_id,
            text: req.text.trim().to_string(),
            rating: req.rating,
            publish_date: OffsetDateTime::now_utc(),
        })
        .await?;

    info!(comment_id = %record.id, offer_id = %offer_id, author_id = %author_id, "comment created");
    Ok(Comment::from(record))
}
