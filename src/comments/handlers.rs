use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{Comment, CreateCommentRequest},
    services,
};
use crate::{
    auth::extractors::AuthUser,
    error::ApiResult,
    extract::{AppJson, AppPath},
    state::AppState,
};

pub fn comment_routes() -> Router<AppState> {
    Router::new().route(
        "/offers/:offer_id/comments",
        get(list_comments).post(create_comment),
    )
}

#[instrument(skip(state))]
pub async fn list_comments(
    State(state): State<AppState>,
    AppPath(offer_id): AppPath<Uuid>,
) -> ApiResult<Json<Vec<Comment>>> {
    let comments = services::list_for_offer(&state, offer_id).await?;
    Ok(Json(comments))
}

#[instrument(skip_all, fields(offer_id = %offer_id))]
pub async fn create_comment(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppPath(offer_id): AppPath<Uuid>,
    AppJson(body): AppJson<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<Comment>)> {
    let comment = services::create_comment(&state, user.id, offer_id, body).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}
