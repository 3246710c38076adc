use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::{
    dto::{CreateOfferRequest, FavoriteResponse, ListQuery, Offer, PremiumQuery, UpdateOfferRequest},
    services,
};
use crate::{
    auth::{dto::User, extractors::AuthUser},
    error::ApiResult,
    extract::{AppJson, AppPath, AppQuery},
    state::AppState,
};

pub fn offer_routes() -> Router<AppState> {
    Router::new()
        .route("/offers", get(list_offers).post(create_offer))
        .route("/offers/premium", get(premium_offers))
        .route("/offers/favorite", get(favorite_offers))
        .route(
            "/offers/:offer_id",
            get(get_offer).put(update_offer).delete(delete_offer),
        )
        .route(
            "/offers/:offer_id/favorite",
            post(add_favorite).delete(remove_favorite),
        )
}

// Anonymous callers see every offer with `isFavorite = false`.
fn viewer(auth: &Option<AuthUser>) -> Option<&User> {
    auth.as_ref().map(|AuthUser(user)| user)
}

#[instrument(skip(state, auth))]
pub async fn list_offers(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    AppQuery(q): AppQuery<ListQuery>,
) -> ApiResult<Json<Vec<Offer>>> {
    let offers = services::list_offers(&state, viewer(&auth), q.limit).await?;
    Ok(Json(offers))
}

#[instrument(skip(state, auth))]
pub async fn get_offer(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    AppPath(offer_id): AppPath<Uuid>,
) -> ApiResult<Json<Offer>> {
    let offer = services::get_offer(&state, viewer(&auth), offer_id).await?;
    Ok(Json(offer))
}

#[instrument(skip(state, auth))]
pub async fn premium_offers(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    AppQuery(q): AppQuery<PremiumQuery>,
) -> ApiResult<Json<Vec<Offer>>> {
    let offers = services::premium_offers(&state, viewer(&auth), q.city).await?;
    Ok(Json(offers))
}

#[instrument(skip_all)]
pub async fn create_offer(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppJson(body): AppJson<CreateOfferRequest>,
) -> ApiResult<(StatusCode, Json<Offer>)> {
    let offer = services::create_offer(&state, &user, body).await?;
    Ok((StatusCode::CREATED, Json(offer)))
}

#[instrument(skip_all, fields(offer_id = %offer_id))]
pub async fn update_offer(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppPath(offer_id): AppPath<Uuid>,
    AppJson(body): AppJson<UpdateOfferRequest>,
) -> ApiResult<Json<Offer>> {
    let offer = services::update_offer(&state, &user, offer_id, body).await?;
    Ok(Json(offer))
}

#[instrument(skip_all, fields(offer_id = %offer_id))]
pub async fn delete_offer(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppPath(offer_id): AppPath<Uuid>,
) -> ApiResult<StatusCode> {
    services::delete_offer(&state, &user, offer_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all)]
pub async fn favorite_offers(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> ApiResult<Json<Vec<Offer>>> {
    let offers = services::favorite_offers(&state, &user).await?;
    Ok(Json(offers))
}

#[instrument(skip_all, fields(offer_id = %offer_id))]
pub async fn add_favorite(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppPath(offer_id): AppPath<Uuid>,
) -> ApiResult<Json<FavoriteResponse>> {
    let res = services::add_favorite(&state, &user, offer_id).await?;
    Ok(Json(res))
}

#[instrument(skip_all, fields(offer_id = %offer_id))]
pub async fn remove_favorite(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    AppPath(offer_id): AppPath<Uuid>,
) -> ApiResult<Json<FavoriteResponse>> {
    let res = services::remove_favorite(&state, &user, offer_id).await?;
    Ok(Json(res))
}
