use axum::{
    extract::State,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{LoginRequest, MessageResponse, NewAccount, RegisterRequest, TokenResponse, User},
        extractors::{AuthUser, BearerToken},
        services::AuthService,
    },
    error::ApiResult,
    extract::AppJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", delete(logout))
        .route("/check-status", get(check_status))
}

#[instrument(skip(auth, payload))]
pub async fn register(
    State(auth): State<AuthService>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> ApiResult<Json<User>> {
    let user = auth.register(NewAccount::from(payload)).await?;
    Ok(Json(user))
}

#[instrument(skip(auth, payload))]
pub async fn login(
    State(auth): State<AuthService>,
    AppJson(payload): AppJson<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let token = auth.login(&payload.email, &payload.password).await?;
    Ok(Json(TokenResponse { token }))
}

/// The token is revoked before the caller is resolved, so a session whose
/// user has since been deleted is still closed.
#[instrument(skip_all)]
pub async fn logout(
    State(auth): State<AuthService>,
    BearerToken(token): BearerToken,
) -> ApiResult<Json<MessageResponse>> {
    let caller = auth.validate_token(&token).await;
    auth.logout(&token);
    let user = caller?;
    info!(user_id = %user.id, "user logged out");
    Ok(Json(MessageResponse {
        message: "Logged out successfully",
    }))
}

#[instrument(skip_all)]
pub async fn check_status(AuthUser(user): AuthUser) -> Json<User> {
    Json(user)
}
