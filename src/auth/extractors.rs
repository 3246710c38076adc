use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use super::{dto::User, services::AuthService};
use crate::error::ApiError;

/// Raw bearer token from the `Authorization` header.
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| {
                warn!("missing Authorization header");
                ApiError::MissingToken
            })?;

        let token = bearer_token(header).ok_or_else(|| {
            warn!("invalid auth scheme");
            ApiError::MissingToken
        })?;

        Ok(BearerToken(token.to_string()))
    }
}

/// Accepts "Bearer <token>" (scheme is case-insensitive) or a bare token.
fn bearer_token(header: &str) -> Option<&str> {
    let header = header.trim();
    let Some((scheme, token)) = header.split_once(' ') else {
        return (!header.is_empty() && !header.eq_ignore_ascii_case("bearer")).then_some(header);
    };
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Gate for protected routes: resolves the bearer token to a live user or
/// rejects the request with 401 before the handler runs.
pub struct AuthUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AuthService: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let user = AuthService::from_ref(state).validate_token(&token).await?;
        Ok(AuthUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bearer_scheme() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("  BEARER   abc  "), Some("abc"));
    }

    #[test]
    fn bare_token_is_accepted() {
        assert_eq!(bearer_token("abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token(" abc.def.ghi "), Some("abc.def.ghi"));
    }

    #[test]
    fn rejects_other_schemes_and_empty_tokens() {
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("   "), None);
        assert_eq!(bearer_token(""), None);
    }
}
