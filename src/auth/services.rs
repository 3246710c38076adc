use std::sync::Arc;

use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{
    dto::{NewAccount, User, DEFAULT_AVATAR},
    jwt::JwtKeys,
    password::{hash_password_blocking, verify_password_blocking},
    registry::RevocationRegistry,
    repo::UserStore,
    repo_types::NewUser,
};
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Issues, verifies and revokes session tokens on top of the identity store.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    keys: JwtKeys,
    registry: Arc<RevocationRegistry>,
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(
            Arc::clone(&state.users),
            state.keys.clone(),
            Arc::clone(&state.registry),
        )
    }
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        keys: JwtKeys,
        registry: Arc<RevocationRegistry>,
    ) -> Self {
        Self {
            users,
            keys,
            registry,
        }
    }

    pub async fn register(&self, account: NewAccount) -> ApiResult<User> {
        let email = normalize_email(&account.email);
        let name = account.name.trim().to_string();

        if !is_valid_email(&email) {
            warn!(email = %email, "invalid email");
            return Err(ApiError::Validation("invalid email".into()));
        }
        if !(1..=15).contains(&name.chars().count()) {
            return Err(ApiError::Validation(
                "name must be between 1 and 15 characters".into(),
            ));
        }
        if !(6..=12).contains(&account.password.chars().count()) {
            return Err(ApiError::Validation(
                "password must be between 6 and 12 characters".into(),
            ));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            warn!(email = %email, "email already registered");
            return Err(ApiError::DuplicateEmail);
        }

        let password_hash = hash_password_blocking(account.password).await?;
        let avatar = account
            .avatar
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| DEFAULT_AVATAR.to_string());

        let record = self
            .users
            .create(NewUser {
                id: Uuid::new_v4(),
                name,
                email,
                avatar,
                password_hash,
                role: account.role,
            })
            .await?;

        info!(user_id = %record.id, email = %record.email, role = %account.role, "user registered");
        Ok(User::try_from(record)?)
    }

    /// Unknown email and wrong password produce the same error.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<String> {
        let email = normalize_email(email);

        let Some(user) = self.users.find_by_email(&email).await? else {
            warn!(email = %email, "login unknown email");
            return Err(ApiError::InvalidCredentials);
        };

        let ok = verify_password_blocking(password.to_string(), user.password_hash.clone())
            .await
            .map_err(|e| {
                error!(error = %e, user_id = %user.id, "stored password hash unreadable");
                ApiError::Internal(e)
            })?;
        if !ok {
            warn!(user_id = %user.id, "login invalid password");
            return Err(ApiError::InvalidCredentials);
        }

        let issued = self.keys.issue(user.id, &user.email)?;
        self.registry.register(&issued.token, issued.expires_at);

        info!(user_id = %user.id, "user logged in");
        Ok(issued.token)
    }

    pub fn logout(&self, token: &str) {
        if self.registry.revoke(token) {
            info!("token revoked");
        } else {
            debug!("logout for a token that was not live");
        }
    }

    /// Revoked and expired tokens are indistinguishable here: both are `InvalidToken`.
    pub async fn validate_token(&self, token: &str) -> ApiResult<User> {
        if !self.registry.is_live(token) {
            warn!("token rejected: not live");
            return Err(ApiError::InvalidToken);
        }

        let claims = self.keys.verify(token)?;

        let record = self.users.find_by_id(claims.sub).await?.ok_or_else(|| {
            warn!(user_id = %claims.sub, "token subject no longer exists");
            ApiError::UserNotFound
        })?;

        Ok(User::try_from(record)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::{dto::Role, memory::MemoryUserStore},
        config::{JwtConfig, DEFAULT_TOKEN_TTL_MINUTES},
    };
    use time::{Duration as TimeDuration, OffsetDateTime};

    fn keys() -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: "test-secret".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
        })
    }

    fn service() -> (AuthService, Arc<MemoryUserStore>, Arc<RevocationRegistry>) {
        let users = Arc::new(MemoryUserStore::new());
        let registry = Arc::new(RevocationRegistry::new());
        let svc = AuthService::new(users.clone(), keys(), registry.clone());
        (svc, users, registry)
    }

    fn account(name: &str, email: &str, password: &str) -> NewAccount {
        NewAccount {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            avatar: None,
            role: Role::Regular,
        }
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("a@x.com"));
        assert!(!is_valid_email("a@x"));
        assert!(!is_valid_email("a x@y.com"));
        assert!(!is_valid_email(""));
    }

    #[tokio::test]
    async fn register_login_validate_logout_scenario() {
        let (svc, _, _) = service();

        let user = svc.register(account("Ann", "a@x.com", "secret1")).await.unwrap();
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.avatar, DEFAULT_AVATAR);

        let token = svc.login("a@x.com", "secret1").await.unwrap();
        assert!(!token.is_empty());

        let validated = svc.validate_token(&token).await.unwrap();
        assert_eq!(validated.email, "a@x.com");
        assert_eq!(validated.id, user.id);
        let json = serde_json::to_value(&validated).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());

        svc.logout(&token);
        assert!(matches!(
            svc.validate_token(&token).await,
            Err(ApiError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let (svc, _, registry) = service();
        svc.register(account("Ann", "a@x.com", "secret1")).await.unwrap();
        let token = svc.login("a@x.com", "secret1").await.unwrap();

        svc.logout(&token);
        svc.logout(&token);
        svc.logout("never-issued");
        assert!(registry.is_empty());
        assert!(svc.validate_token(&token).await.is_err());
    }

    #[tokio::test]
    async fn each_login_gets_its_own_live_token() {
        let (svc, _, registry) = service();
        svc.register(account("Ann", "a@x.com", "secret1")).await.unwrap();
        let first = svc.login("a@x.com", "secret1").await.unwrap();
        // iat has second resolution
        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        let second = svc.login("a@x.com", "secret1").await.unwrap();
        assert_ne!(first, second);
        assert_eq!(registry.len(), 2);

        svc.logout(&first);
        assert!(svc.validate_token(&first).await.is_err());
        assert!(svc.validate_token(&second).await.is_ok());
    }

    #[tokio::test]
    async fn email_is_normalized() {
        let (svc, _, _) = service();
        let user = svc
            .register(account("Ann", "  A@X.com ", "secret1"))
            .await
            .unwrap();
        assert_eq!(user.email, "a@x.com");
        assert!(svc.login("A@x.COM", "secret1").await.is_ok());
    }

    #[tokio::test]
    async fn duplicate_email_keeps_first_account() {
        let (svc, users, _) = service();
        let first = svc.register(account("Ann", "a@x.com", "secret1")).await.unwrap();

        let err = svc
            .register(account("Impostor", "a@x.com", "other12"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::DuplicateEmail));

        let stored = users.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(stored.id, first.id);
        assert_eq!(stored.name, "Ann");
        assert!(svc.login("a@x.com", "secret1").await.is_ok());
        assert!(svc.login("a@x.com", "other12").await.is_err());
    }

    #[tokio::test]
    async fn wrong_password_looks_like_unknown_email() {
        let (svc, _, registry) = service();
        svc.register(account("Ann", "a@x.com", "secret1")).await.unwrap();

        let wrong_password = svc.login("a@x.com", "nope123").await.unwrap_err();
        let unknown_email = svc.login("b@x.com", "secret1").await.unwrap_err();

        assert!(matches!(wrong_password, ApiError::InvalidCredentials));
        assert!(matches!(unknown_email, ApiError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn expired_token_fails_even_while_live() {
        let (svc, _, registry) = service();
        let user = svc.register(account("Ann", "a@x.com", "secret1")).await.unwrap();

        let issued = keys()
            .issue_at(
                user.id,
                &user.email,
                OffsetDateTime::now_utc() - TimeDuration::hours(25),
            )
            .unwrap();
        // registered as live, but with a far expiry so only the codec can reject it
        registry.register(&issued.token, OffsetDateTime::now_utc() + TimeDuration::hours(1));

        assert!(matches!(
            svc.validate_token(&issued.token).await,
            Err(ApiError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn token_seconds_past_expiry_is_rejected() {
        let (svc, _, registry) = service();
        let user = svc.register(account("Ann", "a@x.com", "secret1")).await.unwrap();

        let issued_at = OffsetDateTime::now_utc() - TimeDuration::hours(24)
            - TimeDuration::seconds(5);
        let issued = keys().issue_at(user.id, &user.email, issued_at).unwrap();
        registry.register(&issued.token, issued.expires_at);

        assert!(matches!(
            svc.validate_token(&issued.token).await,
            Err(ApiError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn signed_but_never_registered_token_is_rejected() {
        let (svc, _, _) = service();
        let user = svc.register(account("Ann", "a@x.com", "secret1")).await.unwrap();
        let issued = keys().issue(user.id, &user.email).unwrap();

        assert!(matches!(
            svc.validate_token(&issued.token).await,
            Err(ApiError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn deleted_user_yields_user_not_found() {
        let (svc, users, _) = service();
        let user = svc.register(account("Ann", "a@x.com", "secret1")).await.unwrap();
        let token = svc.login("a@x.com", "secret1").await.unwrap();

        assert!(users.remove(user.id).await);
        assert!(matches!(
            svc.validate_token(&token).await,
            Err(ApiError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn registration_input_is_validated() {
        let (svc, _, _) = service();
        for bad in [
            account("Ann", "not-an-email", "secret1"),
            account("", "a@x.com", "secret1"),
            account("A name far too long", "a@x.com", "secret1"),
            account("Ann", "a@x.com", "short"),
            account("Ann", "a@x.com", "much-too-long-password"),
        ] {
            assert!(matches!(
                svc.register(bad).await,
                Err(ApiError::Validation(_))
            ));
        }
    }

    #[tokio::test]
    async fn pro_role_and_avatar_are_kept() {
        let (svc, _, _) = service();
        let mut acc = account("Bob", "b@x.com", "secret1");
        acc.role = Role::Pro;
        acc.avatar = Some("bob.png".into());
        let user = svc.register(acc).await.unwrap();
        assert_eq!(user.role, Role::Pro);
        assert_eq!(user.avatar, "bob.png");
    }
}
