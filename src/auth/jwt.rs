use std::time::Duration;

use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use super::claims::Claims;
use crate::{
    config::JwtConfig,
    error::{ApiError, ApiResult},
};

/// Holds JWT signing and verification keys with config data.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
}

/// A freshly signed token together with the instant it stops being valid.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: OffsetDateTime,
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::from_secs((cfg.ttl_minutes.max(0) as u64) * 60),
        }
    }

    pub fn issue(&self, user_id: Uuid, email: &str) -> anyhow::Result<IssuedToken> {
        self.issue_at(user_id, email, OffsetDateTime::now_utc())
    }

    pub fn issue_at(
        &self,
        user_id: Uuid,
        email: &str,
        now: OffsetDateTime,
    ) -> anyhow::Result<IssuedToken> {
        let expires_at = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            iat: now.unix_timestamp().max(0) as usize,
            exp: expires_at.unix_timestamp().max(0) as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(IssuedToken { token, expires_at })
    }

    /// Checks signature, expiry, issuer and audience. Every failure is
    /// `InvalidToken` to the caller; the cause only goes to the log.
    pub fn verify(&self, token: &str) -> ApiResult<Claims> {
        let mut validation = Validation::default();
        // exp is enforced to the second
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));

        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => {
                debug!(user_id = %data.claims.sub, "jwt verified");
                Ok(data.claims)
            }
            Err(e) => {
                match e.kind() {
                    ErrorKind::ExpiredSignature => warn!("token rejected: expired"),
                    ErrorKind::InvalidSignature => warn!("token rejected: bad signature"),
                    ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => {
                        warn!(error = %e, "token rejected: wrong issuer or audience")
                    }
                    _ => warn!(error = %e, "token rejected: malformed"),
                }
                Err(ApiError::InvalidToken)
            }
        }
    }
}
