use anyhow::Context;
use serde::Deserialize;

/// Tokens live for 24 hours unless overridden.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 24 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// `None` runs the service on in-memory stores.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub jwt: JwtConfig,
    pub host: String,
    pub port: u16,
    pub prune_interval_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());
        let jwt = JwtConfig {
            secret: lookup("JWT_SECRET").context("JWT_SECRET must be set")?,
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "rentals".into()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "rentals-users".into()),
            ttl_minutes: parse_or(&lookup, "JWT_TTL_MINUTES", DEFAULT_TOKEN_TTL_MINUTES)?,
        };
        anyhow::ensure!(jwt.ttl_minutes > 0, "JWT_TTL_MINUTES must be positive");

        Ok(Self {
            database_url,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            jwt,
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&lookup, "APP_PORT", 8080)?,
            prune_interval_secs: parse_or(&lookup, "TOKEN_PRUNE_INTERVAL_SECS", 300)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let cfg = AppConfig::from_lookup(lookup_from(&[("JWT_SECRET", "s3cret")])).unwrap();
        assert!(cfg.database_url.is_none());
        assert_eq!(cfg.jwt.secret, "s3cret");
        assert_eq!(cfg.jwt.issuer, "rentals");
        assert_eq!(cfg.jwt.audience, "rentals-users");
        assert_eq!(cfg.jwt.ttl_minutes, 24 * 60);
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.prune_interval_secs, 300);
        assert_eq!(cfg.db_max_connections, 10);
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("JWT_SECRET", "x"),
            ("DATABASE_URL", "postgres://localhost/rentals"),
            ("APP_PORT", "5050"),
            ("JWT_TTL_MINUTES", "15"),
        ]))
        .unwrap();
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/rentals"));
        assert_eq!(cfg.port, 5050);
        assert_eq!(cfg.jwt.ttl_minutes, 15);
    }

    #[test]
    fn garbage_port_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[("JWT_SECRET", "x"), ("APP_PORT", "http")]))
            .unwrap_err();
        assert!(err.to_string().contains("APP_PORT"));
    }

    #[test]
    fn blank_database_url_means_memory() {
        let cfg = AppConfig::from_lookup(lookup_from(&[("JWT_SECRET", "x"), ("DATABASE_URL", "  ")]))
            .unwrap();
        assert!(cfg.database_url.is_none());
    }
}
