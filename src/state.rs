use std::sync::Arc;

use tracing::warn;

use crate::{
    auth::{
        jwt::JwtKeys,
        memory::MemoryUserStore,
        registry::RevocationRegistry,
        repo::{PgUserStore, UserStore},
    },
    comments::{
        memory::MemoryCommentStore,
        repo::{CommentStore, PgCommentStore},
    },
    config::AppConfig,
    db,
    offers::{
        memory::MemoryOfferStore,
        repo::{OfferStore, PgOfferStore},
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub offers: Arc<dyn OfferStore>,
    pub comments: Arc<dyn CommentStore>,
    pub keys: JwtKeys,
    pub registry: Arc<RevocationRegistry>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let keys = JwtKeys::from_config(&config.jwt);
        let registry = Arc::new(RevocationRegistry::new());

        let state = match &config.database_url {
            Some(url) => {
                let pool = db::connect(url, config.db_max_connections).await?;
                db::migrate(&pool).await;
                Self {
                    users: Arc::new(PgUserStore::new(pool.clone())),
                    offers: Arc::new(PgOfferStore::new(pool.clone())),
                    comments: Arc::new(PgCommentStore::new(pool)),
                    config: Arc::clone(&config),
                    keys,
                    registry,
                }
            }
            None => {
                warn!("DATABASE_URL not set; using in-memory stores, data is lost on restart");
                Self::in_memory(Arc::clone(&config), keys, registry)
            }
        };
        Ok(state)
    }

    fn in_memory(config: Arc<AppConfig>, keys: JwtKeys, registry: Arc<RevocationRegistry>) -> Self {
        Self {
            config,
            users: Arc::new(MemoryUserStore::new()),
            offers: Arc::new(MemoryOfferStore::new()),
            comments: Arc::new(MemoryCommentStore::new()),
            keys,
            registry,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::{JwtConfig, DEFAULT_TOKEN_TTL_MINUTES};

        let config = Arc::new(AppConfig {
            database_url: None,
            db_max_connections: 1,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test".into(),
                audience: "test".into(),
                ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
            },
            host: "127.0.0.1".into(),
            port: 0,
            prune_interval_secs: 300,
        });
        let keys = JwtKeys::from_config(&config.jwt);
        Self::in_memory(config, keys, Arc::new(RevocationRegistry::new()))
    }
}
