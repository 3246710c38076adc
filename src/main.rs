use std::time::Duration;

use tracing::info;

mod app;
mod auth;
mod comments;
mod config;
mod db;
mod error;
mod extract;
mod offers;
mod state;
mod validation;

use crate::{auth::registry::spawn_pruner, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "rentals=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = AppState::init().await?;
    let config = state.config.clone();

    let every = Duration::from_secs(config.prune_interval_secs.max(1));
    spawn_pruner(state.registry.clone(), every);
    info!(every_secs = every.as_secs(), "token pruner started");

    let app = app::build_app(state);
    app::serve(app, &config).await
}
