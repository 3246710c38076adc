pub mod dto;
pub mod handlers;
pub mod memory;
pub mod repo;
pub mod repo_types;
mod services;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    handlers::comment_routes()
}
