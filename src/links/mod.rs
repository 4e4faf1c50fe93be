use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

/// Link creation, mounted under the protected prefix.
pub fn router() -> Router<AppState> {
    handlers::link_routes()
}

/// Public `GET /:source` redirect.
pub fn redirect_router() -> Router<AppState> {
    handlers::redirect_routes()
}
