//! Route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{health, polls};
use crate::state::AppState;

/// Create the main router: REST endpoints plus the `/ws` push channel
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .merge(poll_routes())
        .merge(poll_gateway::ws_router())
}

/// Poll routes
fn poll_routes() -> Router<AppState> {
    Router::new()
        .route("/polls", get(polls::list_polls).post(polls::create_poll))
        .route("/polls/:poll_id", get(polls::get_poll))
        .route("/polls/:poll_id/vote", post(polls::vote))
        .route("/polls/:poll_id/like", post(polls::like))
}
