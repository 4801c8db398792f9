//! Push channel routes

mod handler;
mod state;

pub use handler::ws_handler;
pub use state::GatewayState;

use axum::{extract::FromRef, routing::get, Router};

/// Router exposing the push channel at `/ws`
///
/// Generic over the outer application state so it can be merged into a
/// larger router.
pub fn ws_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    GatewayState: FromRef<S>,
{
    Router::new().route("/ws", get(ws_handler))
}
