//! # poll-api
//!
//! REST API server built with Axum. Serves the poll endpoints and mounts
//! the push channel from `poll-gateway` on the same listener.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_app_state, run, serve};
pub use state::AppState;
