//! Health check handlers

use axum::Json;
use poll_service::HealthResponse;

/// Basic health check (liveness)
///
/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
