//! Response DTOs for API endpoints

use serde::Serialize;

/// Liveness response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub detail: &'static str,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self { detail: "ok" }
    }
}
