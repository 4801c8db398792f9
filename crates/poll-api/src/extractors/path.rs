//! Path parameter extractors

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use poll_core::PollId;

use crate::response::ApiError;

/// Extract the `poll_id` path segment as a [`PollId`]
#[derive(Debug, Clone, Copy)]
pub struct PollIdPath(pub PollId);

#[async_trait]
impl<S> FromRequestParts<S> for PollIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.to_string()))?;

        raw.parse()
            .map(PollIdPath)
            .map_err(|_| ApiError::invalid_path("Invalid poll_id format"))
    }
}
