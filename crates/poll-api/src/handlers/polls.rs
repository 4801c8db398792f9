//! Poll handlers
//!
//! Every mutating endpoint returns the stored poll after the change; the
//! same value is pushed to all connected clients.

use axum::{extract::State, Json};
use poll_core::Poll;
use poll_service::{CreatePollRequest, PollService, VoteRequest};

use crate::extractors::{PollIdPath, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// List polls, newest first
///
/// GET /polls
pub async fn list_polls(State(state): State<AppState>) -> ApiResult<Json<Vec<Poll>>> {
    let service = PollService::new(state.service_context());
    Ok(Json(service.list_polls().await?))
}

/// Create a poll
///
/// POST /polls
pub async fn create_poll(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreatePollRequest>,
) -> ApiResult<Created<Json<Poll>>> {
    let service = PollService::new(state.service_context());
    let poll = service.create_poll(&request).await?;
    Ok(Created(Json(poll)))
}

/// Get poll by ID
///
/// GET /polls/{poll_id}
pub async fn get_poll(
    State(state): State<AppState>,
    PollIdPath(poll_id): PollIdPath,
) -> ApiResult<Json<Poll>> {
    let service = PollService::new(state.service_context());
    Ok(Json(service.get_poll(poll_id).await?))
}

/// Vote for one option of a poll
///
/// POST /polls/{poll_id}/vote
pub async fn vote(
    State(state): State<AppState>,
    PollIdPath(poll_id): PollIdPath,
    ValidatedJson(request): ValidatedJson<VoteRequest>,
) -> ApiResult<Json<Poll>> {
    let service = PollService::new(state.service_context());
    Ok(Json(service.vote(poll_id, request.option_id).await?))
}

/// Like a poll
///
/// POST /polls/{poll_id}/like
pub async fn like(
    State(state): State<AppState>,
    PollIdPath(poll_id): PollIdPath,
) -> ApiResult<Json<Poll>> {
    let service = PollService::new(state.service_context());
    Ok(Json(service.like(poll_id).await?))
}
