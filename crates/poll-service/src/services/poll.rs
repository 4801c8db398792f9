//! Poll service
//!
//! Handles poll creation, voting and likes, and bridges every successful
//! mutation to the event publisher. Each write, its reload and its publish
//! hold the poll's lock, so updates for one poll are published in write order.

use tracing::{debug, info, instrument, warn};

use poll_core::{DomainError, OptionId, Poll, PollEvent, PollId};

use crate::dto::CreatePollRequest;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Poll service
pub struct PollService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PollService<'a> {
    /// Create a new PollService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// List all polls, newest first
    #[instrument(skip(self))]
    pub async fn list_polls(&self) -> ServiceResult<Vec<Poll>> {
        Ok(self.ctx.poll_repo().list().await?)
    }

    /// Get a single poll
    #[instrument(skip(self))]
    pub async fn get_poll(&self, poll_id: PollId) -> ServiceResult<Poll> {
        self.ctx
            .poll_repo()
            .find_by_id(poll_id)
            .await?
            .ok_or_else(|| DomainError::PollNotFound(poll_id).into())
    }

    /// Create a poll and announce it
    #[instrument(skip(self, request), fields(question = %request.question))]
    pub async fn create_poll(&self, request: &CreatePollRequest) -> ServiceResult<Poll> {
        let new_poll = request.to_new_poll().map_err(ServiceError::validation)?;

        let poll_id = self.ctx.poll_repo().create(&new_poll).await?;
        let _guard = self.ctx.poll_locks().acquire(poll_id).await;
        let poll = self.reload(poll_id).await?;

        info!(poll_id = %poll_id, options = poll.options.len(), "Poll created");

        self.emit(PollEvent::Created { poll: poll.clone() }).await;
        Ok(poll)
    }

    /// Record one vote and announce the updated poll
    #[instrument(skip(self))]
    pub async fn vote(&self, poll_id: PollId, option_id: OptionId) -> ServiceResult<Poll> {
        let _guard = self.ctx.poll_locks().acquire(poll_id).await;
        self.ctx
            .poll_repo()
            .increment_vote(poll_id, option_id)
            .await?;
        let poll = self.reload(poll_id).await?;

        debug!(poll_id = %poll_id, option_id = %option_id, "Vote recorded");

        self.emit(PollEvent::Updated { poll: poll.clone() }).await;
        Ok(poll)
    }

    /// Record one like and announce the updated poll
    #[instrument(skip(self))]
    pub async fn like(&self, poll_id: PollId) -> ServiceResult<Poll> {
        let _guard = self.ctx.poll_locks().acquire(poll_id).await;
        self.ctx.poll_repo().increment_like(poll_id).await?;
        let poll = self.reload(poll_id).await?;

        debug!(poll_id = %poll_id, likes = poll.likes, "Like recorded");

        self.emit(PollEvent::Updated { poll: poll.clone() }).await;
        Ok(poll)
    }

    // ========================================================================
    // Helper Methods
    // ========================================================================

    /// Read back the stored value after a confirmed write
    async fn reload(&self, poll_id: PollId) -> ServiceResult<Poll> {
        self.ctx
            .poll_repo()
            .find_by_id(poll_id)
            .await?
            .ok_or_else(|| ServiceError::internal(format!("poll {poll_id} missing after write")))
    }

    /// Hand an event to the publisher; the mutation has already succeeded
    async fn emit(&self, event: PollEvent) {
        let kind = event.kind();
        match self.ctx.publisher().publish(event).await {
            Ok(delivered) => debug!(kind, delivered, "Event published"),
            Err(e) => warn!(kind, error = %e, "Failed to publish event"),
        }
    }
}
