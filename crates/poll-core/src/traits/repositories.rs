//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;

use crate::entities::{NewPoll, Poll};
use crate::error::DomainError;
use crate::value_objects::{OptionId, PollId};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

#[async_trait]
pub trait PollRepository: Send + Sync {
    /// List all polls, newest first
    async fn list(&self) -> RepoResult<Vec<Poll>>;

    /// Find poll by ID
    async fn find_by_id(&self, id: PollId) -> RepoResult<Option<Poll>>;

    /// Persist a new poll; id, option ids and creation time are assigned here
    async fn create(&self, poll: &NewPoll) -> RepoResult<PollId>;

    /// Add one vote to an option of a poll
    async fn increment_vote(&self, poll_id: PollId, option_id: OptionId) -> RepoResult<()>;

    /// Add one like to a poll
    async fn increment_like(&self, poll_id: PollId) -> RepoResult<()>;
}
