//! Event publisher port
//!
//! The seam between the mutation layer and whatever fans events out to
//! clients. The in-process broadcast hub implements it today; a message-bus
//! backed implementation can replace it without touching either side.

use async_trait::async_trait;
use thiserror::Error;

use crate::events::PollEvent;

/// Hub-level failure to publish an event
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Failed to serialize event: {0}")]
    Serialization(String),

    #[error("Publisher unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Deliver an event to every subscriber, returning how many received it
    async fn publish(&self, event: PollEvent) -> Result<usize, PublishError>;
}
