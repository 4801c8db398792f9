//! Service context - dependency container for services
//!
//! Holds the poll repository, the event publisher the bridge hands
//! events to and the per-poll write locks.

use std::sync::Arc;

use poll_core::{EventPublisher, PollRepository};

use super::error::{ServiceError, ServiceResult};
use super::locks::PollLocks;

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    poll_repo: Arc<dyn PollRepository>,
    publisher: Arc<dyn EventPublisher>,
    poll_locks: Arc<PollLocks>,
}

impl ServiceContext {
    /// Create a new service context
    pub fn new(poll_repo: Arc<dyn PollRepository>, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            poll_repo,
            publisher,
            poll_locks: Arc::new(PollLocks::new()),
        }
    }

    /// Get the poll repository
    pub fn poll_repo(&self) -> &dyn PollRepository {
        self.poll_repo.as_ref()
    }

    /// Get a shared handle to the poll repository
    pub fn poll_repo_arc(&self) -> Arc<dyn PollRepository> {
        Arc::clone(&self.poll_repo)
    }

    /// Get the event publisher
    pub fn publisher(&self) -> &dyn EventPublisher {
        self.publisher.as_ref()
    }

    /// Per-poll write locks, shared by every clone of this context
    pub fn poll_locks(&self) -> &Arc<PollLocks> {
        &self.poll_locks
    }
}

/// Builder for ServiceContext
#[derive(Default)]
pub struct ServiceContextBuilder {
    poll_repo: Option<Arc<dyn PollRepository>>,
    publisher: Option<Arc<dyn EventPublisher>>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poll_repo(mut self, repo: Arc<dyn PollRepository>) -> Self {
        self.poll_repo = Some(repo);
        self
    }

    pub fn publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.poll_repo
                .ok_or_else(|| ServiceError::validation("poll_repo is required"))?,
            self.publisher
                .ok_or_else(|| ServiceError::validation("publisher is required"))?,
        ))
    }
}
