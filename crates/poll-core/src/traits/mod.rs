//! Ports implemented by infrastructure crates

mod publisher;
mod repositories;

pub use publisher::{EventPublisher, PublishError};
pub use repositories::{PollRepository, RepoResult};
