//! # poll-core
//!
//! Domain layer containing the poll entities, the real-time event envelope,
//! domain errors, and the ports implemented by the data layer and the
//! broadcast hub. This crate has zero dependencies on infrastructure.

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{sort_polls, NewPoll, Poll, PollOption};
pub use error::DomainError;
pub use events::{PollEvent, ProtocolError};
pub use traits::{EventPublisher, PublishError, PollRepository, RepoResult};
pub use value_objects::{IdParseError, OptionId, PollId};
