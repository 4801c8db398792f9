//! Data transfer objects for API requests and responses
//!
//! Polls are returned as the domain entity itself; its serde shape is the
//! wire shape shared with the push channel.

pub mod requests;
pub mod responses;

pub use requests::{CreatePollRequest, VoteRequest};
pub use responses::HealthResponse;
