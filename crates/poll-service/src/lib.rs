//! # poll-service
//!
//! Application layer containing the poll use cases and their DTOs.
//!
//! Every successful mutation goes through [`PollService`], which reloads the
//! stored poll and hands exactly one event to the configured
//! [`poll_core::EventPublisher`].

pub mod dto;
pub mod services;

pub use dto::{CreatePollRequest, HealthResponse, VoteRequest};
pub use services::{PollService, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult};
