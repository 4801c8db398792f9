//! Integration test utilities for the poll server
//!
//! This crate provides helpers for running end-to-end tests against
//! the REST API and the push channel.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
