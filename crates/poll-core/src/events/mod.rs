//! Real-time event envelope
//!
//! Every message pushed to clients is one [`PollEvent`].

mod envelope;

pub use envelope::{PollEvent, ProtocolError};
