//! Connection supervisor
//!
//! Owns the push channel lifecycle as an explicit state machine:
//!
//! ```text
//! Disconnected --Start--> Connecting --HandshakeSucceeded--> Connected
//!                              ^    \                            |
//!                 BackoffElapsed     HandshakeFailed      TransportClosed
//!                              |    v                            |
//!                            Reconnecting <----------------------+
//! ```
//!
//! `Stop` leads to `Disconnected` from any state.

mod driver;
mod state;

pub use driver::{Supervisor, SupervisorStatus};
pub use state::{InvalidTransition, SupervisorEvent, SupervisorState};
