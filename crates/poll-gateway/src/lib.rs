//! # poll-gateway
//!
//! Real-time push channel for poll updates.
//!
//! [`BroadcastHub`] owns the registry of live connections and fans every
//! [`poll_core::PollEvent`] out to all of them. The `/ws` endpoint registers
//! each socket with the hub, sends it a full snapshot and then streams
//! events until either side goes away.

pub mod connection;
pub mod server;

pub use connection::{BroadcastHub, Connection, ConnectionHandle, ConnectionId, HubStats};
pub use server::{ws_handler, ws_router, GatewayState};
