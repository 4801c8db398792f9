//! Connection management
//!
//! Individual push connections and the hub that fans events out to them.

mod connection;
mod hub;

pub use connection::{Connection, ConnectionHandle, ConnectionId};
pub use hub::{BroadcastHub, HubStats};
