//! Transport ports and their network adapters
//!
//! The supervisor only talks to these traits, so it can be driven by a
//! fake connector in tests.

mod http;
mod websocket;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use poll_core::Poll;

use crate::error::TransportError;

pub use http::HttpSnapshotSource;
pub use websocket::{WsConnector, WsTransport};

/// Opens push channel connections
#[async_trait]
pub trait Connector: Send + Sync {
    /// Perform the transport handshake
    async fn connect(&self) -> Result<Box<dyn Transport>, TransportError>;
}

/// One live push channel connection
#[async_trait]
pub trait Transport: Send {
    /// Next text frame
    ///
    /// `None` means the peer closed the connection.
    async fn next_message(&mut self) -> Option<Result<String, TransportError>>;

    /// Close the connection, ignoring errors
    async fn close(&mut self);
}

/// Bulk read of the full poll collection
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<Vec<Poll>, TransportError>;
}
