//! Client error types

use thiserror::Error;

/// Connection-level failure
///
/// Never fatal: the supervisor reacts by reconnecting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("connection closed")]
    Closed,

    #[error("websocket error: {0}")]
    WebSocket(String),

    #[error("snapshot request failed: {0}")]
    Http(String),
}

/// Errors surfaced to callers of the client API
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("invalid value for {0}: {1}")]
    InvalidConfig(&'static str, String),

    #[error("supervisor already started")]
    AlreadyStarted,

    #[error("supervisor stopped")]
    Stopped,

    #[error(transparent)]
    Transport(#[from] TransportError),
}
