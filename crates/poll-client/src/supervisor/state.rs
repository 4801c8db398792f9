//! Supervisor state machine

use std::fmt;

use thiserror::Error;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SupervisorState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

/// Input driving the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupervisorEvent {
    Start,
    HandshakeSucceeded,
    HandshakeFailed,
    TransportClosed,
    BackoffElapsed,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid transition from {from} on {event:?}")]
pub struct InvalidTransition {
    pub from: SupervisorState,
    pub event: SupervisorEvent,
}

impl SupervisorState {
    /// Next state for `event`
    pub fn on(self, event: SupervisorEvent) -> Result<Self, InvalidTransition> {
        use SupervisorEvent as E;

        match (self, event) {
            (_, E::Stop) => Ok(Self::Disconnected),
            (Self::Disconnected, E::Start) => Ok(Self::Connecting),
            (Self::Connecting, E::HandshakeSucceeded) => Ok(Self::Connected),
            (Self::Connecting, E::HandshakeFailed) => Ok(Self::Reconnecting),
            (Self::Connected, E::TransportClosed) => Ok(Self::Reconnecting),
            (Self::Reconnecting, E::BackoffElapsed) => Ok(Self::Connecting),
            (from, event) => Err(InvalidTransition { from, event }),
        }
    }

    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
        }
    }
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
