//! Event envelope - the wire contract between the hub and its clients
//!
//! ```json
//! { "type": "snapshot", "polls": [ ... ] }
//! { "type": "created",  "poll": { ... } }
//! { "type": "updated",  "poll": { ... } }
//! ```
//!
//! `created` and `updated` always carry a complete poll, so applying an
//! event is a full replacement and never a field-level merge.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::Poll;
use crate::value_objects::PollId;

/// State-change notification pushed to every connected client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PollEvent {
    /// Full ordered collection; replaces all local state
    #[serde(alias = "poll_snapshot")]
    Snapshot { polls: Vec<Poll> },

    /// A poll that did not exist before
    #[serde(alias = "poll_created")]
    Created { poll: Poll },

    /// New complete value of an existing poll
    #[serde(alias = "poll_updated")]
    Updated { poll: Poll },
}

/// A frame that could not be turned into a usable [`PollEvent`]
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid poll {poll_id} in envelope: {reason}")]
    InvalidPoll { poll_id: PollId, reason: String },
}

impl PollEvent {
    /// Get the wire tag of this event
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Snapshot { .. } => "snapshot",
            Self::Created { .. } => "created",
            Self::Updated { .. } => "updated",
        }
    }

    /// Serialize to a JSON text frame
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse and validate a JSON text frame
    ///
    /// Unknown tags, missing fields and structurally invalid polls are all
    /// rejected; nothing partial is ever returned.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let event: Self = serde_json::from_str(text)?;
        event.validate()?;
        Ok(event)
    }

    fn validate(&self) -> Result<(), ProtocolError> {
        let polls: &[Poll] = match self {
            Self::Snapshot { polls } => polls,
            Self::Created { poll } | Self::Updated { poll } => std::slice::from_ref(poll),
        };

        for poll in polls {
            poll.check_well_formed()
                .map_err(|reason| ProtocolError::InvalidPoll {
                    poll_id: poll.id,
                    reason,
                })?;
        }
        Ok(())
    }
}

impl std::fmt::Display for PollEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Snapshot { polls } => write!(f, "PollEvent(snapshot, polls={})", polls.len()),
            Self::Created { poll } => write!(f, "PollEvent(created, id={})", poll.id),
            Self::Updated { poll } => write!(f, "PollEvent(updated, id={})", poll.id),
        }
    }
}
