//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::{OptionId, PollId};

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Poll not found: {0}")]
    PollNotFound(PollId),

    #[error("Option {option_id} not found in poll {poll_id}")]
    OptionNotFound { poll_id: PollId, option_id: OptionId },

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::PollNotFound(_) => "UNKNOWN_POLL",
            Self::OptionNotFound { .. } => "UNKNOWN_OPTION",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::StorageError(_) => "STORAGE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PollNotFound(_) | Self::OptionNotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_))
    }
}
