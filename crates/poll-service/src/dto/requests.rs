//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize`; those with user-supplied text
//! also implement `Validate`.

use poll_core::{NewPoll, OptionId};
use serde::Deserialize;
use validator::Validate;

/// Create poll request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePollRequest {
    #[validate(length(min = 1, message = "Question must not be empty"))]
    pub question: String,

    #[serde(default)]
    pub description: Option<String>,

    #[validate(length(min = 2, message = "A poll requires at least 2 options"))]
    pub options: Vec<String>,
}

impl CreatePollRequest {
    /// Normalize into the domain input (trimming, blank option removal)
    pub fn to_new_poll(&self) -> Result<NewPoll, String> {
        NewPoll::new(&self.question, self.description.clone(), &self.options)
    }
}

/// Cast a vote for one option
#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct VoteRequest {
    pub option_id: OptionId,
}
