//! Test fixtures and request bodies

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Create poll request
#[derive(Debug, Clone, Serialize)]
pub struct CreatePollRequest {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub options: Vec<String>,
}

impl CreatePollRequest {
    pub fn unique() -> Self {
        Self::with_options(&["Yes", "No"])
    }

    pub fn with_options(options: &[&str]) -> Self {
        Self {
            question: format!("Question {}?", unique_suffix()),
            description: None,
            options: options.iter().map(|o| (*o).to_string()).collect(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// Vote request
#[derive(Debug, Serialize)]
pub struct VoteRequest {
    pub option_id: i64,
}

/// Error envelope returned by the API
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}
