//! Poll entity - a question with an ordered list of votable options

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::value_objects::{OptionId, PollId};

/// Minimum number of options a poll is created with
pub const MIN_OPTIONS: usize = 2;

/// A single votable option of a poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    pub id: OptionId,
    pub text: String,
    pub votes: u64,
}

impl PollOption {
    /// Create a new option with zero votes
    pub fn new(id: OptionId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            votes: 0,
        }
    }

    /// Share of `total` votes held by this option, rounded to a whole percent
    ///
    /// Returns 0 when no votes have been cast.
    pub fn percentage(&self, total: u64) -> u64 {
        if total == 0 {
            return 0;
        }
        (self.votes as f64 * 100.0 / total as f64).round() as u64
    }
}

/// Poll entity
///
/// Always travels as a complete value: updates replace the whole poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub id: PollId,
    pub question: String,
    #[serde(default)]
    pub description: Option<String>,
    pub likes: u64,
    pub created_at: DateTime<Utc>,
    pub options: Vec<PollOption>,
}

impl Poll {
    /// Total votes across all options
    pub fn total_votes(&self) -> u64 {
        self.options.iter().map(|o| o.votes).sum()
    }

    /// Per-option percentages, in option order
    pub fn percentages(&self) -> Vec<u64> {
        let total = self.total_votes();
        self.options.iter().map(|o| o.percentage(total)).collect()
    }

    /// Find an option by id
    pub fn option(&self, option_id: OptionId) -> Option<&PollOption> {
        self.options.iter().find(|o| o.id == option_id)
    }

    /// Structural check applied to every poll received over the wire
    ///
    /// Returns a human readable reason when the poll is not well formed.
    pub fn check_well_formed(&self) -> Result<(), String> {
        if self.question.trim().is_empty() {
            return Err("question is empty".to_string());
        }
        if self.options.len() < MIN_OPTIONS {
            return Err(format!(
                "expected at least {MIN_OPTIONS} options, got {}",
                self.options.len()
            ));
        }
        let mut seen = HashSet::with_capacity(self.options.len());
        for option in &self.options {
            if option.text.trim().is_empty() {
                return Err(format!("option {} has empty text", option.id));
            }
            if !seen.insert(option.id) {
                return Err(format!("duplicate option id {}", option.id));
            }
        }
        Ok(())
    }

    /// Collection order: newest first, higher id first on equal timestamps
    pub fn display_order(&self, other: &Self) -> Ordering {
        other
            .created_at
            .cmp(&self.created_at)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Sort polls into collection order (see [`Poll::display_order`])
pub fn sort_polls(polls: &mut [Poll]) {
    polls.sort_by(Poll::display_order);
}

/// Validated input for creating a poll
///
/// Construction normalizes the input the way the data layer stores it:
/// the question is trimmed, option texts are trimmed and blank options
/// are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPoll {
    question: String,
    description: Option<String>,
    options: Vec<String>,
}

impl NewPoll {
    /// Normalize and validate creation input
    pub fn new(
        question: &str,
        description: Option<String>,
        options: &[String],
    ) -> Result<Self, String> {
        let question = question.trim();
        if question.is_empty() {
            return Err("Question must not be empty.".to_string());
        }

        let options: Vec<String> = options
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect();

        if options.len() < MIN_OPTIONS {
            return Err("A poll requires at least two options.".to_string());
        }

        let mut seen = HashSet::with_capacity(options.len());
        if let Some(dup) = options.iter().find(|o| !seen.insert(o.as_str())) {
            return Err(format!("Duplicate option: {dup}"));
        }

        let description = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(Self {
            question: question.to_string(),
            description,
            options,
        })
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }
}
