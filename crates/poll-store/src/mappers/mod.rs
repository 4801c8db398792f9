//! Poll entity <-> model mappers

use std::collections::HashMap;

use poll_core::{OptionId, Poll, PollId, PollOption};

use crate::models::{PollModel, PollOptionModel};

/// Counters are never negative in the table; clamp rather than wrap if they are
fn counter(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

impl From<PollOptionModel> for PollOption {
    fn from(model: PollOptionModel) -> Self {
        PollOption {
            id: OptionId::new(model.id),
            text: model.text,
            votes: counter(model.votes),
        }
    }
}

impl PollModel {
    /// Assemble the entity from its row and its option rows in id order
    pub fn into_poll(self, options: Vec<PollOptionModel>) -> Poll {
        Poll {
            id: PollId::new(self.id),
            question: self.question,
            description: self.description,
            likes: counter(self.likes),
            created_at: self.created_at,
            options: options.into_iter().map(PollOption::from).collect(),
        }
    }
}

/// Attach option rows to their polls
///
/// Option rows must already be sorted by id; polls keep the given order.
pub fn assemble(polls: Vec<PollModel>, options: Vec<PollOptionModel>) -> Vec<Poll> {
    let mut by_poll: HashMap<i64, Vec<PollOptionModel>> = HashMap::new();
    for option in options {
        by_poll.entry(option.poll_id).or_default().push(option);
    }

    polls
        .into_iter()
        .map(|poll| {
            let options = by_poll.remove(&poll.id).unwrap_or_default();
            poll.into_poll(options)
        })
        .collect()
}
