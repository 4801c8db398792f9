//! Domain entities - core business objects

mod poll;

pub use poll::{sort_polls, NewPoll, Poll, PollOption};
