//! Repository implementations

mod error;
mod poll;
mod sqlite;

pub use poll::InMemoryPollRepository;
pub use sqlite::SqlitePollRepository;
