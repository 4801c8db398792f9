//! In-memory implementation of PollRepository

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use tracing::{debug, instrument};

use poll_core::{
    sort_polls, DomainError, NewPoll, OptionId, Poll, PollId, PollOption, PollRepository,
    RepoResult,
};

#[derive(Default)]
struct StoreState {
    polls: BTreeMap<PollId, Poll>,
    last_poll_id: i64,
    last_option_id: i64,
    last_created_at: Option<DateTime<Utc>>,
}

impl StoreState {
    fn next_poll_id(&mut self) -> PollId {
        self.last_poll_id += 1;
        PollId::new(self.last_poll_id)
    }

    fn next_option_id(&mut self) -> OptionId {
        self.last_option_id += 1;
        OptionId::new(self.last_option_id)
    }

    /// Wall-clock time, nudged forward so that no two polls share a timestamp
    fn next_created_at(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let created_at = match self.last_created_at {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created_at = Some(created_at);
        created_at
    }

    fn poll_mut(&mut self, id: PollId) -> RepoResult<&mut Poll> {
        self.polls.get_mut(&id).ok_or(DomainError::PollNotFound(id))
    }
}

/// Thread-safe in-process poll store
#[derive(Default)]
pub struct InMemoryPollRepository {
    state: RwLock<StoreState>,
}

impl InMemoryPollRepository {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored polls
    pub fn len(&self) -> usize {
        self.state.read().polls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PollRepository for InMemoryPollRepository {
    #[instrument(skip(self))]
    async fn list(&self) -> RepoResult<Vec<Poll>> {
        let mut polls: Vec<Poll> = self.state.read().polls.values().cloned().collect();
        sort_polls(&mut polls);
        Ok(polls)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: PollId) -> RepoResult<Option<Poll>> {
        Ok(self.state.read().polls.get(&id).cloned())
    }

    #[instrument(skip(self, poll), fields(question = %poll.question()))]
    async fn create(&self, poll: &NewPoll) -> RepoResult<PollId> {
        let mut state = self.state.write();

        let id = state.next_poll_id();
        let created_at = state.next_created_at();
        let options = poll
            .options()
            .iter()
            .map(|text| PollOption::new(state.next_option_id(), text.clone()))
            .collect();

        state.polls.insert(
            id,
            Poll {
                id,
                question: poll.question().to_string(),
                description: poll.description().map(String::from),
                likes: 0,
                created_at,
                options,
            },
        );

        debug!(poll_id = %id, "Poll stored");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn increment_vote(&self, poll_id: PollId, option_id: OptionId) -> RepoResult<()> {
        let mut state = self.state.write();
        let option = state
            .poll_mut(poll_id)?
            .options
            .iter_mut()
            .find(|o| o.id == option_id)
            .ok_or(DomainError::OptionNotFound { poll_id, option_id })?;
        option.votes += 1;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn increment_like(&self, poll_id: PollId) -> RepoResult<()> {
        let mut state = self.state.write();
        state.poll_mut(poll_id)?.likes += 1;
        Ok(())
    }
}
