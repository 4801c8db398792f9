//! Reconciliation engine
//!
//! Folds snapshots and incremental events into one ordered view of the
//! poll collection. Every operation leaves the collection sorted newest
//! first (higher id first on equal timestamps), so the result does not
//! depend on the order in which events arrive.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};
use poll_core::{sort_polls, Poll, PollEvent, ProtocolError};
use tokio::sync::watch;
use tracing::{debug, trace, warn};

/// Result of applying one envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The collection was updated
    Applied,
    /// An incremental event arrived before the session's first snapshot
    Discarded,
}

/// Local, ordered view of the poll collection
#[derive(Debug, Default)]
pub struct ReconciliationEngine {
    polls: Vec<Poll>,
    last_known_good: bool,
    awaiting_snapshot: bool,
    anomalies: u64,
    discarded_before_snapshot: u64,
    revision: u64,
}

impl ReconciliationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole collection
    pub fn replace_with_snapshot(&mut self, mut polls: Vec<Poll>) {
        sort_polls(&mut polls);
        debug!(polls = polls.len(), "Applying snapshot");
        self.polls = polls;
        self.awaiting_snapshot = false;
        self.mark_applied();
    }

    /// Insert a new poll, replacing an existing entry with the same id
    pub fn apply_created(&mut self, poll: Poll) {
        trace!(poll_id = %poll.id, "Applying created");
        self.upsert(poll);
    }

    /// Replace an existing poll; an unknown id is inserted
    pub fn apply_updated(&mut self, poll: Poll) {
        trace!(poll_id = %poll.id, "Applying updated");
        self.upsert(poll);
    }

    /// Apply an already decoded envelope, honouring the snapshot gate
    pub fn apply_event(&mut self, event: PollEvent) -> ApplyOutcome {
        match event {
            PollEvent::Snapshot { polls } => {
                self.replace_with_snapshot(polls);
                ApplyOutcome::Applied
            }
            PollEvent::Created { poll } | PollEvent::Updated { poll } if self.awaiting_snapshot => {
                self.discarded_before_snapshot += 1;
                debug!(poll_id = %poll.id, "Discarding event received before snapshot");
                ApplyOutcome::Discarded
            }
            PollEvent::Created { poll } => {
                self.apply_created(poll);
                ApplyOutcome::Applied
            }
            PollEvent::Updated { poll } => {
                self.apply_updated(poll);
                ApplyOutcome::Applied
            }
        }
    }

    /// Decode one raw frame and apply it
    ///
    /// A frame that fails to decode counts as an anomaly and leaves the
    /// collection untouched.
    pub fn apply_message(&mut self, text: &str) -> Result<ApplyOutcome, ProtocolError> {
        match PollEvent::decode(text) {
            Ok(event) => Ok(self.apply_event(event)),
            Err(e) => {
                self.anomalies += 1;
                warn!(error = %e, anomalies = self.anomalies, "Dropping malformed envelope");
                Err(e)
            }
        }
    }

    /// Start a new transport session
    ///
    /// The collection is kept, but incremental events are ignored until
    /// the next snapshot arrives.
    pub fn begin_session(&mut self) {
        self.last_known_good = false;
        self.awaiting_snapshot = true;
    }

    /// Ordered copy of the collection
    pub fn current_view(&self) -> Vec<Poll> {
        self.polls.clone()
    }

    pub fn polls(&self) -> &[Poll] {
        &self.polls
    }

    pub fn is_last_known_good(&self) -> bool {
        self.last_known_good
    }

    pub fn is_awaiting_snapshot(&self) -> bool {
        self.awaiting_snapshot
    }

    /// Number of malformed envelopes seen
    pub fn anomalies(&self) -> u64 {
        self.anomalies
    }

    pub fn discarded_before_snapshot(&self) -> u64 {
        self.discarded_before_snapshot
    }

    /// Bumped on every change to the collection
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn upsert(&mut self, poll: Poll) {
        match self.polls.iter_mut().find(|p| p.id == poll.id) {
            Some(existing) => *existing = poll,
            None => self.polls.push(poll),
        }
        sort_polls(&mut self.polls);
        self.mark_applied();
    }

    fn mark_applied(&mut self) {
        self.last_known_good = true;
        self.revision += 1;
    }
}

/// Engine shared between the supervisor task and its consumers
///
/// Mutations run under one write lock, so each envelope is applied
/// atomically and readers never see a half-applied state. Subscribers of
/// [`SharedEngine::subscribe`] are woken after every change.
#[derive(Debug, Clone)]
pub struct SharedEngine {
    inner: Arc<RwLock<ReconciliationEngine>>,
    changes: Arc<watch::Sender<u64>>,
}

impl SharedEngine {
    pub fn new() -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            inner: Arc::new(RwLock::new(ReconciliationEngine::new())),
            changes: Arc::new(changes),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, ReconciliationEngine> {
        self.inner.read()
    }

    /// Run a mutation and notify subscribers if the collection changed
    pub fn update<R>(&self, f: impl FnOnce(&mut ReconciliationEngine) -> R) -> R {
        let (result, before, after) = {
            let mut engine = self.inner.write();
            let before = engine.revision();
            let result = f(&mut engine);
            (result, before, engine.revision())
        };

        if after != before {
            self.changes.send_replace(after);
        }
        result
    }

    /// Watch the collection revision
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }
}

impl Default for SharedEngine {
    fn default() -> Self {
        Self::new()
    }
}
