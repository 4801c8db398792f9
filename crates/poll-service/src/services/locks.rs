//! Per-poll write serialization
//!
//! A mutation, the reload that follows it and the publish of the resulting
//! event run under one lock per poll, so the events for a single poll leave
//! in the order their writes were applied. Different polls never contend.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use poll_core::PollId;

/// Lazily created async mutex per poll id
#[derive(Default)]
pub struct PollLocks {
    locks: Mutex<HashMap<PollId, Arc<AsyncMutex<()>>>>,
}

impl PollLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive use of one poll
    pub async fn acquire(self: &Arc<Self>, poll_id: PollId) -> PollGuard {
        let lock = Arc::clone(self.locks.lock().entry(poll_id).or_default());
        let guard = lock.lock_owned().await;

        PollGuard {
            poll_id,
            guard: Some(guard),
            locks: Arc::clone(self),
        }
    }

    /// Number of polls with a held or awaited lock
    pub fn active(&self) -> usize {
        self.locks.lock().len()
    }
}

/// Held while one poll is being written and announced
///
/// The map entry is dropped with the last guard so idle polls cost nothing.
pub struct PollGuard {
    poll_id: PollId,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<PollLocks>,
}

impl Drop for PollGuard {
    fn drop(&mut self) {
        self.guard.take();

        let mut locks = self.locks.locks.lock();
        // Clones are only taken under the map lock, so a count of one means no waiter
        if locks
            .get(&self.poll_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.poll_id);
        }
    }
}
