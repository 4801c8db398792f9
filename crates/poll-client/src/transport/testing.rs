//! Scripted transport doubles for supervisor and feed tests

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use poll_core::Poll;
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::{Connector, SnapshotSource, Transport};
use crate::error::TransportError;

type Frame = Result<String, TransportError>;

/// Frames pushed into one scripted connection; dropping it closes the
/// connection from the "server" side
pub(crate) type FrameSender = mpsc::UnboundedSender<Frame>;

enum Script {
    Accept(mpsc::UnboundedReceiver<Frame>),
    Refuse(TransportError),
}

/// Connector that plays back a queue of scripted outcomes
///
/// Once the script runs out, `connect` waits forever.
#[derive(Default)]
pub(crate) struct ScriptedConnector {
    script: Mutex<VecDeque<Script>>,
    attempts: Mutex<Vec<Instant>>,
    closed: Arc<AtomicUsize>,
}

impl ScriptedConnector {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a successful handshake
    pub(crate) fn accept(&self) -> FrameSender {
        let (tx, rx) = mpsc::unbounded_channel();
        self.script.lock().push_back(Script::Accept(rx));
        tx
    }

    /// Queue a failed handshake
    pub(crate) fn refuse(&self) {
        self.script
            .lock()
            .push_back(Script::Refuse(TransportError::Connect("refused".to_string())));
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts.lock().len()
    }

    pub(crate) fn attempt_times(&self) -> Vec<Instant> {
        self.attempts.lock().clone()
    }

    /// Connections closed by the client side
    pub(crate) fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self) -> Result<Box<dyn Transport>, TransportError> {
        self.attempts.lock().push(Instant::now());
        let next = self.script.lock().pop_front();
        match next {
            Some(Script::Accept(frames)) => Ok(Box::new(ScriptedTransport {
                frames,
                closed: Arc::clone(&self.closed),
            })),
            Some(Script::Refuse(e)) => Err(e),
            None => std::future::pending().await,
        }
    }
}

struct ScriptedTransport {
    frames: mpsc::UnboundedReceiver<Frame>,
    closed: Arc<AtomicUsize>,
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn next_message(&mut self) -> Option<Frame> {
        self.frames.recv().await
    }

    async fn close(&mut self) {
        self.frames.close();
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Snapshot source backed by an in-memory "server" collection
#[derive(Default)]
pub(crate) struct FakeSnapshots {
    polls: Mutex<Vec<Poll>>,
    failures: AtomicUsize,
    fetches: AtomicUsize,
}

impl FakeSnapshots {
    pub(crate) fn new(polls: Vec<Poll>) -> Arc<Self> {
        Arc::new(Self {
            polls: Mutex::new(polls),
            ..Self::default()
        })
    }

    pub(crate) fn set(&self, polls: Vec<Poll>) {
        *self.polls.lock() = polls;
    }

    /// Fail the next `count` fetches
    pub(crate) fn fail_next(&self, count: usize) {
        self.failures.store(count, Ordering::SeqCst);
    }

    pub(crate) fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotSource for FakeSnapshots {
    async fn fetch_snapshot(&self) -> Result<Vec<Poll>, TransportError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(TransportError::Http("503 Service Unavailable".to_string()));
        }
        Ok(self.polls.lock().clone())
    }
}

pub(crate) mod fixtures {
    use chrono::{TimeZone, Utc};
    use poll_core::{OptionId, Poll, PollEvent, PollId, PollOption};

    pub(crate) fn poll(id: i64, created_secs: i64, votes: [u64; 2]) -> Poll {
        Poll {
            id: PollId::new(id),
            question: format!("Question {id}?"),
            description: None,
            likes: 0,
            created_at: Utc
                .timestamp_opt(1_700_000_000 + created_secs, 0)
                .single()
                .unwrap(),
            options: vec![
                PollOption {
                    id: OptionId::new(id * 10 + 1),
                    text: "Yes".to_string(),
                    votes: votes[0],
                },
                PollOption {
                    id: OptionId::new(id * 10 + 2),
                    text: "No".to_string(),
                    votes: votes[1],
                },
            ],
        }
    }

    pub(crate) fn created(poll: Poll) -> String {
        PollEvent::Created { poll }.encode().unwrap()
    }

    pub(crate) fn updated(poll: Poll) -> String {
        PollEvent::Updated { poll }.encode().unwrap()
    }
}
