//! Individual push connection
//!
//! The hub only ever enqueues pre-serialized frames; the socket writer for
//! the connection drains the queue on its own task.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, Notify};
use uuid::Uuid;

/// Unique identifier of one push connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle returned by [`BroadcastHub::register`](super::BroadcastHub::register)
pub type ConnectionHandle = Arc<Connection>;

/// A single registered push connection
pub struct Connection {
    id: ConnectionId,

    /// Outbound queue drained by the socket writer
    sender: mpsc::Sender<Arc<str>>,

    closed: AtomicBool,
    close_signal: Notify,

    created_at: Instant,
}

impl Connection {
    /// Create a new connection around an outbound queue
    pub fn new(sender: mpsc::Sender<Arc<str>>) -> Arc<Self> {
        Arc::new(Self {
            id: ConnectionId::generate(),
            sender,
            closed: AtomicBool::new(false),
            close_signal: Notify::new(),
            created_at: Instant::now(),
        })
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Enqueue a frame without waiting
    pub fn try_send(&self, frame: Arc<str>) -> Result<(), mpsc::error::TrySendError<Arc<str>>> {
        self.sender.try_send(frame)
    }

    /// Ask the socket owner to shut this connection down
    ///
    /// Idempotent; only the first call wakes the waiters.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.close_signal.notify_waiters();
        }
    }

    /// Whether `close` was called or the writer side is gone
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst) || self.sender.is_closed()
    }

    /// Resolves once `close` has been called
    pub async fn closed(&self) {
        loop {
            let notified = self.close_signal.notified();
            if self.closed.load(Ordering::SeqCst) {
                return;
            }
            notified.await;
        }
    }

    /// Get connection age
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("closed", &self.closed.load(Ordering::SeqCst))
            .field("created_at", &self.created_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_connection_creation() {
        let (tx, _rx) = mpsc::channel(4);
        let a = Connection::new(tx.clone());
        let b = Connection::new(tx);

        assert_ne!(a.id(), b.id());
        assert!(!a.is_closed());
    }

    #[tokio::test]
    async fn test_try_send_reaches_queue() {
        let (tx, mut rx) = mpsc::channel(1);
        let conn = Connection::new(tx);

        conn.try_send(Arc::from("one")).unwrap();
        assert!(matches!(
            conn.try_send(Arc::from("two")),
            Err(mpsc::error::TrySendError::Full(_))
        ));
        assert_eq!(rx.recv().await.as_deref(), Some("one"));
    }

    #[tokio::test]
    async fn test_close_wakes_waiter_once() {
        let (tx, _rx) = mpsc::channel(1);
        let conn = Connection::new(tx);

        let waiter = {
            let conn = Arc::clone(&conn);
            tokio::spawn(async move { conn.closed().await })
        };

        conn.close();
        conn.close();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter woke")
            .unwrap();
        assert!(conn.is_closed());

        // Already closed: resolves immediately
        conn.closed().await;
    }

    #[tokio::test]
    async fn test_dropped_receiver_reports_closed() {
        let (tx, rx) = mpsc::channel(1);
        let conn = Connection::new(tx);
        drop(rx);
        assert!(conn.is_closed());
    }
}
