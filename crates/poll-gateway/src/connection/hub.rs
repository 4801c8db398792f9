//! Broadcast hub
//!
//! Owns the registry of live push connections. The registry mutex is only
//! held to insert, remove or snapshot entries. A separate fan-out mutex is
//! held for the whole of one broadcast, so two broadcasts never interleave
//! and every connection sees events in the same order.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc::error::TrySendError;

use poll_common::HubConfig;
use poll_core::{EventPublisher, PollEvent, PollRepository, PublishError, RepoResult};

use super::{Connection, ConnectionHandle, ConnectionId};

/// Point-in-time hub counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HubStats {
    pub connections: usize,
    pub broadcasts: u64,
    pub deliveries: u64,
    pub evictions: u64,
}

#[derive(Default)]
struct Counters {
    broadcasts: AtomicU64,
    deliveries: AtomicU64,
    evictions: AtomicU64,
}

/// Fans poll events out to every registered connection
pub struct BroadcastHub {
    connections: Mutex<HashMap<ConnectionId, Arc<Connection>>>,
    /// Held across one whole fan-out loop
    fanout: Mutex<()>,
    polls: Arc<dyn PollRepository>,
    config: HubConfig,
    counters: Counters,
}

impl BroadcastHub {
    /// Create a hub that reads snapshots from `polls`
    pub fn new(polls: Arc<dyn PollRepository>, config: HubConfig) -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
            fanout: Mutex::new(()),
            polls,
            config,
            counters: Counters::default(),
        }
    }

    /// Create a new hub wrapped in Arc
    pub fn new_shared(polls: Arc<dyn PollRepository>, config: HubConfig) -> Arc<Self> {
        Arc::new(Self::new(polls, config))
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Admit a connection; it receives every broadcast issued after this returns
    pub fn register(&self, sender: tokio::sync::mpsc::Sender<Arc<str>>) -> ConnectionHandle {
        let connection = Connection::new(sender);
        self.connections
            .lock()
            .insert(connection.id(), Arc::clone(&connection));

        tracing::debug!(connection_id = %connection.id(), "Connection registered");

        connection
    }

    /// Remove a connection
    ///
    /// Returns whether it was registered. Unknown or already removed ids are a no-op.
    pub fn unregister(&self, id: ConnectionId) -> bool {
        let removed = self.connections.lock().remove(&id).is_some();
        if removed {
            tracing::debug!(connection_id = %id, "Connection unregistered");
        }
        removed
    }

    /// Deliver an event to every registered connection
    ///
    /// The event is serialized once. A connection whose queue is closed or
    /// full is evicted and told to close; the rest are unaffected. Returns
    /// the number of connections the frame was queued for.
    ///
    /// Concurrent callers are serialized: each frame is queued on every
    /// target before the next broadcast starts.
    pub fn broadcast(&self, event: &PollEvent) -> Result<usize, PublishError> {
        let frame: Arc<str> = event
            .encode()
            .map_err(|e| PublishError::Serialization(e.to_string()))?
            .into();

        // Lock order: fanout, then registry (inside unregister). Never the reverse.
        let _fanout = self.fanout.lock();
        let targets: Vec<Arc<Connection>> = self.connections.lock().values().cloned().collect();

        let mut sent = 0;
        for connection in targets {
            match connection.try_send(Arc::clone(&frame)) {
                Ok(()) => sent += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(
                        connection_id = %connection.id(),
                        "Outbound queue full, evicting slow connection"
                    );
                    self.evict(&connection);
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(
                        connection_id = %connection.id(),
                        "Outbound queue closed, evicting connection"
                    );
                    self.evict(&connection);
                }
            }
        }

        self.counters.broadcasts.fetch_add(1, Ordering::Relaxed);
        self.counters
            .deliveries
            .fetch_add(sent as u64, Ordering::Relaxed);

        tracing::debug!(kind = event.kind(), sent = sent, "Event broadcast to all connections");

        Ok(sent)
    }

    /// Full current collection, sent to a connection right after it registers
    pub async fn snapshot_for_new_connection(&self) -> RepoResult<PollEvent> {
        let polls = self.polls.list().await?;
        Ok(PollEvent::Snapshot { polls })
    }

    /// Close and forget every connection
    pub fn shutdown(&self) -> usize {
        let drained: Vec<Arc<Connection>> =
            self.connections.lock().drain().map(|(_, c)| c).collect();
        for connection in &drained {
            connection.close();
        }

        tracing::info!(count = drained.len(), "Broadcast hub shut down");

        drained.len()
    }

    /// Get the total number of registered connections
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Check if a connection is registered
    pub fn is_registered(&self, id: ConnectionId) -> bool {
        self.connections.lock().contains_key(&id)
    }

    pub fn stats(&self) -> HubStats {
        HubStats {
            connections: self.connection_count(),
            broadcasts: self.counters.broadcasts.load(Ordering::Relaxed),
            deliveries: self.counters.deliveries.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
        }
    }

    fn evict(&self, connection: &Connection) {
        if self.unregister(connection.id()) {
            self.counters.evictions.fetch_add(1, Ordering::Relaxed);
        }
        connection.close();
    }
}

#[async_trait]
impl EventPublisher for BroadcastHub {
    async fn publish(&self, event: PollEvent) -> Result<usize, PublishError> {
        self.broadcast(&event)
    }
}

impl std::fmt::Debug for BroadcastHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastHub")
            .field("connections", &self.connection_count())
            .field("config", &self.config)
            .finish()
    }
}
