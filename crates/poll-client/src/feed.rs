//! Consumer-facing poll feed

use std::sync::Arc;

use poll_core::Poll;
use tokio::sync::watch;
use tracing::info;

use crate::backoff::BackoffConfig;
use crate::config::ClientConfig;
use crate::engine::SharedEngine;
use crate::error::ClientError;
use crate::supervisor::{Supervisor, SupervisorState};
use crate::transport::{Connector, HttpSnapshotSource, SnapshotSource, WsConnector};

/// Readiness indicator for the rendering layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedStatus {
    pub state: SupervisorState,
    /// The view may lag behind the server
    pub is_stale: bool,
    pub attempts: u32,
    pub anomalies: u64,
    pub last_error: Option<String>,
}

/// Live, ordered view of all polls
///
/// During an outage the last known view stays available and
/// [`FeedStatus::is_stale`] reports that it may be out of date.
pub struct PollFeed {
    engine: SharedEngine,
    snapshots: Arc<dyn SnapshotSource>,
    supervisor: Supervisor,
}

impl PollFeed {
    /// Build a feed for the configured server and start it
    pub fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        let connector = Arc::new(WsConnector::new(config.ws_url.clone()));
        let snapshots = Arc::new(HttpSnapshotSource::new(config.polls_url()?));
        info!(api = %config.api_url, ws = %config.ws_url, "Starting poll feed");

        let feed = Self::new(connector, snapshots, config.backoff.clone());
        feed.start()?;
        Ok(feed)
    }

    /// Build a feed over arbitrary transports without starting it
    pub fn new(
        connector: Arc<dyn Connector>,
        snapshots: Arc<dyn SnapshotSource>,
        backoff: BackoffConfig,
    ) -> Self {
        let engine = SharedEngine::new();
        let supervisor = Supervisor::new(
            connector,
            Arc::clone(&snapshots),
            engine.clone(),
            backoff,
        );
        Self {
            engine,
            snapshots,
            supervisor,
        }
    }

    pub fn start(&self) -> Result<(), ClientError> {
        self.supervisor.start()
    }

    pub fn current_view(&self) -> Vec<Poll> {
        self.engine.read().current_view()
    }

    /// Re-pull the full collection and make it the new baseline
    pub async fn refresh(&self) -> Result<(), ClientError> {
        let polls = self.snapshots.fetch_snapshot().await?;
        self.engine.update(|engine| engine.replace_with_snapshot(polls));
        Ok(())
    }

    pub fn status(&self) -> FeedStatus {
        let supervisor = self.supervisor.status();
        let engine = self.engine.read();
        FeedStatus {
            state: supervisor.state,
            is_stale: !supervisor.state.is_connected() || !engine.is_last_known_good(),
            attempts: supervisor.attempts,
            anomalies: engine.anomalies(),
            last_error: supervisor.last_error,
        }
    }

    /// Revision counter bumped after every change to the view
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.engine.subscribe()
    }

    pub async fn stop(&self) {
        self.supervisor.stop().await;
    }
}
