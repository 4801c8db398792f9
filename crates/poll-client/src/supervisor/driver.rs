//! Supervisor task
//!
//! One spawned task per supervisor drives the state machine. At most one
//! transport and one backoff timer exist at a time because both live on
//! that task's stack, and every await point races the shutdown signal.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::state::{SupervisorEvent, SupervisorState};
use crate::backoff::BackoffConfig;
use crate::engine::{ReconciliationEngine, SharedEngine};
use crate::error::{ClientError, TransportError};
use crate::transport::{Connector, SnapshotSource, Transport};

/// Observable supervisor state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupervisorStatus {
    pub state: SupervisorState,
    /// Consecutive failed attempts since the last successful connection
    pub attempts: u32,
    /// Most recent transport failure, cleared once connected
    pub last_error: Option<String>,
}

enum Lifecycle {
    Idle,
    Running {
        shutdown: watch::Sender<bool>,
        task: JoinHandle<()>,
    },
    Stopped,
}

enum Pump {
    Stopped,
    Lost(TransportError),
}

/// Keeps the push channel connected and the engine primed
pub struct Supervisor {
    driver: Arc<Driver>,
    status: watch::Receiver<SupervisorStatus>,
    lifecycle: Mutex<Lifecycle>,
}

impl Supervisor {
    pub fn new(
        connector: Arc<dyn Connector>,
        snapshots: Arc<dyn SnapshotSource>,
        engine: SharedEngine,
        backoff: BackoffConfig,
    ) -> Self {
        let (status_tx, status) = watch::channel(SupervisorStatus::default());
        Self {
            driver: Arc::new(Driver {
                connector,
                snapshots,
                engine,
                backoff,
                status: status_tx,
            }),
            status,
            lifecycle: Mutex::new(Lifecycle::Idle),
        }
    }

    /// Spawn the supervisor task
    ///
    /// A supervisor runs at most once: starting it again fails with
    /// [`ClientError::AlreadyStarted`], or [`ClientError::Stopped`] after
    /// [`Supervisor::stop`].
    pub fn start(&self) -> Result<(), ClientError> {
        let mut lifecycle = self.lifecycle.lock();
        match *lifecycle {
            Lifecycle::Idle => {}
            Lifecycle::Running { .. } => return Err(ClientError::AlreadyStarted),
            Lifecycle::Stopped => return Err(ClientError::Stopped),
        }

        let (shutdown, shutdown_rx) = watch::channel(false);
        let driver = Arc::clone(&self.driver);
        let task = tokio::spawn(driver.run(shutdown_rx));

        *lifecycle = Lifecycle::Running { shutdown, task };
        Ok(())
    }

    /// Stop the supervisor and wait for its task to finish
    ///
    /// Cancels a pending connection attempt or backoff timer and closes the
    /// live transport. No engine update happens after this returns.
    pub async fn stop(&self) {
        let previous = std::mem::replace(&mut *self.lifecycle.lock(), Lifecycle::Stopped);

        if let Lifecycle::Running { shutdown, task } = previous {
            let _ = shutdown.send(true);
            if let Err(e) = task.await {
                error!(error = %e, "Supervisor task failed");
            }
        }
    }

    pub fn status(&self) -> SupervisorStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SupervisorStatus> {
        self.status.clone()
    }

    pub fn engine(&self) -> &SharedEngine {
        &self.driver.engine
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        if let Lifecycle::Running { task, .. } = &*self.lifecycle.get_mut() {
            task.abort();
        }
    }
}

struct Driver {
    connector: Arc<dyn Connector>,
    snapshots: Arc<dyn SnapshotSource>,
    engine: SharedEngine,
    backoff: BackoffConfig,
    status: watch::Sender<SupervisorStatus>,
}

impl Driver {
    async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut state = SupervisorState::Disconnected;
        let mut attempts: u32 = 0;

        self.transition(&mut state, SupervisorEvent::Start, attempts, None);

        loop {
            let handshake = tokio::select! {
                biased;
                () = stopped(&mut shutdown) => break,
                result = self.handshake() => result,
            };

            let failure = match handshake {
                Ok(transport) => {
                    attempts = 0;
                    self.transition(&mut state, SupervisorEvent::HandshakeSucceeded, attempts, None);

                    match self.pump(transport, &mut shutdown).await {
                        Pump::Stopped => break,
                        Pump::Lost(e) => {
                            warn!(error = %e, "Connection lost");
                            (SupervisorEvent::TransportClosed, e)
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, attempt = attempts + 1, "Connection attempt failed");
                    (SupervisorEvent::HandshakeFailed, e)
                }
            };

            attempts = attempts.saturating_add(1);
            let (event, e) = failure;
            self.transition(&mut state, event, attempts, Some(e.to_string()));

            let delay = self.backoff.delay_for_attempt(attempts);
            info!(
                attempt = attempts,
                delay_ms = delay.as_millis() as u64,
                "Reconnecting after backoff"
            );

            tokio::select! {
                biased;
                () = stopped(&mut shutdown) => break,
                () = tokio::time::sleep(delay) => {}
            }

            self.transition(&mut state, SupervisorEvent::BackoffElapsed, attempts, None);
        }

        self.transition(&mut state, SupervisorEvent::Stop, attempts, None);
    }

    /// Connect, then prime the engine before any frame is read
    async fn handshake(&self) -> Result<Box<dyn Transport>, TransportError> {
        let mut transport = self.connector.connect().await?;
        self.engine.update(ReconciliationEngine::begin_session);

        match self.snapshots.fetch_snapshot().await {
            Ok(polls) => {
                self.engine.update(|engine| engine.replace_with_snapshot(polls));
                Ok(transport)
            }
            Err(e) => {
                transport.close().await;
                Err(e)
            }
        }
    }

    /// Apply frames in arrival order until the transport goes away
    async fn pump(
        &self,
        mut transport: Box<dyn Transport>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Pump {
        loop {
            let next = tokio::select! {
                biased;
                () = stopped(shutdown) => None,
                frame = transport.next_message() => Some(frame),
            };

            let Some(frame) = next else {
                transport.close().await;
                return Pump::Stopped;
            };

            match frame {
                Some(Ok(text)) => {
                    // Malformed frames are counted and logged by the engine
                    let _ = self.engine.update(|engine| engine.apply_message(&text));
                }
                Some(Err(e)) => {
                    transport.close().await;
                    return Pump::Lost(e);
                }
                None => return Pump::Lost(TransportError::Closed),
            }
        }
    }

    fn transition(
        &self,
        state: &mut SupervisorState,
        event: SupervisorEvent,
        attempts: u32,
        error: Option<String>,
    ) {
        let next = match state.on(event) {
            Ok(next) => next,
            Err(e) => {
                warn!(error = %e, "Ignoring supervisor event");
                return;
            }
        };

        if next.is_connected() || next == SupervisorState::Disconnected {
            info!(from = %state, to = %next, "Supervisor state changed");
        } else {
            debug!(from = %state, to = %next, "Supervisor state changed");
        }
        *state = next;

        self.status.send_modify(|status| {
            status.state = next;
            status.attempts = attempts;
            if next.is_connected() {
                status.last_error = None;
            } else if let Some(error) = error {
                status.last_error = Some(error);
            }
        });
    }
}

/// Resolves once stop is requested or the supervisor handle is gone
async fn stopped(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}
