//! # poll-client
//!
//! Keeps a local, ordered view of the poll collection in sync with the
//! server.
//!
//! - [`ReconciliationEngine`] folds snapshots and incremental events into
//!   one deterministic ordered view.
//! - [`Supervisor`] owns the push channel lifecycle: connect, prime from a
//!   bulk snapshot, stream events, reconnect with backoff.
//! - [`PollFeed`] is the consumer-facing facade tying both together.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use poll_client::{ClientConfig, PollFeed};
//!
//! async fn example() -> Result<(), poll_client::ClientError> {
//!     let feed = PollFeed::connect(&ClientConfig::from_env()?)?;
//!     let mut changes = feed.changes();
//!     while changes.changed().await.is_ok() {
//!         println!("{} polls", feed.current_view().len());
//!     }
//!     feed.stop().await;
//!     Ok(())
//! }
//! ```

pub mod backoff;
pub mod config;
pub mod engine;
pub mod error;
pub mod feed;
pub mod supervisor;
pub mod transport;

pub use backoff::BackoffConfig;
pub use config::ClientConfig;
pub use engine::{ApplyOutcome, ReconciliationEngine, SharedEngine};
pub use error::{ClientError, TransportError};
pub use feed::{FeedStatus, PollFeed};
pub use supervisor::{
    InvalidTransition, Supervisor, SupervisorEvent, SupervisorState, SupervisorStatus,
};
pub use transport::{Connector, HttpSnapshotSource, SnapshotSource, Transport, WsConnector};
