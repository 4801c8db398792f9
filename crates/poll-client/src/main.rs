//! Terminal poll watcher
//!
//! Run with:
//! ```bash
//! POLL_API_URL=http://localhost:8000 cargo run -p poll-client --bin poll-watch
//! ```
//!
//! Logs the ordered poll view every time it changes.

use poll_client::{ClientConfig, PollFeed};
use poll_common::try_init_tracing;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid client configuration");
            std::process::exit(1);
        }
    };

    let feed = match PollFeed::connect(&config) {
        Ok(feed) => feed,
        Err(e) => {
            error!(error = %e, "Failed to start poll feed");
            std::process::exit(1);
        }
    };

    let mut changes = feed.changes();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                render(&feed);
            }
        }
    }

    feed.stop().await;
    info!("Poll watcher stopped");
}

fn render(feed: &PollFeed) {
    let status = feed.status();
    if status.is_stale {
        warn!(state = %status.state, "View may be out of date");
    }

    let view = feed.current_view();
    info!(polls = view.len(), "Poll view changed");
    for poll in &view {
        let results = poll
            .options
            .iter()
            .zip(poll.percentages())
            .map(|(option, pct)| format!("{} {}%", option.text, pct))
            .collect::<Vec<_>>()
            .join(", ");
        info!(
            poll_id = %poll.id,
            likes = poll.likes,
            votes = poll.total_votes(),
            "{}: {results}",
            poll.question
        );
    }
}
