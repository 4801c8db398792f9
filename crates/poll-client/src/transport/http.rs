//! Bulk snapshot over the REST endpoint

use async_trait::async_trait;
use poll_core::Poll;
use reqwest::{Client, Url};
use tracing::debug;

use super::SnapshotSource;
use crate::error::TransportError;

/// `GET {api}/polls`
#[derive(Debug, Clone)]
pub struct HttpSnapshotSource {
    client: Client,
    url: Url,
}

impl HttpSnapshotSource {
    pub fn new(url: Url) -> Self {
        Self::with_client(Client::new(), url)
    }

    pub fn with_client(client: Client, url: Url) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl SnapshotSource for HttpSnapshotSource {
    async fn fetch_snapshot(&self) -> Result<Vec<Poll>, TransportError> {
        let polls: Vec<Poll> = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| TransportError::Http(e.to_string()))?
            .json()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        for poll in &polls {
            poll.check_well_formed()
                .map_err(|reason| TransportError::Http(format!("poll {}: {reason}", poll.id)))?;
        }

        debug!(polls = polls.len(), url = %self.url, "Fetched snapshot");
        Ok(polls)
    }
}
