//! Test helpers for integration tests
//!
//! Provides an in-process server bound to an ephemeral port, HTTP request
//! helpers and a raw push channel client.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::StreamExt;
use poll_api::{create_app_state, serve};
use poll_common::AppConfig;
use poll_core::PollEvent;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// Raw push channel connection
pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long to wait for a pushed event
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Start a new test server
    pub async fn start() -> Result<Self> {
        Self::start_with_config(AppConfig::local(0)).await
    }

    /// Start a test server with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let state = create_app_state(config).await?;
        let (shutdown, signal) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let shutdown = async {
                let _ = signal.await;
            };
            if let Err(e) = serve(listener, state, shutdown).await {
                eprintln!("Test server failed: {e}");
            }
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            shutdown: Some(shutdown),
            handle: Some(handle),
        })
    }

    /// Get base URL for the REST API
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get URL of the push channel
    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Make a POST request with JSON body
    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.post(&url).json(body).send().await?)
    }

    /// Make a POST request without a body
    pub async fn post_empty(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.post(&url).send().await?)
    }

    /// Open a raw push channel connection
    pub async fn connect_ws(&self) -> Result<WsStream> {
        let (stream, _) = connect_async(self.ws_url()).await?;
        Ok(stream)
    }

    /// Trigger graceful shutdown and wait for the server to finish
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            tokio::time::timeout(Duration::from_secs(5), handle)
                .await
                .context("server did not shut down")??;
        }
        Ok(())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Wait for the next envelope, skipping control frames
pub async fn next_event(ws: &mut WsStream) -> Result<PollEvent> {
    tokio::time::timeout(EVENT_TIMEOUT, read_event(ws))
        .await
        .context("timed out waiting for event")?
}

async fn read_event(ws: &mut WsStream) -> Result<PollEvent> {
    loop {
        let frame = ws.next().await.context("push channel closed")??;
        match frame {
            Message::Text(text) => return Ok(PollEvent::decode(&text)?),
            Message::Close(frame) => anyhow::bail!("push channel closed: {frame:?}"),
            _ => {}
        }
    }
}

/// Assert that no envelope arrives within `wait`
pub async fn assert_no_event(ws: &mut WsStream, wait: Duration) -> Result<()> {
    match tokio::time::timeout(wait, next_event(ws)).await {
        Err(_) => Ok(()),
        Ok(Ok(event)) => anyhow::bail!("unexpected event {event}"),
        Ok(Err(e)) => Err(e),
    }
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}
