//! WebSocket handler
//!
//! Each socket is registered with the hub before its snapshot is read, so
//! no event published in between is lost. Events that raced the snapshot
//! may be seen twice, which is harmless because every event carries the
//! complete poll.
//!
//! Every socket write is bounded by the hub's write timeout; a peer that
//! stops reading loses its connection instead of pinning the writer task.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{Sink, SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{interval, timeout, Interval, MissedTickBehavior};

use crate::connection::Connection;
use crate::server::GatewayState;

/// WebSocket push channel handler
pub async fn ws_handler(
    State(state): State<GatewayState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(state, socket))
}

/// Handle an upgraded WebSocket connection
async fn handle_socket(state: GatewayState, socket: WebSocket) {
    let (tx, rx) = mpsc::channel::<Arc<str>>(state.config().connection_buffer);
    let connection = state.hub().register(tx);
    let connection_id = connection.id();

    tracing::info!(connection_id = %connection_id, "WebSocket connection established");

    let write_timeout = state.config().write_timeout();
    let (mut ws_sink, mut ws_stream) = socket.split();

    // The snapshot goes straight to the socket, ahead of anything queued
    let snapshot = match state.hub().snapshot_for_new_connection().await {
        Ok(event) => event.encode(),
        Err(e) => {
            tracing::warn!(connection_id = %connection_id, error = %e, "Failed to load snapshot");
            state.hub().unregister(connection_id);
            let _ = timeout(write_timeout, ws_sink.close()).await;
            return;
        }
    };
    let sent = match snapshot {
        Ok(frame) => match send_within(&mut ws_sink, Message::Text(frame), write_timeout).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(connection_id = %connection_id, error = %e, "Failed to send snapshot");
                false
            }
        },
        Err(e) => {
            tracing::warn!(connection_id = %connection_id, error = %e, "Failed to encode snapshot");
            false
        }
    };
    if !sent {
        state.hub().unregister(connection_id);
        return;
    }

    let ping_interval = state.config().ping_interval();
    let mut send_task = tokio::spawn(write_loop(
        Arc::clone(&connection),
        ws_sink,
        rx,
        ping_interval,
        write_timeout,
    ));

    // Inbound traffic carries no commands; it is read only to notice closure
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_stream.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    tracing::info!(connection_id = %connection_id, "Client closed connection");
                    break;
                }
                Ok(Message::Text(_) | Message::Binary(_)) => {
                    tracing::trace!(connection_id = %connection_id, "Ignoring inbound frame");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(connection_id = %connection_id, error = %e, "WebSocket error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => {
            tracing::debug!(connection_id = %connection_id, "Send task ended");
            recv_task.abort();
        }
        _ = &mut recv_task => {
            tracing::debug!(connection_id = %connection_id, "Receive task ended");
            send_task.abort();
        }
    }

    state.hub().unregister(connection_id);
    tracing::info!(
        connection_id = %connection_id,
        age_ms = connection.age().as_millis(),
        "WebSocket connection closed"
    );
}

/// Drain the outbound queue into the socket, pinging while idle
async fn write_loop<S>(
    connection: Arc<Connection>,
    mut ws_sink: S,
    mut rx: mpsc::Receiver<Arc<str>>,
    ping_interval: Option<Duration>,
    write_timeout: Duration,
) where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let connection_id = connection.id();
    let mut ticker = ping_interval.map(|period| {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.reset();
        ticker
    });

    loop {
        tokio::select! {
            frame = rx.recv() => {
                let Some(frame) = frame else { break };
                let message = Message::Text(frame.to_string());
                if let Err(e) = send_within(&mut ws_sink, message, write_timeout).await {
                    tracing::warn!(connection_id = %connection_id, error = %e, "Failed to send frame to WebSocket");
                    break;
                }
            }
            () = next_tick(&mut ticker) => {
                if let Err(e) = send_within(&mut ws_sink, Message::Ping(Vec::new()), write_timeout).await {
                    tracing::warn!(connection_id = %connection_id, error = %e, "Keep-alive ping failed");
                    break;
                }
            }
            () = connection.closed() => {
                tracing::debug!(connection_id = %connection_id, "Connection closed by hub");
                let close = Message::Close(Some(CloseFrame {
                    code: close_code::AWAY,
                    reason: Cow::from("server closed connection"),
                }));
                let _ = send_within(&mut ws_sink, close, write_timeout).await;
                break;
            }
        }
    }

    // Stop the hub from queueing for a writer that is gone
    connection.close();
    if timeout(write_timeout, ws_sink.close()).await.is_err() {
        tracing::debug!(connection_id = %connection_id, "Timed out closing WebSocket");
    }
}

/// Send one message, giving up once `limit` has elapsed
async fn send_within<S>(sink: &mut S, message: Message, limit: Duration) -> Result<(), String>
where
    S: Sink<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    match timeout(limit, sink.send(message)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!("write timed out after {}s", limit.as_secs())),
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
