//! WebSocket connection handlers.
//!
//! Each accepted socket gets a server-assigned `ConnectionId` and two tasks:
//! a reader forwarding text frames to the session coordinator, and a writer
//! draining the connection's outbound channel (and sending heartbeat pings).
//! When either task ends the connection is reported as disconnected; after a
//! client close or idle timeout the writer sends a close frame before exiting.

use std::{sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};

use crate::{
    config::HeartbeatConfig,
    domain::{ConnectionId, ConnectionIdFactory},
    ui::{session::SessionHandle, state::AppState},
};

/// How long the writer may take to deliver the close frame after the reader stopped
const CLOSE_GRACE_PERIOD: Duration = Duration::from_secs(5);

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let connection_id = ConnectionIdFactory::generate();
    tracing::debug!("Upgrading connection '{}'", connection_id);
    ws.on_upgrade(move |socket| handle_socket(socket, state, connection_id))
}

/// Spawns a task that pushes queued frames to the WebSocket.
///
/// Frames produced by the session coordinator arrive through `rx`. When a
/// ping interval is configured, a ping is sent every interval as well. A
/// close frame is sent when `rx` is closed.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
    ping_interval: Option<Duration>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = ping_interval.map(|period| {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        loop {
            let ping_due = async {
                match ticker.as_mut() {
                    Some(ticker) => {
                        ticker.tick().await;
                    }
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                msg = rx.recv() => {
                    // The coordinator drops the channel once the connection is cleaned up
                    let Some(msg) = msg else {
                        if let Err(e) = sender.send(Message::Close(None)).await {
                            tracing::debug!("Failed to send close frame: {}", e);
                        }
                        break;
                    };
                    if sender.send(Message::Text(msg.into())).await.is_err() {
                        break;
                    }
                }
                _ = ping_due => {
                    if sender.send(Message::Ping(Bytes::new())).await.is_err() {
                        break;
                    }
                }
            }
        }
    })
}

/// Spawns a task that forwards frames received from the client.
///
/// The task ends on close, on a transport error, or when nothing has been
/// received within `idle_timeout`.
fn receiver_loop(
    mut receiver: SplitStream<WebSocket>,
    session: SessionHandle,
    connection_id: ConnectionId,
    idle_timeout: Option<Duration>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let next = match idle_timeout {
                Some(limit) => match tokio::time::timeout(limit, receiver.next()).await {
                    Ok(next) => next,
                    Err(_) => {
                        tracing::info!(
                            "Connection '{}' was idle for {:?}, closing",
                            connection_id,
                            limit
                        );
                        break;
                    }
                },
                None => receiver.next().await,
            };

            let msg = match next {
                Some(Ok(msg)) => msg,
                Some(Err(e)) => {
                    tracing::warn!("WebSocket error on '{}': {}", connection_id, e);
                    break;
                }
                None => break,
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("Received from '{}': {}", connection_id, text.as_str());
                    session.frame(connection_id.clone(), text.as_str().to_owned());
                }
                Message::Binary(_) => {
                    tracing::debug!("Ignoring binary frame from '{}'", connection_id);
                }
                Message::Ping(_) | Message::Pong(_) => {
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id);
                    break;
                }
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, connection_id: ConnectionId) {
    let (sender, receiver) = socket.split();
    let HeartbeatConfig {
        ping_interval,
        idle_timeout,
    } = state.heartbeat;

    // Register the outbound channel before any frame of this connection is forwarded
    let (tx, rx) = mpsc::unbounded_channel();
    state.session.connected(connection_id.clone(), tx);

    let mut send_task = pusher_loop(rx, sender, ping_interval);
    let mut recv_task = receiver_loop(
        receiver,
        state.session.clone(),
        connection_id.clone(),
        idle_timeout,
    );

    tokio::select! {
        _ = &mut recv_task => {
            // Let the writer flush queued frames and the close frame
            state.session.disconnected(connection_id);
            if tokio::time::timeout(CLOSE_GRACE_PERIOD, &mut send_task)
                .await
                .is_err()
            {
                send_task.abort();
            }
        }
        _ = &mut send_task => {
            recv_task.abort();
            state.session.disconnected(connection_id);
        }
    };
}
