//! WebSocket stream of notifications.
//!
//! Clients connecting to `/ws` receive a `connected` event, then every
//! [`Notification`] broadcast by the session server while they stay
//! connected. Missed notifications are never replayed.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::api::AppState;
use crate::notify::Notification;

/// Interval between heartbeat pings.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Maximum number of missed pong responses before disconnecting.
const MAX_MISSED_PONGS: u8 = 3;

/// WebSocket upgrade handler for `/ws`.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    info!("New WebSocket connection request");
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

fn encode(notification: &Notification) -> Option<Message> {
    match serde_json::to_string(notification) {
        Ok(json) => Some(Message::Text(json)),
        Err(e) => {
            warn!(error = %e, "Failed to serialize notification");
            None
        }
    }
}

/// Handles a single WebSocket connection.
///
/// Subscribes before sending `connected`, so anything broadcast after the
/// client sees `connected` is delivered.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut notifications = state.notifications.subscribe();

    let Some(connected) = encode(&Notification::connected()) else {
        return;
    };
    if sender.send(connected).await.is_err() {
        debug!("Client disconnected before receiving connected event");
        return;
    }

    info!(
        subscribers = state.notifications.receiver_count(),
        "WebSocket client connected"
    );

    let mut heartbeat = interval(HEARTBEAT_INTERVAL);
    // First tick completes immediately
    heartbeat.tick().await;
    let mut missed_pongs = 0u8;

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Pong(_))) => {
                        missed_pongs = 0;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("Client requested close");
                        break;
                    }
                    Some(Ok(Message::Text(_) | Message::Binary(_))) => {
                        debug!("Ignoring message from client");
                    }
                    Some(Err(e)) => {
                        debug!(error = %e, "WebSocket error");
                        break;
                    }
                    None => break,
                }
            }

            event = notifications.recv() => {
                match event {
                    Ok(notification) => {
                        let Some(message) = encode(&notification) else {
                            continue;
                        };
                        if sender.send(message).await.is_err() {
                            debug!("Failed to send notification, client disconnected");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(missed = n, "Client lagged behind notifications");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("Notification channel closed");
                        break;
                    }
                }
            }

            _ = heartbeat.tick() => {
                if sender.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
                missed_pongs += 1;
                if missed_pongs >= MAX_MISSED_PONGS {
                    info!(missed_pongs, "Client stopped answering pings, closing connection");
                    break;
                }
            }
        }
    }

    info!("WebSocket client disconnected");
}
