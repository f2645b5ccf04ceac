//! WebSocket handler for client connections.

use axum::{
    body::Bytes,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};
use std::time::Duration;
use tokio::sync::mpsc;

use roomcast_protocol::ServerEvent;

use super::dispatch;
use crate::api::AppState;

/// Size of the per-connection send buffer.
const CONNECTION_BUFFER_SIZE: usize = 64;

/// Ping interval for keepalive.
const PING_INTERVAL_SECS: u64 = 30;

/// WebSocket upgrade handler.
///
/// GET /ws
pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

/// Handle one WebSocket connection.
///
/// The write task owns the socket sink and drains the connection
/// channel; `connect` registers the same channel as the session's
/// transport, so replies and broadcasts share one ordered path to the
/// client.
async fn handle_connection(socket: WebSocket, state: AppState) {
    let (mut sink, mut stream) = socket.split();
    let (conn_tx, mut conn_rx) = mpsc::channel::<ServerEvent>(CONNECTION_BUFFER_SIZE);

    let send_task = tokio::spawn(async move {
        let mut ping_interval = tokio::time::interval(Duration::from_secs(PING_INTERVAL_SECS));
        // The first tick completes immediately; skip it.
        ping_interval.tick().await;

        loop {
            tokio::select! {
                event = conn_rx.recv() => {
                    let Some(event) = event else { break };
                    let json = match serde_json::to_string(&event) {
                        Ok(json) => json,
                        Err(e) => {
                            warn!("failed to serialize outbound frame: {}", e);
                            continue;
                        }
                    };
                    if sink.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                _ = ping_interval.tick() => {
                    if sink.send(Message::Ping(Bytes::new())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    while let Some(msg_result) = stream.next().await {
        match msg_result {
            Ok(Message::Text(text)) => {
                dispatch::dispatch_frame(&state, &conn_tx, text.as_str()).await;
            }
            Ok(Message::Binary(_)) => {
                debug!("binary frame ignored");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                info!("client closed connection");
                break;
            }
            Err(e) => {
                warn!("websocket error: {}", e);
                break;
            }
        }
    }

    // A transport close tears down only the transport. The session and
    // its room memberships survive so the identity can reconnect;
    // explicit teardown goes through ChatHub::remove_session.
    send_task.abort();
    debug!("connection closed");
}
