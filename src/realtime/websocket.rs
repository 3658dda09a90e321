// WebSocket endpoint for the real-time layer
// One writer task drains the connection's queue, one reader task decodes client events

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};

use super::protocol::{ClientEvent, ConnectionId};
use super::server::AppState;
use super::RealtimeState;

/// Handle socket upgrade requests on `/ws`
pub async fn handle_websocket(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.realtime))
}

async fn handle_socket(socket: WebSocket, state: RealtimeState) {
    let connection = ConnectionId::generate();
    let (mut sender, mut receiver) = socket.split();
    let mut rx = state.connections.open(connection.clone()).await;

    tracing::info!("User connected: {}", connection);

    // Forward queued events to the socket, pinging on every heartbeat tick
    let heartbeat_interval = state.heartbeat_interval;
    let send_connection = connection.clone();
    let mut send_task = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(heartbeat_interval);
        // First tick completes immediately
        heartbeat.tick().await;

        loop {
            let msg = tokio::select! {
                event = rx.recv() => {
                    let Some(event) = event else { break };
                    match event.to_text() {
                        Ok(text) => Message::Text(text),
                        Err(e) => {
                            tracing::warn!(connection = %send_connection, "Failed to encode event: {}", e);
                            continue;
                        },
                    }
                },
                _ = heartbeat.tick() => {
                    tracing::trace!(connection = %send_connection, "Sent heartbeat ping");
                    Message::Ping(Vec::new())
                },
            };

            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let recv_state = state.clone();
    let recv_connection = connection.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match ClientEvent::from_text(&text) {
                    Ok(event) => {
                        recv_state.handle_event(&recv_connection, event).await;
                    },
                    Err(e) => {
                        tracing::warn!(
                            connection = %recv_connection,
                            "Failed to parse client event: {}",
                            e
                        );
                    },
                },
                Message::Pong(_) => {
                    tracing::trace!(connection = %recv_connection, "Received pong");
                },
                Message::Close(_) => {
                    break;
                },
                _ => {},
            }
        }
    });

    // Wait for either side to finish
    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
        }
    }

    state.disconnect(&connection).await;
}
