//! WebSocket client for the relay protocol
//!
//! Used by the `send`, `typing` and `listen` commands and by the integration
//! tests. `listen` keeps a session alive across server restarts: the server
//! keeps no presence state, so every reconnect registers again.

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream,
};

use crate::error::{RelayError, Result};
use crate::realtime::protocol::{ClientEvent, ServerEvent, UserId};

/// Reconnection delays in seconds (exponential backoff with max)
const RECONNECT_DELAYS: &[u64] = &[1, 2, 4, 8, 16, 32];

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// One open connection to a relay server
pub struct RelayClient {
    stream: WsStream,
}

impl RelayClient {
    pub async fn connect(url: &str) -> Result<Self> {
        let (stream, _response) = connect_async(url).await?;
        tracing::debug!("Connected to {}", url);
        Ok(Self { stream })
    }

    /// Send a raw client event
    pub async fn emit(&mut self, event: &ClientEvent) -> Result<()> {
        self.stream.send(Message::Text(event.to_text()?)).await?;
        Ok(())
    }

    pub async fn register(&mut self, user: &UserId) -> Result<()> {
        self.emit(&ClientEvent::Register(user.clone())).await
    }

    pub async fn send_message(&mut self, recipient: &UserId, message: Value) -> Result<()> {
        self.emit(&ClientEvent::SendMessage {
            recipient_id: recipient.clone(),
            message,
        })
        .await
    }

    pub async fn typing(&mut self, recipient: &UserId, is_typing: bool) -> Result<()> {
        self.emit(&ClientEvent::Typing {
            recipient_id: recipient.clone(),
            is_typing,
        })
        .await
    }

    /// Wait for the next relayed event. `None` once the server closes.
    pub async fn next_event(&mut self) -> Result<Option<ServerEvent>> {
        while let Some(msg) = self.stream.next().await {
            match msg? {
                Message::Text(text) => match ServerEvent::from_text(&text) {
                    Ok(event) => return Ok(Some(event)),
                    Err(e) => tracing::warn!("Ignoring unrecognised server frame: {}", e),
                },
                Message::Close(_) => return Ok(None),
                _ => {},
            }
        }
        Ok(None)
    }

    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }
}

/// Backoff before reconnect attempt `attempt` (0-based), ±25% jitter
pub fn reconnect_delay(attempt: usize) -> Duration {
    let delay_index = std::cmp::min(attempt, RECONNECT_DELAYS.len() - 1);
    let base_ms = (RECONNECT_DELAYS[delay_index] * 1000) as f64;

    let jitter_factor = rand::random::<f64>() * 2.0 - 1.0;
    let delay_ms = base_ms + base_ms * 0.25 * jitter_factor;
    Duration::from_millis(delay_ms.max(0.0) as u64)
}

/// Stay registered as `user` and hand every relayed event to `on_event`.
///
/// Reconnects with backoff whenever the connection drops. Returns after
/// `limit` events when a limit is given, otherwise runs until an error
/// that is not a connection failure.
pub async fn listen<F>(url: &str, user: &UserId, limit: Option<usize>, mut on_event: F) -> Result<usize>
where
    F: FnMut(&ServerEvent),
{
    let mut received = 0;
    let mut attempt = 0;

    loop {
        let mut client = match RelayClient::connect(url).await {
            Ok(client) => client,
            Err(RelayError::WebSocketError(e)) => {
                let delay = reconnect_delay(attempt);
                tracing::warn!(
                    "Connection to {} failed: {}. Retrying in {:.1}s",
                    url,
                    e,
                    delay.as_secs_f64()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            },
            Err(e) => return Err(e),
        };
        attempt = 0;

        client.register(user).await?;
        tracing::info!("Listening as {} on {}", user, url);

        loop {
            if limit.is_some_and(|limit| received >= limit) {
                client.close().await.ok();
                return Ok(received);
            }

            match client.next_event().await {
                Ok(Some(event)) => {
                    on_event(&event);
                    received += 1;
                },
                Ok(None) => {
                    tracing::info!("Server closed the connection, reconnecting...");
                    break;
                },
                Err(e) => {
                    tracing::warn!("Connection lost: {}. Reconnecting...", e);
                    break;
                },
            }
        }

        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}
