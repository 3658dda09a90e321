pub mod connections;
pub mod protocol;
pub mod registry;
pub mod relay;
pub mod server;
pub mod websocket;

use std::time::Duration;

use connections::ConnectionTable;
use protocol::{ClientEvent, ConnectionId, ServerEvent, UserId};
use registry::ConnectionRegistry;
use relay::{EventRelay, RelayOutcome};

/// Shortest heartbeat a socket will use; `tokio::time::interval` rejects zero
pub const MIN_HEARTBEAT_INTERVAL: Duration = Duration::from_millis(100);

/// Presence and relay state shared by every socket
#[derive(Debug, Clone)]
pub struct RealtimeState {
    pub registry: ConnectionRegistry,
    pub connections: ConnectionTable,
    pub relay: EventRelay,
    pub heartbeat_interval: Duration,
}

impl RealtimeState {
    pub fn new(heartbeat_interval: Duration) -> Self {
        if heartbeat_interval < MIN_HEARTBEAT_INTERVAL {
            tracing::warn!(
                "Heartbeat interval {:?} is too short, using {:?}",
                heartbeat_interval,
                MIN_HEARTBEAT_INTERVAL
            );
        }
        let heartbeat_interval = heartbeat_interval.max(MIN_HEARTBEAT_INTERVAL);

        let registry = ConnectionRegistry::new();
        let connections = ConnectionTable::new();
        let relay = EventRelay::new(registry.clone(), connections.clone());

        Self {
            registry,
            connections,
            relay,
            heartbeat_interval,
        }
    }

    /// React to one decoded client event arriving on `connection`
    pub async fn handle_event(
        &self,
        connection: &ConnectionId,
        event: ClientEvent,
    ) -> Option<RelayOutcome> {
        match event {
            ClientEvent::Register(user) => {
                if let Some(stale) = self.registry.register(user.clone(), connection.clone()).await
                {
                    tracing::debug!(
                        user = %user,
                        stale_connection = %stale,
                        "Registration replaced an older connection"
                    );
                }
                tracing::info!("User {} registered with connection {}", user, connection);
                None
            },
            ClientEvent::SendMessage {
                recipient_id,
                message,
            } => Some(
                self.relay
                    .relay(&recipient_id, ServerEvent::ReceiveMessage(message))
                    .await,
            ),
            ClientEvent::Typing {
                recipient_id,
                is_typing,
            } => Some(
                self.relay
                    .relay(&recipient_id, ServerEvent::UserTyping { is_typing })
                    .await,
            ),
        }
    }

    /// Release everything owned by a closed connection
    pub async fn disconnect(&self, connection: &ConnectionId) -> Option<UserId> {
        let open_for = self.connections.close(connection).await;
        let user = self.registry.remove(connection).await;

        match &user {
            Some(user) => tracing::info!(
                connection = %connection,
                open_secs = ?open_for.map(|d| d.num_seconds()),
                "User {} disconnected",
                user
            ),
            None => tracing::info!(connection = %connection, "Unregistered connection closed"),
        }

        user
    }
}
