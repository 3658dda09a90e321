//! Event relay
//!
//! Forwards an event to whichever connection currently speaks for the
//! recipient. Unreachable recipients are dropped without telling the sender;
//! the outcome is only returned for logging.

use super::connections::ConnectionTable;
use super::protocol::{ConnectionId, ServerEvent, UserId};
use super::registry::ConnectionRegistry;

/// What happened to a relayed event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Queued on the recipient's connection
    Delivered(ConnectionId),
    /// Recipient has no registered connection
    RecipientOffline,
    /// Recipient's registered connection has already gone away
    ConnectionClosed(ConnectionId),
}

impl RelayOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, RelayOutcome::Delivered(_))
    }
}

/// Stateless dispatcher over the registry and the socket table
#[derive(Debug, Clone)]
pub struct EventRelay {
    registry: ConnectionRegistry,
    connections: ConnectionTable,
}

impl EventRelay {
    pub fn new(registry: ConnectionRegistry, connections: ConnectionTable) -> Self {
        Self {
            registry,
            connections,
        }
    }

    /// Forward `event` to `recipient`'s current connection, if any
    pub async fn relay(&self, recipient: &UserId, event: ServerEvent) -> RelayOutcome {
        let event_name = event.name();

        let Some(connection) = self.registry.resolve(recipient).await else {
            tracing::debug!(
                recipient = %recipient,
                event = event_name,
                "Dropped event: recipient offline"
            );
            return RelayOutcome::RecipientOffline;
        };

        if self.connections.send(&connection, event).await {
            tracing::debug!(
                recipient = %recipient,
                connection = %connection,
                event = event_name,
                "Relayed event"
            );
            RelayOutcome::Delivered(connection)
        } else {
            tracing::debug!(
                recipient = %recipient,
                connection = %connection,
                event = event_name,
                "Dropped event: connection closed"
            );
            RelayOutcome::ConnectionClosed(connection)
        }
    }
}
