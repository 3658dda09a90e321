// Live socket table: connection id → outbound queue

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use super::protocol::{ConnectionId, ServerEvent};

pub type EventSender = mpsc::UnboundedSender<ServerEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<ServerEvent>;

/// Outbound side of one open socket
#[derive(Debug)]
pub struct OpenConnection {
    pub tx: EventSender,
    pub connected_at: chrono::DateTime<chrono::Utc>,
}

/// Shared table of open sockets
#[derive(Debug, Clone, Default)]
pub struct ConnectionTable {
    connections: Arc<RwLock<HashMap<ConnectionId, OpenConnection>>>,
}

impl ConnectionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a newly opened socket and return the receiving end of its queue
    pub async fn open(&self, id: ConnectionId) -> EventReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.connections.write().await.insert(
            id,
            OpenConnection {
                tx,
                connected_at: chrono::Utc::now(),
            },
        );
        rx
    }

    /// Forget a socket. Returns how long it was open.
    pub async fn close(&self, id: &ConnectionId) -> Option<chrono::Duration> {
        self.connections
            .write()
            .await
            .remove(id)
            .map(|conn| chrono::Utc::now() - conn.connected_at)
    }

    /// Queue an event for a socket. False when the socket is gone.
    pub async fn send(&self, id: &ConnectionId, event: ServerEvent) -> bool {
        match self.connections.read().await.get(id) {
            Some(conn) => conn.tx.send(event).is_ok(),
            None => false,
        }
    }

    pub async fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.read().await.contains_key(id)
    }

    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }
}
