//! Connection registry: which connection currently speaks for which user
//!
//! A user maps to at most one connection (last registration wins) and a
//! connection is bound to at most one user. The reverse map makes disconnect
//! cleanup a direct lookup instead of a scan. Both maps live behind one lock
//! so they always agree.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::protocol::{ConnectionId, UserId};

#[derive(Debug, Default)]
struct RegistryInner {
    by_user: HashMap<UserId, ConnectionId>,
    by_connection: HashMap<ConnectionId, UserId>,
}

/// Shared handle to the presence registry
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `user` to `connection`, replacing any earlier binding for that user.
    ///
    /// The replaced connection is not closed; it simply stops receiving relayed
    /// events. Returns the connection that was replaced, if it differs.
    pub async fn register(&self, user: UserId, connection: ConnectionId) -> Option<ConnectionId> {
        let mut inner = self.inner.write().await;

        // A connection re-registering under a new identity releases the old one
        if let Some(prev_user) = inner
            .by_connection
            .insert(connection.clone(), user.clone())
        {
            if prev_user != user && inner.by_user.get(&prev_user) == Some(&connection) {
                inner.by_user.remove(&prev_user);
            }
        }

        let previous = inner.by_user.insert(user, connection.clone());
        match previous {
            Some(stale) if stale != connection => {
                inner.by_connection.remove(&stale);
                Some(stale)
            },
            _ => None,
        }
    }

    /// Current connection for `user`
    pub async fn resolve(&self, user: &UserId) -> Option<ConnectionId> {
        self.inner.read().await.by_user.get(user).cloned()
    }

    /// User currently bound to `connection`
    pub async fn user_for(&self, connection: &ConnectionId) -> Option<UserId> {
        self.inner.read().await.by_connection.get(connection).cloned()
    }

    /// Drop the binding owned by `connection`. No-op when it owns none.
    pub async fn remove(&self, connection: &ConnectionId) -> Option<UserId> {
        let mut inner = self.inner.write().await;

        let user = inner.by_connection.remove(connection)?;
        if inner.by_user.get(&user) == Some(connection) {
            inner.by_user.remove(&user);
        }
        Some(user)
    }

    /// Number of registered users
    pub async fn len(&self) -> usize {
        self.inner.read().await.by_user.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.by_user.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId::parse(id).unwrap()
    }

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::from(id)
    }

    #[tokio::test]
    async fn test_resolve_returns_latest_registration() {
        let registry = ConnectionRegistry::new();

        for c in ["c1", "c2", "c3", "c2"] {
            registry.register(user("A"), conn(c)).await;
        }

        assert_eq!(registry.resolve(&user("A")).await, Some(conn("c2")));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_register_is_idempotent() {
        let registry = ConnectionRegistry::new();

        assert_eq!(registry.register(user("A"), conn("c1")).await, None);
        assert_eq!(registry.register(user("A"), conn("c1")).await, None);

        assert_eq!(registry.resolve(&user("A")).await, Some(conn("c1")));
        assert_eq!(registry.user_for(&conn("c1")).await, Some(user("A")));
    }

    #[tokio::test]
    async fn test_register_reports_replaced_connection() {
        let registry = ConnectionRegistry::new();

        registry.register(user("A"), conn("c1")).await;
        let replaced = registry.register(user("A"), conn("c3")).await;

        assert_eq!(replaced, Some(conn("c1")));
        assert_eq!(registry.user_for(&conn("c1")).await, None);
    }

    #[tokio::test]
    async fn test_remove_unbinds_user() {
        let registry = ConnectionRegistry::new();
        registry.register(user("A"), conn("c1")).await;

        assert_eq!(registry.remove(&conn("c1")).await, Some(user("A")));
        assert_eq!(registry.resolve(&user("A")).await, None);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_remove_unknown_connection_is_noop() {
        let registry = ConnectionRegistry::new();
        registry.register(user("A"), conn("c1")).await;

        assert_eq!(registry.remove(&conn("nope")).await, None);
        assert_eq!(registry.resolve(&user("A")).await, Some(conn("c1")));
    }

    #[tokio::test]
    async fn test_stale_disconnect_keeps_newer_binding() {
        let registry = ConnectionRegistry::new();

        registry.register(user("A"), conn("conn1")).await;
        registry.register(user("A"), conn("conn3")).await;
        assert_eq!(registry.remove(&conn("conn1")).await, None);

        assert_eq!(registry.resolve(&user("A")).await, Some(conn("conn3")));
    }

    #[tokio::test]
    async fn test_connection_switching_user_releases_old_user() {
        let registry = ConnectionRegistry::new();

        registry.register(user("A"), conn("c1")).await;
        registry.register(user("B"), conn("c1")).await;

        assert_eq!(registry.resolve(&user("A")).await, None);
        assert_eq!(registry.resolve(&user("B")).await, Some(conn("c1")));

        // Disconnect leaves nothing behind
        registry.remove(&conn("c1")).await;
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_switching_user_does_not_steal_other_binding() {
        let registry = ConnectionRegistry::new();

        registry.register(user("A"), conn("c1")).await;
        registry.register(user("A"), conn("c2")).await;
        // c1 no longer owns A, so re-registering it as B leaves A -> c2 alone
        registry.register(user("B"), conn("c1")).await;

        assert_eq!(registry.resolve(&user("A")).await, Some(conn("c2")));
        assert_eq!(registry.resolve(&user("B")).await, Some(conn("c1")));
        assert_eq!(registry.len().await, 2);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let registry = ConnectionRegistry::new();
        let handle = registry.clone();

        handle.register(user("A"), conn("c1")).await;
        assert_eq!(registry.resolve(&user("A")).await, Some(conn("c1")));
    }

    #[tokio::test]
    async fn test_concurrent_registrations() {
        let registry = ConnectionRegistry::new();

        let mut handles = Vec::new();
        for i in 0..50 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move {
                let id = format!("user-{}", i);
                registry
                    .register(UserId::parse(id).unwrap(), ConnectionId::from(format!("c{}", i)))
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(registry.len().await, 50);
        assert_eq!(
            registry.resolve(&user("user-7")).await,
            Some(conn("c7"))
        );
    }
}
