//! Common utilities for integration tests
//!
//! Starts an in-process relay server on an ephemeral port so each test gets
//! its own isolated presence state.

#![allow(dead_code)] // Not every test file uses every helper

use lostfound_relay::client::RelayClient;
use lostfound_relay::config::ServerConfig;
use lostfound_relay::realtime::protocol::{ServerEvent, UserId};
use lostfound_relay::realtime::server::{AppState, RelayServer};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::oneshot;

/// How long to wait for something that should happen
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// How long to wait before concluding that nothing arrived
pub const SILENCE_WINDOW: Duration = Duration::from_millis(300);

/// Relay server running inside the test process
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            ..Default::default()
        })
        .await
    }

    pub async fn start_with(config: ServerConfig) -> Self {
        let listener = tokio::net::TcpListener::bind(config.bind_addr())
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().unwrap();

        let server = RelayServer::new(config);
        let state = server.state();
        let (tx, rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            server
                .serve(listener, async {
                    rx.await.ok();
                })
                .await
                .ok();
        });

        Self {
            addr,
            state,
            shutdown: Some(tx),
        }
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Connect a client and register it as `user`, waiting until the server has
    /// recorded the registration
    pub async fn connect_as(&self, user: &str) -> RelayClient {
        let mut client = RelayClient::connect(&self.ws_url())
            .await
            .expect("Failed to connect");
        client.register(&user_id(user)).await.unwrap();
        assert!(
            self.wait_for(user, true).await,
            "registration of {} never landed",
            user
        );
        client
    }

    /// Poll until `user` is (or is not) registered
    pub async fn wait_for(&self, user: &str, registered: bool) -> bool {
        let user = user_id(user);
        let deadline = tokio::time::Instant::now() + EVENT_TIMEOUT;

        while tokio::time::Instant::now() < deadline {
            let present = self.state.realtime.registry.resolve(&user).await.is_some();
            if present == registered {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }

    /// Poll until the server tracks exactly `count` open sockets
    pub async fn wait_for_connections(&self, count: usize) -> bool {
        let deadline = tokio::time::Instant::now() + EVENT_TIMEOUT;

        while tokio::time::Instant::now() < deadline {
            if self.state.realtime.connections.len().await == count {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

pub fn user_id(id: &str) -> UserId {
    UserId::parse(id).unwrap()
}

/// Next event, or `None` if nothing arrives within `wait`
pub async fn recv_within(client: &mut RelayClient, wait: Duration) -> Option<ServerEvent> {
    match tokio::time::timeout(wait, client.next_event()).await {
        Ok(Ok(event)) => event,
        Ok(Err(e)) => panic!("client error: {}", e),
        Err(_) => None,
    }
}
