use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::websocket;
use super::RealtimeState;
use crate::config::ServerConfig;

const SERVICE_NAME: &str = "lostfound-relay";
const API_BANNER: &str = "NIT KKR Lost & Found API";

/// Server state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub realtime: RealtimeState,
}

/// Relay server instance
pub struct RelayServer {
    config: ServerConfig,
    state: AppState,
}

#[derive(Serialize)]
struct BannerResponse {
    message: String,
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

/// Presence counters
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InfoResponse {
    registered_users: usize,
    open_connections: usize,
}

impl RelayServer {
    pub fn new(config: ServerConfig) -> Self {
        let state = AppState {
            realtime: RealtimeState::new(config.heartbeat_interval),
        };
        Self { config, state }
    }

    /// Handle to the live state, for callers that need to inspect presence
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Bind the configured address and serve until Ctrl+C
    pub async fn run(self) -> Result<()> {
        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind to {}", addr))?;

        tracing::info!("Server running on port {}", self.config.port);
        tracing::info!("Accepting frontend origin {}", self.config.frontend_url);

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already-bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = create_router(self.state, &self.config)?;

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .context("Server error")?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

/// Create the Axum router with all routes and middleware
pub fn create_router(state: AppState, config: &ServerConfig) -> Result<Router> {
    let origin = config
        .frontend_origin()
        .context("Invalid CORS configuration")?;

    let api_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/info", get(info_handler));

    let router = Router::new()
        .route("/", get(root_handler))
        .route("/ws", get(websocket::handle_websocket))
        .nest("/api", api_routes)
        .fallback(not_found_handler)
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
                .allow_credentials(true),
        )
        .layer(TraceLayer::new_for_http());

    Ok(router)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

async fn root_handler() -> Json<BannerResponse> {
    Json(BannerResponse {
        message: API_BANNER.to_string(),
    })
}

/// Health check handler
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn info_handler(State(state): State<AppState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        registered_users: state.realtime.registry.len().await,
        open_connections: state.realtime.connections.len().await,
    })
}

/// 404 Not Found handler
async fn not_found_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "Not found",
            "code": "NOT_FOUND"
        })),
    )
}
