use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("WebSocket error: {0}")]
    WebSocketError(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection closed by server")]
    ConnectionClosed,

    #[error("Server error: {0}")]
    ServerError(String),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl RelayError {
    pub fn to_error_code(&self) -> &'static str {
        match self {
            RelayError::InvalidInput(_) => "INVALID_INPUT",
            RelayError::ConfigError(_) => "CONFIG_ERROR",
            RelayError::WebSocketError(_) => "WEBSOCKET_ERROR",
            RelayError::ConnectionClosed => "CONNECTION_CLOSED",
            RelayError::JsonError(_) => "JSON_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            code: self.to_error_code().to_string(),
        }
    }
}

impl From<anyhow::Error> for RelayError {
    fn from(err: anyhow::Error) -> Self {
        RelayError::ServerError(format!("{:#}", err))
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
