//! Wire protocol for the real-time socket
//!
//! Every frame is a JSON text message of the form
//! `{"event": "<name>", "data": <payload>}`.
//!
//! Client → server: `register`, `send_message`, `typing`.
//! Server → client: `receive_message`, `user_typing`.
//!
//! There are no acknowledgement or error events. Payloads relayed to a
//! recipient are forwarded exactly as the sender supplied them.

use rand::distr::{Alphanumeric, SampleString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{RelayError, Result};

/// Length of server-generated connection identifiers
const CONNECTION_ID_LEN: usize = 20;

/// Stable application-level identity of a user
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Parse a user identifier, rejecting empty or whitespace-only values
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(RelayError::InvalidInput(
                "user identifier must not be empty".to_string(),
            ));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = RelayError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque handle for one live socket connection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Alphanumeric.sample_string(&mut rand::rng(), CONNECTION_ID_LEN))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConnectionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ConnectionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Events sent by clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Bind the sending connection to a user identifier
    Register(UserId),

    /// Direct message for another user
    #[serde(rename_all = "camelCase")]
    SendMessage {
        recipient_id: UserId,
        #[serde(default)]
        message: Value,
    },

    /// Typing indicator for another user
    #[serde(rename_all = "camelCase")]
    Typing {
        recipient_id: UserId,
        is_typing: bool,
    },
}

impl ClientEvent {
    /// Decode a text frame
    pub fn from_text(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(Into::into)
    }

    pub fn to_text(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Into::into)
    }
}

/// Events pushed to recipients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    ReceiveMessage(Value),

    #[serde(rename_all = "camelCase")]
    UserTyping { is_typing: bool },
}

impl ServerEvent {
    /// Event name as it appears on the wire
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::ReceiveMessage(_) => "receive_message",
            ServerEvent::UserTyping { .. } => "user_typing",
        }
    }

    pub fn from_text(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(Into::into)
    }

    pub fn to_text(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Into::into)
    }
}
