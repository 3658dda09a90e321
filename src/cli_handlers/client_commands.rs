//! Client-side commands: send, typing, listen

use serde_json::Value;

use crate::cli::ClientTarget;
use crate::client::{self, RelayClient};
use crate::error::Result;
use crate::realtime::protocol::UserId;

/// Interpret a command-line message: JSON when it parses, plain string otherwise
pub fn parse_message(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

// The one-shot commands never register: binding this short-lived socket to a
// user would displace that user's live session and then drop it on close.

pub async fn handle_send(target: ClientTarget, message: String) -> Result<()> {
    let to = UserId::parse(target.to)?;

    let mut client = RelayClient::connect(&target.url).await?;
    client.send_message(&to, parse_message(&message)).await?;
    client.close().await?;

    tracing::info!("Sent message to {}", to);
    Ok(())
}

pub async fn handle_typing(target: ClientTarget, stop: bool) -> Result<()> {
    let to = UserId::parse(target.to)?;

    let mut client = RelayClient::connect(&target.url).await?;
    client.typing(&to, !stop).await?;
    client.close().await?;

    Ok(())
}

pub async fn handle_listen(url: String, user: String, count: Option<usize>) -> Result<()> {
    let user = UserId::parse(user)?;

    client::listen(&url, &user, count, |event| match event.to_text() {
        Ok(line) => println!("{}", line),
        Err(e) => tracing::warn!("Failed to print event: {}", e),
    })
    .await?;

    Ok(())
}
