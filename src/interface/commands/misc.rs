//! # Miscellaneous Commands
//!
//! Handles `/echo`, `/clear` and unknown verbs.

use anyhow::Result;

use super::send;
use crate::domain::traits::ChatProvider;
use crate::strings::messages;

pub async fn handle_echo(chat: &dyn ChatProvider, text: &str) -> Result<()> {
    send(chat, text).await
}

pub async fn handle_clear(chat: &dyn ChatProvider) -> Result<()> {
    chat.clear_screen().await.map_err(|e| anyhow::anyhow!(e))
}

pub async fn handle_unknown(chat: &dyn ChatProvider, verb: &str) -> Result<()> {
    tracing::debug!("Unknown command {}", verb);
    send(chat, &messages::unknown_command(verb)).await
}
