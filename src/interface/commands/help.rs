//! # Help Command
//!
//! Handles `/help`.

use anyhow::Result;

use super::send;
use crate::domain::traits::ChatProvider;

pub async fn handle_help(chat: &dyn ChatProvider) -> Result<()> {
    send(chat, crate::strings::help::MAIN).await
}
