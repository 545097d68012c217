//! # Navigation Commands
//!
//! Handles `/pwd`, `/ls` and `/tree`.

use anyhow::Result;

use super::send;
use crate::application::state::Session;
use crate::domain::traits::ChatProvider;
use crate::infrastructure::tools::executor::ToolExecutor;
use crate::strings::messages;

pub async fn handle_pwd(session: &Session, chat: &dyn ChatProvider) -> Result<()> {
    let text = format!(
        "{}\n{}",
        session.display_cwd(),
        messages::dim(&session.working_directory().display().to_string())
    );
    send(chat, &text).await
}

pub async fn handle_ls(session: &Session, tools: &ToolExecutor, chat: &dyn ChatProvider) -> Result<()> {
    let entries = tools.list_dir(session.working_directory()).await?;

    let mut lines = vec![messages::section_header(&format!("FILES IN {}", session.display_cwd()))];
    if entries.is_empty() {
        lines.push(messages::dim("(empty)"));
    }
    lines.extend(entries.iter().map(|e| messages::entry_label(&e.name, e.is_dir)));
    send(chat, &lines.join("\n")).await
}

pub async fn handle_tree(session: &Session, tools: &ToolExecutor, chat: &dyn ChatProvider) -> Result<()> {
    let tree = tools.tree(session.working_directory()).await?;

    let mut lines = vec![
        messages::section_header("DIRECTORY TREE"),
        format!("📁 {}", session.display_cwd()),
    ];
    lines.extend(tree);
    send(chat, &lines.join("\n")).await
}
