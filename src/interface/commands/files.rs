//! # File Commands
//!
//! Handles `/cat`, `/find` and the mutating verbs shared with model-proposed operations.

use anyhow::Result;

use super::send;
use crate::application::operations::FsOperation;
use crate::application::state::Session;
use crate::domain::traits::ChatProvider;
use crate::infrastructure::tools::executor::ToolExecutor;
use crate::strings::messages;

pub async fn handle_cat(
    session: &Session,
    tools: &ToolExecutor,
    chat: &dyn ChatProvider,
    name: &str,
) -> Result<()> {
    if name.is_empty() {
        return send(chat, &messages::usage(messages::CAT_USAGE)).await;
    }

    let path = session.resolve(name)?;
    if !tools.is_file(&path).await {
        return send(chat, &messages::command_failed(&messages::file_not_found(name))).await;
    }

    let content = tools.read_file(&path).await?;
    let text = format!(
        "{}\n{}\n{}",
        messages::section_header(name),
        content,
        messages::section_footer()
    );
    send(chat, &text).await
}

pub async fn handle_find(
    session: &Session,
    tools: &ToolExecutor,
    chat: &dyn ChatProvider,
    pattern: &str,
) -> Result<()> {
    if pattern.is_empty() {
        return send(chat, &messages::usage(messages::FIND_USAGE)).await;
    }

    let matches = tools.find(session.working_directory(), pattern).await?;
    let mut lines = vec![messages::section_header(&format!(
        "SEARCH RESULTS FOR \"{}\"",
        pattern.to_lowercase()
    ))];
    if matches.is_empty() {
        lines.push(messages::no_matches());
    }
    lines.extend(matches.iter().map(|e| messages::entry_label(&e.name, e.is_dir)));
    send(chat, &lines.join("\n")).await
}

/// Runs a mutating verb immediately and reports success or failure as a line.
pub async fn handle_mutation(
    session: &mut Session,
    tools: &ToolExecutor,
    chat: &dyn ChatProvider,
    op: &FsOperation,
) -> Result<()> {
    let line = match op.apply(session, tools).await {
        Ok(detail) => messages::command_succeeded(&detail),
        Err(e) => {
            tracing::info!("Session {}: {:?} failed: {:#}", session.id(), op, e);
            messages::command_failed(&format!("{:#}", e))
        }
    };
    send(chat, &line).await
}
