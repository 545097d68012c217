//! # Command Handlers
//!
//! Slash commands typed by the operator. They run immediately, without the approval
//! gate, against the same filesystem primitives approved actions use.

pub mod files;
pub mod help;
pub mod misc;
pub mod navigation;

use anyhow::Result;

use crate::application::operations::FsOperation;
use crate::application::state::Session;
use crate::domain::traits::ChatProvider;
use crate::infrastructure::tools::executor::ToolExecutor;
use crate::strings::messages;

/// Maps alternate spellings onto their canonical verb.
fn canonical_verb(verb: &str) -> &str {
    match verb {
        "/files" => "/ls",
        "/view" => "/cat",
        "/search" => "/find",
        "/cls" => "/clear",
        "/?" => "/help",
        other => other,
    }
}

/// Runs one slash command. Failures are reported to the operator, not returned;
/// only a broken output channel is an error.
pub async fn dispatch(
    session: &mut Session,
    tools: &ToolExecutor,
    chat: &dyn ChatProvider,
    line: &str,
) -> Result<()> {
    let mut tokens = line.split_whitespace();
    let verb = tokens.next().unwrap_or("").to_lowercase();
    let args: Vec<String> = tokens.map(str::to_string).collect();
    let rest = line
        .trim()
        .split_once(char::is_whitespace)
        .map(|(_, r)| r.trim())
        .unwrap_or("");

    let result = match canonical_verb(&verb) {
        "/pwd" => navigation::handle_pwd(session, chat).await,
        "/ls" => navigation::handle_ls(session, tools, chat).await,
        "/tree" => navigation::handle_tree(session, tools, chat).await,
        "/cat" => files::handle_cat(session, tools, chat, rest).await,
        "/find" => files::handle_find(session, tools, chat, rest).await,
        "/help" => help::handle_help(chat).await,
        "/echo" => misc::handle_echo(chat, rest).await,
        "/clear" => misc::handle_clear(chat).await,
        _ => match FsOperation::parse(&verb, &args) {
            Some(Ok(op)) => files::handle_mutation(session, tools, chat, &op).await,
            Some(Err(usage)) => send(chat, &messages::usage(usage)).await,
            None => misc::handle_unknown(chat, &verb).await,
        },
    };

    if let Err(e) = result {
        tracing::warn!("Command '{}' failed: {:#}", verb, e);
        send(chat, &messages::command_error(&format!("{:#}", e))).await?;
    }
    Ok(())
}

pub(crate) async fn send(chat: &dyn ChatProvider, text: &str) -> Result<()> {
    chat.send_output(text).await.map_err(|e| anyhow::anyhow!(e))
}


#[cfg(test)]
mod tests {
    use super::test_support::RecordingChat;
    use super::*;
    use crate::infrastructure::trash::TrashCan;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn setup() -> (TempDir, TempDir, Session, ToolExecutor) {
        let work = TempDir::new().unwrap();
        let trash = TempDir::new().unwrap();
        let session = Session::new("test", work.path()).unwrap();
        let tools = ToolExecutor::new(
            vec![".git".to_string()],
            Arc::new(TrashCan::freedesktop(trash.path())),
        );
        (work, trash, session, tools)
    }

    #[tokio::test]
    async fn test_unknown_command_is_reported() {
        let (_w, _t, mut session, tools) = setup();
        let chat = RecordingChat::default();
        dispatch(&mut session, &tools, &chat, "/frobnicate now").await.unwrap();
        assert!(chat.output().contains("Unknown command: /frobnicate"));
    }

    #[tokio::test]
    async fn test_missing_args_give_usage() {
        let (_w, _t, mut session, tools) = setup();
        let chat = RecordingChat::default();
        dispatch(&mut session, &tools, &chat, "/mkdir").await.unwrap();
        dispatch(&mut session, &tools, &chat, "/cat").await.unwrap();
        let out = chat.output();
        assert!(out.contains("Usage: /mkdir <directory_name>"));
        assert!(out.contains("Usage: /cat <filename>"));
    }

    #[tokio::test]
    async fn test_mutations_run_without_approval() {
        let (_w, _t, mut session, tools) = setup();
        let chat = RecordingChat::default();
        dispatch(&mut session, &tools, &chat, "/mkdir site").await.unwrap();
        dispatch(&mut session, &tools, &chat, "/cd site").await.unwrap();
        dispatch(&mut session, &tools, &chat, "/touch index.html").await.unwrap();

        assert!(session.root().join("site/index.html").is_file());
        assert_eq!(session.display_cwd(), "/site");
        assert!(!session.pending.is_pending());
    }

    #[tokio::test]
    async fn test_aliases_resolve() {
        let (_w, _t, mut session, tools) = setup();
        std::fs::write(session.root().join("notes.txt"), "remember").unwrap();
        let chat = RecordingChat::default();

        dispatch(&mut session, &tools, &chat, "/view notes.txt").await.unwrap();
        dispatch(&mut session, &tools, &chat, "/copy notes.txt copy.txt").await.unwrap();
        dispatch(&mut session, &tools, &chat, "/cls").await.unwrap();

        assert!(chat.output().contains("remember"));
        assert!(session.root().join("copy.txt").is_file());
        assert_eq!(*chat.cleared.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_cd_reports_and_keeps_cwd() {
        let (_w, _t, mut session, tools) = setup();
        let chat = RecordingChat::default();
        dispatch(&mut session, &tools, &chat, "/cd nope").await.unwrap();
        assert!(chat.output().contains("Directory not found: nope"));
        assert_eq!(session.working_directory(), session.root());
    }
}
