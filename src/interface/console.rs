//! # Console Front End
//!
//! Interactive terminal loop for a single local session. After a turn stages a batch
//! the operator answers `[1] approve / [2] reject` before the next prompt.

use anyhow::Result;
use async_trait::async_trait;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::future::Future;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use crate::application::router::CommandRouter;
use crate::application::state::Session;
use crate::domain::traits::ChatProvider;
use crate::domain::types::{ApprovalRecord, Mode, Outcome};
use crate::strings::messages;

const PREVIEW_LINES: usize = 8;

#[derive(Clone)]
pub struct ConsoleService {
    session_id: String,
}

impl ConsoleService {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }
}

#[async_trait]
impl ChatProvider for ConsoleService {
    async fn send_output(&self, content: &str) -> Result<(), String> {
        println!("{}", content);
        Ok(())
    }

    async fn send_chat_response(&self, content: &str) -> Result<(), String> {
        println!("{}", content);
        Ok(())
    }

    async fn send_outcome(&self, outcome: &Outcome) -> Result<(), String> {
        println!("{}", messages::outcome_line(outcome));
        Ok(())
    }

    async fn request_approval(&self, records: &[ApprovalRecord]) -> Result<(), String> {
        for (i, record) in records.iter().enumerate() {
            match record {
                ApprovalRecord::Operation { command } => {
                    println!("{} {}", messages::yellow(&format!("[{}] OPERATION", i + 1)), command);
                }
                ApprovalRecord::File { name, content } => {
                    println!("{} {}", messages::cyan(&format!("[{}] FILE", i + 1)), name);
                    let total = content.lines().count();
                    for line in content.lines().take(PREVIEW_LINES) {
                        println!("    {}", messages::dim(line));
                    }
                    if total > PREVIEW_LINES {
                        println!("    {}", messages::dim(&format!("... {} more line(s)", total - PREVIEW_LINES)));
                    }
                }
            }
        }
        Ok(())
    }

    async fn clear_screen(&self) -> Result<(), String> {
        print!("\x1b[2J\x1b[H");
        std::io::stdout().flush().map_err(|e| e.to_string())
    }

    fn session_id(&self) -> String {
        self.session_id.clone()
    }
}

fn prompt(text: &str) -> Result<()> {
    print!("{}", text);
    std::io::stdout().flush()?;
    Ok(())
}

/// Next input line, or `None` on EOF or when `interrupt` fires first.
async fn next_input<R, F>(lines: &mut Lines<R>, interrupt: F) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    F: Future,
{
    tokio::select! {
        line = lines.next_line() => Ok(line?),
        _ = interrupt => Ok(None),
    }
}

/// Runs the REPL until EOF, `/exit` or Ctrl-C at a prompt.
pub async fn run(router: Arc<CommandRouter>, root: &Path) -> Result<()> {
    let chat = ConsoleService::new("console");
    let mut session = Session::new(chat.session_id(), root)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let model = &router.config().model;
    println!(
        "{}",
        messages::dim(&format!(
            "chat model: {}  agent model: {}  root: {}",
            model.chat_model,
            model.agent_model,
            session.root().display()
        ))
    );
    println!(
        "{}",
        messages::dim("Type /help for commands, /exit to leave. Ctrl-C cancels a running turn, or leaves at the prompt.")
    );

    loop {
        let mode = match session.mode {
            Mode::Chat => messages::cyan("chat"),
            Mode::Agent => messages::yellow("agent"),
        };
        prompt(&format!("{} {}$ ", mode, session.display_cwd()))?;

        let Some(line) = next_input(&mut lines, tokio::signal::ctrl_c()).await? else {
            println!();
            break;
        };
        if matches!(line.trim(), "/exit" | "/quit") {
            break;
        }

        tokio::select! {
            result = router.route(&mut session, &chat, &line) => result?,
            _ = tokio::signal::ctrl_c() => {
                println!();
                router.cancel(&chat).await?;
            }
        }

        while session.pending.is_pending() {
            let staged = session.pending.peek().map_or(0, |batch| batch.len());
            prompt(&messages::yellow(&format!(
                "[1] approve / [2] reject ({} action(s)) > ",
                staged
            )))?;
            let Some(answer) = next_input(&mut lines, tokio::signal::ctrl_c()).await? else {
                println!();
                tracing::info!("Console closed with a batch still pending");
                return Ok(());
            };
            match answer.trim().to_lowercase().as_str() {
                "1" | "y" | "yes" => {
                    router.handle_decision(&mut session, &chat, true).await?;
                }
                "2" | "n" | "no" => {
                    router.handle_decision(&mut session, &chat, false).await?;
                }
                _ => println!("{}", messages::dim("Answer 1 to approve or 2 to reject.")),
            }
        }
    }

    tracing::info!("Console session closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_next_input_returns_typed_line() {
        let (mut tx, rx) = tokio::io::duplex(64);
        tx.write_all(b"/pwd\n").await.unwrap();
        let mut lines = BufReader::new(rx).lines();

        let line = next_input(&mut lines, std::future::pending::<()>()).await.unwrap();
        assert_eq!(line.as_deref(), Some("/pwd"));
    }

    #[tokio::test]
    async fn test_interrupt_at_prompt_ends_input() {
        let (_tx, rx) = tokio::io::duplex(64);
        let mut lines = BufReader::new(rx).lines();

        let line = next_input(&mut lines, std::future::ready(())).await.unwrap();
        assert_eq!(line, None);
    }
}
