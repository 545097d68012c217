//! # Main Entry Point
//!
//! Wires the layers together:
//! - Domain: configuration, types, path rules
//! - Infrastructure: model runtime client, filesystem tools, trash, logging
//! - Application: parser, approval gate, executor, router
//! - Interface: slash commands, console REPL, TCP line-protocol server
//!

mod application;
mod domain;
mod infrastructure;
mod interface;
mod strings;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::application::router::CommandRouter;
use crate::domain::config::{AppConfig, DEFAULT_CONFIG_PATH};
use crate::domain::traits::SoftDelete;
use crate::infrastructure::llm::Client as LlmClient;
use crate::infrastructure::tools::executor::ToolExecutor;

#[derive(Debug, Parser)]
#[command(name = "agent-terminal", version, about = "Model-assisted terminal with approval-gated file actions")]
struct Cli {
    /// Path to the YAML config file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Workspace root. Overrides `workspace.root`.
    #[arg(short, long)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive console session (default).
    Repl,
    /// Serve the newline-delimited JSON protocol over TCP.
    Serve {
        /// Address to listen on. Overrides `server.listen`.
        #[arg(short, long)]
        listen: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load Configuration
    let mut config = AppConfig::load(&cli.config)?;
    if let Some(root) = cli.root {
        config.workspace.root = root;
    }
    let command = cli.command.unwrap_or(Command::Repl);

    // 2. Logging Setup. The REPL owns stdout, so only the server logs to the console.
    let _guard = infrastructure::logging::init(&config.logging, matches!(command, Command::Serve { .. }))?;
    tracing::info!("Starting agent-terminal...");
    tracing::info!(
        "Workspace root {}, chat model {}, agent model {}",
        config.workspace.root.display(),
        config.model.chat_model,
        config.model.agent_model
    );

    // 3. Services
    let llm = LlmClient::new(config.model.clone()).context("Failed to build model client")?;
    let trash: Arc<dyn SoftDelete> =
        Arc::from(infrastructure::trash::platform_trash(config.workspace.trash_dir.as_deref()));
    let tools = Arc::new(ToolExecutor::new(config.workspace.tree_exclude.clone(), trash));
    let root = config.workspace.root.clone();
    let listen = config.server.listen.clone();
    let router = Arc::new(CommandRouter::new(config, Arc::new(llm), tools));

    // 4. Run
    match command {
        Command::Repl => interface::console::run(router, &root).await,
        Command::Serve { listen: override_addr } => {
            let addr = override_addr.unwrap_or(listen);
            interface::server::run(&addr, router, &root).await
        }
    }
}
