//! # Domain Traits
//!
//! Abstract interfaces for core system components (terminal output, model runtime, trash).
//! Allows for pluggable implementations in the Infrastructure and Interface layers.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::domain::errors::SoftDeleteError;
use crate::domain::types::{ApprovalRecord, GenerateRequest, Outcome};

/// Abstract interface for whatever is on the other end of a session (console, socket).
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Write terminal output. Lines are `\n` separated.
    async fn send_output(&self, content: &str) -> Result<(), String>;

    /// Reply on the separate chat channel.
    async fn send_chat_response(&self, content: &str) -> Result<(), String>;

    /// Report one executed action.
    async fn send_outcome(&self, outcome: &Outcome) -> Result<(), String>;

    /// Present a staged batch for a single approve/reject decision.
    async fn request_approval(&self, records: &[ApprovalRecord]) -> Result<(), String>;

    /// Clear the operator's screen
    async fn clear_screen(&self) -> Result<(), String>;

    /// Identifier of the session this provider serves
    fn session_id(&self) -> String;
}

/// Abstract interface for the model runtime
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Run a non-streaming generation and return the raw text.
    async fn generate(&self, request: GenerateRequest) -> Result<String, String>;

    /// Ask the runtime to stop whatever it is doing. Advisory only.
    async fn cancel(&self) -> Result<(), String>;
}

/// Moves content to a recoverable location instead of erasing it.
pub trait SoftDelete: Send + Sync {
    /// Returns where the content ended up.
    fn soft_delete(&self, path: &Path) -> Result<PathBuf, SoftDeleteError>;
}
