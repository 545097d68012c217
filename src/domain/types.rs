//! # Domain Types
//!
//! Common data structures and enums used across the application logic.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Conversation mode of a session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Chat,
    Agent,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chat" => Ok(Self::Chat),
            "agent" => Ok(Self::Agent),
            other => Err(format!("unknown mode '{other}'")),
        }
    }
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Agent => "agent",
        }
    }
}

/// A single mutation proposed by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum AgentAction {
    /// Relative path and full text content.
    FileWrite { name: String, content: String },
    /// Slash directive. `verb` is the lower-cased leading token, `command` the raw text.
    Operation {
        command: String,
        verb: String,
        args: Vec<String>,
    },
}

impl AgentAction {
    /// Builds an operation from a raw command line. Returns `None` for blank input.
    pub fn operation(raw: &str) -> Option<Self> {
        let command = raw.trim();
        let mut tokens = command.split_whitespace();
        let verb = tokens.next()?.to_lowercase();
        Some(Self::Operation {
            command: command.to_string(),
            verb,
            args: tokens.map(str::to_string).collect(),
        })
    }

    pub fn is_operation(&self) -> bool {
        matches!(self, Self::Operation { .. })
    }

    /// Short label used in logs and outcome lines.
    pub fn label(&self) -> &str {
        match self {
            Self::FileWrite { name, .. } => name,
            Self::Operation { command, .. } => command,
        }
    }
}

/// Ordered set of actions extracted from one model turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionBatch {
    pub actions: Vec<AgentAction>,
}

impl ActionBatch {
    pub fn new(actions: Vec<AgentAction>) -> Self {
        Self { actions }
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn records(&self) -> Vec<ApprovalRecord> {
        self.actions.iter().map(ApprovalRecord::from).collect()
    }
}

/// What the approval UI is shown for each staged action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ApprovalRecord {
    File { name: String, content: String },
    Operation { command: String },
}

impl From<&AgentAction> for ApprovalRecord {
    fn from(action: &AgentAction) -> Self {
        match action {
            AgentAction::FileWrite { name, content } => Self::File {
                name: name.clone(),
                content: content.clone(),
            },
            AgentAction::Operation { command, .. } => Self::Operation {
                command: command.clone(),
            },
        }
    }
}

/// The human's answer to a staged batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl From<bool> for Decision {
    fn from(approved: bool) -> Self {
        if approved { Self::Approve } else { Self::Reject }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Failed,
    Warning,
}

/// Result of one executed action, in execution order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Outcome {
    pub index: usize,
    pub action: String,
    pub status: OutcomeStatus,
    pub message: String,
}

/// Summary of an approved batch.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ExecutionReport {
    pub files_written: usize,
    pub operations_run: usize,
    pub outcomes: Vec<Outcome>,
}

/// A request to the model runtime.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub images: Vec<String>,
    pub stop: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parses_case_insensitively() {
        assert_eq!(" Agent ".parse::<Mode>(), Ok(Mode::Agent));
        assert_eq!("chat".parse::<Mode>(), Ok(Mode::Chat));
        assert!("shell".parse::<Mode>().is_err());
    }
}
