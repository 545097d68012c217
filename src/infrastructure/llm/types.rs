//! Wire types for the Ollama-compatible generate API

use serde::{Deserialize, Serialize};

pub const PROVIDER: &str = "ollama";

/// `POST /api/generate` body
#[derive(Debug, Serialize)]
pub struct GenerateBody {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    pub options: GenerateOptions,
}

#[derive(Debug, Serialize)]
pub struct GenerateOptions {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stop: Vec<String>,
    pub num_thread: u32,
}

/// Non-streaming generate response
#[derive(Debug, Deserialize)]
pub struct GenerateReply {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub model: String,
}

/// Error type
#[derive(Debug)]
pub struct Error {
    pub message: String,
    pub provider: String,
}

impl Error {
    pub fn new(provider: &str, message: impl Into<String>) -> Self {
        Self {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Builds an error from a non-success HTTP reply, preferring the runtime's own message.
    pub fn from_reply(status: u16, body: &str) -> Self {
        if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
            if let Some(msg) = json.get("error").and_then(|e| e.as_str()) {
                return Self::new(PROVIDER, msg);
            }
        }
        Self::new(PROVIDER, format!("HTTP {}: {}", status, body))
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.provider, self.message)
    }
}

impl std::error::Error for Error {}
