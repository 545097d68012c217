//! # Configuration
//!
//! Manages the loading and parsing of the application's configuration file (`config.yaml`).
//! Defines the structs for model runtime, workspace, server and logging settings.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "data/config.yaml";

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Reads the YAML file at `path`. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document deserializes to unit, not an empty map.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}

/// Settings for the model runtime (Ollama-compatible `/api/generate`).
#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[serde(default = "default_agent_model")]
    pub agent_model: String,
    /// Forwarded as `num_thread` to cap CPU usage.
    #[serde(default = "default_threads")]
    pub threads: u32,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_stop")]
    pub stop: Vec<String>,
    /// argv run by `/cancel`.
    #[serde(default = "default_cancel_command")]
    pub cancel_command: Vec<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            chat_model: default_chat_model(),
            agent_model: default_agent_model(),
            threads: default_threads(),
            timeout_secs: default_timeout(),
            stop: default_stop(),
            cancel_command: default_cancel_command(),
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:11434/api/generate".to_string()
}
fn default_chat_model() -> String {
    "gemma3:4b".to_string()
}
fn default_agent_model() -> String {
    "deepseek-r1:7b".to_string()
}
fn default_threads() -> u32 {
    3
}
fn default_timeout() -> u64 {
    600
}
fn default_stop() -> Vec<String> {
    ["User:", "Assistant:", "System:", "---"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_cancel_command() -> Vec<String> {
    ["pkill", "-9", "ollama"].iter().map(|s| s.to_string()).collect()
}

/// Where sessions live on disk.
#[derive(Debug, Deserialize, Clone)]
pub struct WorkspaceConfig {
    /// Root and initial working directory of every session.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Directory names `/tree` does not descend into.
    #[serde(default = "default_tree_exclude")]
    pub tree_exclude: Vec<String>,
    #[serde(default)]
    pub trash_dir: Option<PathBuf>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            tree_exclude: default_tree_exclude(),
            trash_dir: None,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_tree_exclude() -> Vec<String> {
    vec!["node_modules".to_string(), ".git".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

fn default_listen() -> String {
    "127.0.0.1:3000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_log_file")]
    pub file: String,
    /// EnvFilter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            file: default_log_file(),
            filter: default_log_filter(),
        }
    }
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_log_file() -> String {
    "session.log".to_string()
}
fn default_log_filter() -> String {
    "info,reqwest=warn,hyper=warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = AppConfig::from_yaml("").unwrap();
        assert_eq!(config.model.chat_model, "gemma3:4b");
        assert_eq!(config.model.agent_model, "deepseek-r1:7b");
        assert_eq!(config.model.threads, 3);
        assert_eq!(config.workspace.tree_exclude, vec!["node_modules", ".git"]);
        assert_eq!(config.server.listen, "127.0.0.1:3000");
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let yaml = "model:\n  agent_model: qwen2.5-coder:7b\nworkspace:\n  root: /srv/work\n  trash_dir: /srv/trash\n";
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.model.agent_model, "qwen2.5-coder:7b");
        assert_eq!(config.model.chat_model, "gemma3:4b");
        assert_eq!(config.model.stop.len(), 4);
        assert_eq!(config.workspace.root, PathBuf::from("/srv/work"));
        assert_eq!(config.workspace.trash_dir, Some(PathBuf::from("/srv/trash")));
        assert_eq!(config.logging.file, "session.log");
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        assert!(AppConfig::from_yaml("model: [unclosed").is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config.model.cancel_command, vec!["pkill", "-9", "ollama"]);
    }
}
