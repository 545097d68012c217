//! # LLM Client
//!
//! Provides the `Client` struct, the model-runtime collaborator. It posts prompts to an
//! Ollama-compatible `/api/generate` endpoint and knows how to ask the runtime to stop.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::config::ModelConfig;
use crate::domain::traits::LlmProvider;
use crate::domain::types::GenerateRequest;
use crate::infrastructure::llm::types::{
    Error, GenerateBody, GenerateOptions, GenerateReply, PROVIDER,
};

/// Simple model runtime client
pub struct Client {
    config: ModelConfig,
    http: reqwest::Client,
}

impl Client {
    pub fn new(config: ModelConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::new(PROVIDER, format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { config, http })
    }

    pub fn body(&self, request: GenerateRequest) -> GenerateBody {
        GenerateBody {
            model: request.model,
            prompt: request.prompt,
            stream: false,
            images: request.images,
            options: GenerateOptions {
                stop: request.stop,
                num_thread: self.config.threads,
            },
        }
    }

    /// Send one prompt and wait for the full reply.
    pub async fn generate_text(&self, request: GenerateRequest) -> Result<String, Error> {
        if !request.images.is_empty() {
            let kb: usize = request.images.iter().map(|i| i.len()).sum::<usize>() / 1024;
            tracing::info!("Sending image request to {} ({} KB)", request.model, kb);
        }

        let body = self.body(request);
        let response = self
            .http
            .post(&self.config.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::new(PROVIDER, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            tracing::error!("Model request failed ({}): {}", status, error_text);
            return Err(Error::from_reply(status.as_u16(), &error_text));
        }

        let reply: GenerateReply = response
            .json()
            .await
            .map_err(|e| Error::new(PROVIDER, format!("Failed to parse response: {}", e)))?;
        tracing::debug!("Reply from {} ({} chars)", reply.model, reply.response.len());
        Ok(reply.response)
    }

    /// Runs the configured cancel command.
    pub async fn stop_runtime(&self) -> Result<(), Error> {
        let Some((program, args)) = self.config.cancel_command.split_first() else {
            return Err(Error::new(PROVIDER, "No cancel command configured"));
        };

        tracing::info!("Stopping model runtime: {:?}", self.config.cancel_command);
        let status = tokio::process::Command::new(program)
            .args(args)
            .status()
            .await
            .map_err(|e| Error::new(PROVIDER, format!("Failed to run {}: {}", program, e)))?;

        // pkill exits 1 when nothing matched, which still means nothing is running.
        match status.code() {
            Some(0) | Some(1) => Ok(()),
            _ => Err(Error::new(
                PROVIDER,
                format!("{} exited with {}", program, status),
            )),
        }
    }
}

#[async_trait]
impl LlmProvider for Client {
    async fn generate(&self, request: GenerateRequest) -> Result<String, String> {
        self.generate_text(request).await.map_err(|e| e.message)
    }

    async fn cancel(&self) -> Result<(), String> {
        self.stop_runtime().await.map_err(|e| e.message)
    }
}
