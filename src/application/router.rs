//! # Command Router
//!
//! Routes one line of operator input: `/cancel` and `/mode` are handled here, other
//! slash commands go to `interface/commands`, and everything else is a model turn.
//! Also resolves approval decisions and serves the separate chat channel.

use anyhow::Result;
use std::sync::Arc;

use crate::application::approval::Resolution;
use crate::application::executor::ActionExecutor;
use crate::application::parsing::{extract_reasoning, parse_actions};
use crate::application::state::Session;
use crate::domain::config::AppConfig;
use crate::domain::errors::StateError;
use crate::domain::traits::{ChatProvider, LlmProvider};
use crate::domain::types::{Decision, ExecutionReport, GenerateRequest, Mode};
use crate::infrastructure::tools::executor::SharedToolExecutor;
use crate::interface::commands;
use crate::strings::{messages, prompts};

pub struct CommandRouter {
    config: AppConfig,
    llm: Arc<dyn LlmProvider>,
    tools: SharedToolExecutor,
    executor: ActionExecutor,
}

impl CommandRouter {
    pub fn new(config: AppConfig, llm: Arc<dyn LlmProvider>, tools: SharedToolExecutor) -> Self {
        Self {
            config,
            llm,
            executor: ActionExecutor::new(Arc::clone(&tools)),
            tools,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub async fn route(&self, session: &mut Session, chat: &dyn ChatProvider, message: &str) -> Result<()> {
        let msg = message.trim();
        if msg.is_empty() {
            return Ok(());
        }

        let (cmd_preview, args_preview) = match msg.split_once(char::is_whitespace) {
            Some((cmd, args)) => (cmd, args.trim()),
            None => (msg, ""),
        };
        tracing::info!(
            "Router dispatching cmd='{}' args='{}' session='{}'",
            cmd_preview,
            args_preview,
            session.id()
        );

        match cmd_preview.to_lowercase().as_str() {
            "/cancel" => self.cancel(chat).await,
            "/mode" => match args_preview.parse::<Mode>() {
                Ok(mode) => {
                    self.switch_mode(session, mode);
                    send(chat, &messages::mode_switched(mode.as_str())).await
                }
                Err(_) => send(chat, &messages::usage(messages::MODE_USAGE)).await,
            },
            _ if msg.starts_with('/') => {
                commands::dispatch(session, &self.tools, chat, msg).await
            }
            _ => self.model_turn(session, chat, msg).await,
        }
    }

    pub fn switch_mode(&self, session: &mut Session, mode: Mode) {
        tracing::info!("Session {} switched to {} mode", session.id(), mode.as_str());
        session.mode = mode;
    }

    /// Asks the model runtime to stop. Leaves any staged batch alone.
    pub async fn cancel(&self, chat: &dyn ChatProvider) -> Result<()> {
        cancel_runtime(self.llm.as_ref(), chat).await
    }

    /// One model turn. In agent mode, directives in the reply are staged for approval.
    async fn model_turn(&self, session: &mut Session, chat: &dyn ChatProvider, input: &str) -> Result<()> {
        let model = match session.mode {
            Mode::Chat => &self.config.model.chat_model,
            Mode::Agent => &self.config.model.agent_model,
        };

        send(chat, &messages::thinking()).await?;
        let request = GenerateRequest {
            model: model.clone(),
            prompt: prompts::compose(prompts::system_prompt(session.mode), input),
            images: Vec::new(),
            stop: self.config.model.stop.clone(),
        };

        let reply = match self.llm.generate(request).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!("Model call failed: {}", e);
                return send(chat, &messages::model_unreachable(&e)).await;
            }
        };

        let (reasoning, answer) = extract_reasoning(&reply);
        for section in reasoning.iter().filter(|s| !s.is_empty()) {
            send(chat, &messages::reasoning_block(section)).await?;
        }

        if session.mode == Mode::Chat {
            return send(chat, answer.trim()).await;
        }

        let parsed = parse_actions(&answer);
        let prose = parsed.cleaned_text.trim();
        if !prose.is_empty() {
            send(chat, prose).await?;
        }
        if parsed.batch.is_empty() {
            return Ok(());
        }

        match session.pending.stage(parsed.batch) {
            Ok(staged) => {
                let records = staged.records();
                send(chat, &messages::actions_detected(records.len())).await?;
                chat.request_approval(&records)
                    .await
                    .map_err(|e| anyhow::anyhow!(e))
            }
            Err(e) => {
                tracing::warn!("Session {}: {}", session.id(), e);
                send(chat, &messages::state_warning(&e)).await
            }
        }
    }

    /// Applies the operator's decision to the staged batch.
    pub async fn handle_decision(
        &self,
        session: &mut Session,
        chat: &dyn ChatProvider,
        approved: bool,
    ) -> Result<ExecutionReport> {
        match session.pending.resolve(Decision::from(approved)) {
            Resolution::Idle => {
                tracing::warn!("Session {}: decision with nothing staged", session.id());
                send(chat, &messages::state_warning(&StateError::NothingPending)).await?;
                Ok(ExecutionReport::default())
            }
            Resolution::Rejected(batch) => {
                tracing::info!("Session {}: rejected {} action(s)", session.id(), batch.len());
                send(chat, &messages::batch_rejected()).await?;
                Ok(ExecutionReport::default())
            }
            Resolution::Approved(batch) => {
                let report = self.executor.run(batch, session, chat).await;
                send(chat, &messages::batch_summary(&report)).await?;
                Ok(report)
            }
        }
    }

    /// Chat channel: always the chat model, optionally with one image.
    pub async fn handle_chat_message(
        &self,
        chat: &dyn ChatProvider,
        text: &str,
        image: Option<&str>,
    ) -> Result<()> {
        let request = match image {
            Some(raw) => {
                let Some(payload) = image_payload(raw) else {
                    return chat
                        .send_chat_response(&messages::image_request_failed(messages::IMAGE_PAYLOAD_EMPTY))
                        .await
                        .map_err(|e| anyhow::anyhow!(e));
                };
                let prompt = if text.trim().is_empty() {
                    prompts::DEFAULT_IMAGE_PROMPT.to_string()
                } else {
                    text.to_string()
                };
                GenerateRequest {
                    model: self.config.model.chat_model.clone(),
                    prompt,
                    images: vec![payload.to_string()],
                    stop: Vec::new(),
                }
            }
            None => GenerateRequest {
                model: self.config.model.chat_model.clone(),
                prompt: prompts::compose(prompts::CHAT_PROMPT, text),
                images: Vec::new(),
                stop: self.config.model.stop.clone(),
            },
        };

        let has_image = !request.images.is_empty();
        let response = match self.llm.generate(request).await {
            Ok(reply) => {
                let (_, answer) = extract_reasoning(&reply);
                answer.trim().to_string()
            }
            Err(e) if has_image => {
                tracing::error!("Image request failed: {}", e);
                messages::image_request_failed(&e)
            }
            Err(e) => {
                tracing::error!("Chat request failed: {}", e);
                messages::chat_error(&e)
            }
        };
        chat.send_chat_response(&response)
            .await
            .map_err(|e| anyhow::anyhow!(e))
    }
}

async fn cancel_runtime(llm: &dyn LlmProvider, chat: &dyn ChatProvider) -> Result<()> {
    let text = match llm.cancel().await {
        Ok(()) => messages::cancelled_runtime(),
        Err(e) => {
            tracing::warn!("Cancel failed: {}", e);
            messages::cancel_failed(&e)
        }
    };
    send(chat, &text).await
}

/// Base64 payload of an image given either bare or as a data URL.
pub fn image_payload(raw: &str) -> Option<&str> {
    let payload = match raw.split_once(',') {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => raw,
    };
    let payload = payload.trim();
    (!payload.is_empty()).then_some(payload)
}

async fn send(chat: &dyn ChatProvider, text: &str) -> Result<()> {
    chat.send_output(text).await.map_err(|e| anyhow::anyhow!(e))
}
