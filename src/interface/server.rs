//! # Line-Protocol Server
//!
//! Newline-delimited JSON over TCP. Every connection gets one `Session` owned by one
//! task, so a session's turns and decisions are processed strictly one at a time.
//! The reader forwards events to that task, except `/cancel`, which it handles itself
//! so the model runtime can be stopped while a turn is still outstanding.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

use crate::application::router::CommandRouter;
use crate::application::state::Session;
use crate::domain::traits::ChatProvider;
use crate::domain::types::{ApprovalRecord, Mode, Outcome};
use crate::strings::messages;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    SwitchMode(Mode),
    Command(String),
    ChatMessage(ChatMessage),
    ApprovalResponse(ApprovalResponse),
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ChatMessage {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ApprovalResponse {
    pub approved: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    ModelInfo(ModelInfo),
    TermOutput(String),
    ChatResponse(String),
    ApprovalRequest { files: Vec<ApprovalRecord> },
    Outcome(Outcome),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub chat_model: String,
    pub agent_model: String,
}

/// `ChatProvider` that queues events for the connection's writer task.
#[derive(Clone)]
pub struct TcpService {
    session_id: String,
    events: mpsc::UnboundedSender<ServerEvent>,
}

impl TcpService {
    pub fn new(session_id: impl Into<String>, events: mpsc::UnboundedSender<ServerEvent>) -> Self {
        Self {
            session_id: session_id.into(),
            events,
        }
    }

    fn emit(&self, event: ServerEvent) -> Result<(), String> {
        self.events
            .send(event)
            .map_err(|_| format!("connection {} closed", self.session_id))
    }
}

#[async_trait]
impl ChatProvider for TcpService {
    async fn send_output(&self, content: &str) -> Result<(), String> {
        self.emit(ServerEvent::TermOutput(format!("{}\r\n", content.replace('\n', "\r\n"))))
    }

    async fn send_chat_response(&self, content: &str) -> Result<(), String> {
        self.emit(ServerEvent::ChatResponse(content.to_string()))
    }

    async fn send_outcome(&self, outcome: &Outcome) -> Result<(), String> {
        self.emit(ServerEvent::TermOutput(format!("{}\r\n", messages::outcome_line(outcome))))?;
        self.emit(ServerEvent::Outcome(outcome.clone()))
    }

    async fn request_approval(&self, records: &[ApprovalRecord]) -> Result<(), String> {
        self.emit(ServerEvent::ApprovalRequest {
            files: records.to_vec(),
        })
    }

    async fn clear_screen(&self) -> Result<(), String> {
        self.emit(ServerEvent::TermOutput("\x1b[2J\x1b[H".to_string()))
    }

    fn session_id(&self) -> String {
        self.session_id.clone()
    }
}

/// Binds `addr` and serves until the process exits.
pub async fn run(addr: &str, router: Arc<CommandRouter>, root: &Path) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    serve(listener, router, root.to_path_buf()).await
}

pub async fn serve(listener: TcpListener, router: Arc<CommandRouter>, root: PathBuf) -> Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        tracing::info!("Connection from {}", peer);
        let router = Arc::clone(&router);
        let root = root.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, router, root, format!("tcp-{}", peer)).await {
                tracing::error!("Connection {} ended with error: {:#}", peer, e);
            }
            tracing::info!("Connection {} closed", peer);
        });
    }
}

async fn handle_connection(
    stream: TcpStream,
    router: Arc<CommandRouter>,
    root: PathBuf,
    id: String,
) -> Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ServerEvent>();
    let chat = TcpService::new(id.clone(), event_tx);

    let writer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let mut line = serde_json::to_string(&event)?;
            line.push('\n');
            write_half.write_all(line.as_bytes()).await?;
        }
        anyhow::Ok(())
    });

    let model = &router.config().model;
    chat.emit(ServerEvent::ModelInfo(ModelInfo {
        chat_model: model.chat_model.clone(),
        agent_model: model.agent_model.clone(),
    }))
    .map_err(anyhow::Error::msg)?;

    let session = match Session::new(id.clone(), &root) {
        Ok(session) => session,
        Err(e) => {
            chat.send_output(&messages::command_error(&format!("{:#}", e)))
                .await
                .map_err(anyhow::Error::msg)?;
            return Err(e);
        }
    };

    let (client_tx, client_rx) = mpsc::unbounded_channel::<ClientEvent>();
    let worker = tokio::spawn(run_session(
        session,
        Arc::clone(&router),
        chat.clone(),
        client_rx,
    ));

    let mut lines = BufReader::new(read_half).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let Some(event) = decode_event(&chat, &line).await.map_err(anyhow::Error::msg)? else {
            continue;
        };

        if let ClientEvent::Command(cmd) = &event {
            if cmd.trim().eq_ignore_ascii_case("/cancel") {
                router.cancel(&chat).await?;
                continue;
            }
        }
        if client_tx.send(event).is_err() {
            break;
        }
    }

    drop(client_tx);
    worker.await.context("Session task panicked")?;
    drop(chat);
    writer.await.context("Writer task panicked")??;
    Ok(())
}

/// Parses one client line. A malformed line is answered with an error and yields `None`;
/// `Err` means the connection's writer is gone.
async fn decode_event(chat: &TcpService, line: &str) -> Result<Option<ClientEvent>, String> {
    match serde_json::from_str(line) {
        Ok(event) => Ok(Some(event)),
        Err(e) => {
            tracing::warn!("{}: bad event {:?}: {}", chat.session_id(), line, e);
            chat.send_output(&messages::command_error(&format!("Malformed event: {}", e)))
                .await?;
            Ok(None)
        }
    }
}

/// Owns the session. Processes one event to completion before taking the next.
async fn run_session(
    mut session: Session,
    router: Arc<CommandRouter>,
    chat: TcpService,
    mut events: mpsc::UnboundedReceiver<ClientEvent>,
) {
    while let Some(event) = events.recv().await {
        let result = match event {
            ClientEvent::SwitchMode(mode) => {
                router.switch_mode(&mut session, mode);
                Ok(())
            }
            ClientEvent::Command(line) => router.route(&mut session, &chat, &line).await,
            ClientEvent::ChatMessage(msg) => {
                router
                    .handle_chat_message(&chat, &msg.text, msg.image.as_deref())
                    .await
            }
            ClientEvent::ApprovalResponse(resp) => router
                .handle_decision(&mut session, &chat, resp.approved)
                .await
                .map(|_| ()),
        };

        if let Err(e) = result {
            tracing::warn!("Session {} stopped: {:#}", session.id(), e);
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::AppConfig;
    use crate::domain::traits::LlmProvider;
    use crate::domain::types::{GenerateRequest, OutcomeStatus};
    use crate::infrastructure::tools::executor::ToolExecutor;
    use crate::infrastructure::trash::TrashCan;
    use tempfile::TempDir;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt};

    struct FixedLlm(&'static str);

    #[async_trait]
    impl LlmProvider for FixedLlm {
        async fn generate(&self, _request: GenerateRequest) -> Result<String, String> {
            Ok(self.0.to_string())
        }
        async fn cancel(&self) -> Result<(), String> {
            Ok(())
        }
    }

    #[test]
    fn test_client_event_shapes() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"event":"switchMode","data":"agent"}"#).unwrap();
        assert_eq!(event, ClientEvent::SwitchMode(Mode::Agent));

        let event: ClientEvent =
            serde_json::from_str(r#"{"event":"chatMessage","data":{"text":"hi","image":null}}"#)
                .unwrap();
        assert_eq!(
            event,
            ClientEvent::ChatMessage(ChatMessage {
                text: "hi".to_string(),
                image: None
            })
        );

        let event: ClientEvent =
            serde_json::from_str(r#"{"event":"approvalResponse","data":{"approved":true}}"#)
                .unwrap();
        assert_eq!(event, ClientEvent::ApprovalResponse(ApprovalResponse { approved: true }));
    }

    #[test]
    fn test_server_event_shapes() {
        let event = ServerEvent::ApprovalRequest {
            files: vec![
                ApprovalRecord::Operation {
                    command: "/mkdir site".to_string(),
                },
                ApprovalRecord::File {
                    name: "a.txt".to_string(),
                    content: "a".to_string(),
                },
            ],
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "approvalRequest");
        assert_eq!(json["data"]["files"][0]["type"], "operation");
        assert_eq!(json["data"]["files"][1]["type"], "file");

        let info = ServerEvent::ModelInfo(ModelInfo {
            chat_model: "c".to_string(),
            agent_model: "a".to_string(),
        });
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["data"]["chatModel"], "c");
    }

    #[tokio::test]
    async fn test_malformed_line_is_answered() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let chat = TcpService::new("t", tx);

        assert_eq!(decode_event(&chat, "{not json").await, Ok(None));
        match rx.recv().await.unwrap() {
            ServerEvent::TermOutput(text) => assert!(text.contains("Malformed event")),
            other => panic!("unexpected event {other:?}"),
        }

        let event = decode_event(&chat, r#"{"event":"command","data":"/pwd"}"#).await;
        assert_eq!(event, Ok(Some(ClientEvent::Command("/pwd".to_string()))));
    }

    #[tokio::test]
    async fn test_malformed_line_after_writer_closed_stops_reader() {
        let (tx, rx) = mpsc::unbounded_channel();
        let chat = TcpService::new("t", tx);
        drop(rx);

        assert!(decode_event(&chat, "{not json").await.is_err());
    }

    #[tokio::test]
    async fn test_agent_round_trip_over_tcp() {
        let work = TempDir::new().unwrap();
        let trash = TempDir::new().unwrap();
        let tools = Arc::new(ToolExecutor::new(
            Vec::new(),
            Arc::new(TrashCan::freedesktop(trash.path())),
        ));
        let llm = Arc::new(FixedLlm("<<<FILE: calc.html>>>\n<html></html>\n<<<END>>>"));
        let router = Arc::new(CommandRouter::new(AppConfig::default(), llm, tools));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener, router, work.path().to_path_buf()));

        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, mut write_half) = stream.into_split();
        let mut lines = BufReader::new(read_half).lines();

        let first: serde_json::Value =
            serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        assert_eq!(first["event"], "modelInfo");

        for event in [
            r#"{"event":"switchMode","data":"agent"}"#,
            r#"{"event":"command","data":"make a calculator"}"#,
        ] {
            write_half.write_all(format!("{}\n", event).as_bytes()).await.unwrap();
        }

        loop {
            let value: serde_json::Value =
                serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
            if value["event"] == "approvalRequest" {
                assert_eq!(value["data"]["files"][0]["name"], "calc.html");
                break;
            }
        }

        write_half
            .write_all(b"{\"event\":\"approvalResponse\",\"data\":{\"approved\":true}}\n")
            .await
            .unwrap();

        loop {
            let value: serde_json::Value =
                serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
            if value["event"] == "outcome" {
                let outcome: Outcome = serde_json::from_value(value["data"].clone()).unwrap();
                assert_eq!(outcome.status, OutcomeStatus::Success);
                break;
            }
        }

        let written = std::fs::read_to_string(work.path().join("calc.html")).unwrap();
        assert_eq!(written, "<html></html>");
    }
}
