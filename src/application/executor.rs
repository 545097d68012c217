//! # Action Executor
//!
//! Runs an approved batch against a session, one action at a time. Each action is
//! isolated: a failure becomes an outcome record and the batch moves on.

use crate::application::operations::FsOperation;
use crate::application::state::Session;
use crate::domain::traits::ChatProvider;
use crate::domain::types::{ActionBatch, AgentAction, ExecutionReport, Outcome, OutcomeStatus};
use crate::infrastructure::tools::executor::SharedToolExecutor;
use crate::strings::messages;

pub struct ActionExecutor {
    tools: SharedToolExecutor,
}

impl ActionExecutor {
    pub fn new(tools: SharedToolExecutor) -> Self {
        Self { tools }
    }

    /// Executes `batch` in order, streaming each outcome to `chat` as it completes.
    /// Only successful actions count towards the report totals.
    pub async fn run(
        &self,
        batch: ActionBatch,
        session: &mut Session,
        chat: &dyn ChatProvider,
    ) -> ExecutionReport {
        let mut report = ExecutionReport::default();
        tracing::info!(
            "Session {}: executing {} approved action(s)",
            session.id(),
            batch.len()
        );

        for (index, action) in batch.actions.iter().enumerate() {
            let (status, message) = self.execute(action, session).await;
            match (status, action) {
                (OutcomeStatus::Success, AgentAction::FileWrite { .. }) => report.files_written += 1,
                (OutcomeStatus::Success, AgentAction::Operation { .. }) => report.operations_run += 1,
                _ => {}
            }

            let outcome = Outcome {
                index,
                action: action.label().to_string(),
                status,
                message,
            };
            if let Err(e) = chat.send_outcome(&outcome).await {
                tracing::warn!("Failed to deliver outcome {}: {}", index, e);
            }
            report.outcomes.push(outcome);
        }

        tracing::info!(
            "Session {}: batch done ({} file(s), {} operation(s))",
            session.id(),
            report.files_written,
            report.operations_run
        );
        report
    }

    async fn execute(&self, action: &AgentAction, session: &mut Session) -> (OutcomeStatus, String) {
        match action {
            AgentAction::FileWrite { name, content } => {
                let result = match session.resolve(name) {
                    Ok(path) => self.tools.write_file(&path, content).await,
                    Err(e) => Err(e.into()),
                };
                match result {
                    Ok(()) => (OutcomeStatus::Success, messages::file_saved(name)),
                    Err(e) => {
                        tracing::warn!("Write of {} failed: {:#}", name, e);
                        (OutcomeStatus::Failed, format!("{:#}", e))
                    }
                }
            }
            AgentAction::Operation { command, verb, args } => {
                match FsOperation::parse(verb, args) {
                    None => (OutcomeStatus::Warning, messages::unknown_operation(command)),
                    Some(Err(usage)) => (OutcomeStatus::Failed, format!("Usage: {}", usage)),
                    Some(Ok(op)) => match op.apply(session, &self.tools).await {
                        Ok(detail) => (
                            OutcomeStatus::Success,
                            messages::operation_executed(command, &detail),
                        ),
                        Err(e) => {
                            tracing::warn!("Operation '{}' failed: {:#}", command, e);
                            (OutcomeStatus::Failed, format!("{:#}", e))
                        }
                    },
                }
            }
        }
    }
}
