//! # Approval Gate
//!
//! Holds at most one unapproved batch per session. `Empty -> Staged -> Empty`;
//! every resolution clears the slot.

use crate::domain::errors::StateError;
use crate::domain::types::{ActionBatch, Decision};

/// What a decision did to the queue.
#[derive(Debug, PartialEq)]
pub enum Resolution {
    /// Nothing was staged; the decision is stale.
    Idle,
    Approved(ActionBatch),
    Rejected(ActionBatch),
}

#[derive(Debug, Default)]
pub struct PendingActionQueue {
    pending: Option<ActionBatch>,
}

impl PendingActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages `batch`, reordered so every operation runs before any file write.
    /// Relative order within each kind is kept.
    pub fn stage(&mut self, batch: ActionBatch) -> Result<&ActionBatch, StateError> {
        if let Some(existing) = &self.pending {
            return Err(StateError::AlreadyPending {
                staged: existing.len(),
            });
        }
        if batch.is_empty() {
            return Err(StateError::EmptyBatch);
        }

        let (mut ordered, files): (Vec<_>, Vec<_>) =
            batch.actions.into_iter().partition(|a| a.is_operation());
        ordered.extend(files);

        tracing::info!("Staged {} action(s) for approval", ordered.len());
        Ok(self.pending.insert(ActionBatch::new(ordered)))
    }

    pub fn resolve(&mut self, decision: Decision) -> Resolution {
        match (self.pending.take(), decision) {
            (None, _) => Resolution::Idle,
            (Some(batch), Decision::Approve) => Resolution::Approved(batch),
            (Some(batch), Decision::Reject) => Resolution::Rejected(batch),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn peek(&self) -> Option<&ActionBatch> {
        self.pending.as_ref()
    }
}
