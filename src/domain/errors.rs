//! # Domain Errors
//!
//! Error taxonomy for session state, path resolution and soft-delete.
//! Per-action I/O failures are not listed here: they travel as `anyhow` errors
//! and end up in the outcome stream.

use std::path::PathBuf;
use thiserror::Error;

/// Misuse of the approval gate. Reported to the operator as a warning.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("a batch of {staged} action(s) is already awaiting approval")]
    AlreadyPending { staged: usize },
    #[error("no actions are awaiting approval")]
    NothingPending,
    #[error("refusing to stage an empty batch")]
    EmptyBatch,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("no path given")]
    Empty,
    #[error("path '{0}' is outside the workspace root")]
    OutsideRoot(String),
    #[error("cannot resolve path '{0}'")]
    Unresolvable(String),
}

#[derive(Debug, Error)]
pub enum SoftDeleteError {
    #[error("not found: {0}")]
    NotFound(PathBuf),
    #[error("soft-delete is not supported on this platform (set workspace.trash_dir)")]
    Unsupported,
    #[error("failed to move {path} to trash: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
