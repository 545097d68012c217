//! # Session State
//!
//! Per-connection state: conversation mode, working directory and the pending batch.
//! A `Session` is owned by exactly one task and passed by `&mut` into every operation,
//! which serializes all mutation of it.

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

use crate::application::approval::PendingActionQueue;
use crate::domain::errors::PathError;
use crate::domain::paths;
use crate::domain::types::Mode;

#[derive(Debug)]
pub struct Session {
    id: String,
    pub mode: Mode,
    root: PathBuf,
    working_directory: PathBuf,
    pub pending: PendingActionQueue,
}

impl Session {
    /// Opens a session rooted at `root`, which must be an existing directory.
    pub fn new(id: impl Into<String>, root: &Path) -> Result<Self> {
        let root = root
            .canonicalize()
            .with_context(|| format!("Workspace root {} is not accessible", root.display()))?;
        if !root.is_dir() {
            bail!("Workspace root {} is not a directory", root.display());
        }

        let id = id.into();
        tracing::info!("Session {} opened at {}", id, root.display());
        Ok(Self {
            id,
            mode: Mode::default(),
            working_directory: root.clone(),
            root,
            pending: PendingActionQueue::new(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    /// Moves the cursor. Callers check that `dir` exists; containment is enforced here.
    pub fn set_working_directory(&mut self, dir: PathBuf) -> Result<(), PathError> {
        if !dir.starts_with(&self.root) {
            return Err(PathError::OutsideRoot(dir.display().to_string()));
        }
        tracing::debug!("Session {} cwd -> {}", self.id, dir.display());
        self.working_directory = dir;
        Ok(())
    }

    /// Resolves `raw` against the working directory, contained by the root.
    pub fn resolve(&self, raw: &str) -> Result<PathBuf, PathError> {
        paths::resolve(&self.root, &self.working_directory, raw)
    }

    /// Parent of the working directory, never above the root.
    pub fn parent_directory(&self) -> PathBuf {
        paths::parent_within(&self.root, &self.working_directory)
    }

    /// Working directory as the operator sees it (`/` is the root).
    pub fn display_cwd(&self) -> String {
        paths::display_relative(&self.root, &self.working_directory)
    }

    pub fn display_path(&self, path: &Path) -> String {
        paths::display_relative(&self.root, path)
    }
}
