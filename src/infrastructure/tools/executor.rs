//! # Tool Executor
//!
//! Filesystem operations used by approved actions and slash commands.
//! Paths handed in here are already resolved and contained by the session;
//! this layer only performs the I/O and attaches context to failures.

use anyhow::{Context as AnyhowContext, Result, bail};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::traits::SoftDelete;

/// One directory entry as shown by `/ls`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Configuration for the ToolExecutor
#[derive(Debug, Clone, Default)]
pub struct ToolConfig {
    /// Directory names `tree` does not descend into.
    pub tree_exclude: Vec<String>,
}

/// Executes filesystem tools.
pub struct ToolExecutor {
    config: ToolConfig,
    trash: Arc<dyn SoftDelete>,
}

impl ToolExecutor {
    pub fn new(tree_exclude: Vec<String>, trash: Arc<dyn SoftDelete>) -> Self {
        Self {
            config: ToolConfig { tree_exclude },
            trash,
        }
    }

    /// Writes `content`, creating missing parent directories.
    pub async fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        tokio::fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    pub async fn read_file(&self, path: &Path) -> Result<String> {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))
    }

    /// Creates a directory and any missing parents. Existing directories are fine.
    pub async fn create_dir(&self, path: &Path) -> Result<()> {
        tokio::fs::create_dir_all(path)
            .await
            .with_context(|| format!("Failed to create directory {}", path.display()))
    }

    /// Creates an empty file, truncating an existing one.
    pub async fn touch(&self, path: &Path) -> Result<()> {
        tokio::fs::write(path, "")
            .await
            .with_context(|| format!("Failed to create {}", path.display()))
    }

    /// Copies a file. A directory destination receives the file under its own name.
    pub async fn copy_file(&self, from: &Path, to: &Path) -> Result<PathBuf> {
        let target = Self::into_dir(from, to).await;
        tokio::fs::copy(from, &target).await.with_context(|| {
            format!("Failed to copy {} to {}", from.display(), target.display())
        })?;
        Ok(target)
    }

    /// Moves or renames. A directory destination receives the entry under its own name.
    pub async fn move_path(&self, from: &Path, to: &Path) -> Result<PathBuf> {
        let target = Self::into_dir(from, to).await;
        tokio::fs::rename(from, &target).await.with_context(|| {
            format!("Failed to move {} to {}", from.display(), target.display())
        })?;
        Ok(target)
    }

    async fn into_dir(from: &Path, to: &Path) -> PathBuf {
        let to_is_dir = tokio::fs::metadata(to)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        match (to_is_dir, from.file_name()) {
            (true, Some(name)) => to.join(name),
            _ => to.to_path_buf(),
        }
    }

    /// Moves a file to the trash.
    pub async fn soft_delete_file(&self, path: &Path) -> Result<PathBuf> {
        if !self.is_file(path).await {
            bail!("Not a file: {}", path.display());
        }
        self.soft_delete(path).await
    }

    /// Moves a directory, with its contents, to the trash.
    pub async fn soft_delete_dir(&self, path: &Path) -> Result<PathBuf> {
        if !self.is_dir(path).await {
            bail!("Not a directory: {}", path.display());
        }
        self.soft_delete(path).await
    }

    async fn soft_delete(&self, path: &Path) -> Result<PathBuf> {
        let trash = Arc::clone(&self.trash);
        let owned = path.to_path_buf();
        let slot = tokio::task::spawn_blocking(move || trash.soft_delete(&owned))
            .await
            .context("Trash task panicked")??;
        Ok(slot)
    }

    pub async fn is_dir(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    pub async fn is_file(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    /// Entries of `path`, sorted by name.
    pub async fn list_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let mut entries = tokio::fs::read_dir(path)
            .await
            .with_context(|| format!("Failed to read directory {}", path.display()))?;
        let mut listing = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            let is_dir = entry.file_type().await?.is_dir();
            listing.push(DirEntry { name, is_dir });
        }
        listing.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listing)
    }

    /// Entries of `path` whose name contains `pattern`, ignoring case.
    pub async fn find(&self, path: &Path, pattern: &str) -> Result<Vec<DirEntry>> {
        let needle = pattern.to_lowercase();
        Ok(self
            .list_dir(path)
            .await?
            .into_iter()
            .filter(|e| e.name.to_lowercase().contains(&needle))
            .collect())
    }

    /// Branch-drawn listing of everything below `path`. Excluded directories are not entered.
    pub async fn tree(&self, path: &Path) -> Result<Vec<String>> {
        let root = path.to_path_buf();
        let exclude: HashSet<String> = self.config.tree_exclude.iter().cloned().collect();
        tokio::task::spawn_blocking(move || -> Result<Vec<String>> {
            let mut lines = Vec::new();
            let mut ancestors = Vec::new();
            walk(&root, "", &exclude, &mut ancestors, &mut lines)?;
            Ok(lines)
        })
        .await
        .context("Tree task panicked")?
    }
}

fn walk(
    dir: &Path,
    prefix: &str,
    exclude: &HashSet<String>,
    ancestors: &mut Vec<PathBuf>,
    lines: &mut Vec<String>,
) -> Result<()> {
    let canonical = std::fs::canonicalize(dir)
        .with_context(|| format!("Failed to resolve {}", dir.display()))?;
    // Symlink loop.
    if ancestors.contains(&canonical) {
        return Ok(());
    }
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
        .filter_map(|e| e.ok())
        .collect();
    entries.sort_by_key(|e| e.file_name());
    ancestors.push(canonical);

    let count = entries.len();
    for (i, entry) in entries.into_iter().enumerate() {
        let last = i + 1 == count;
        let name = entry.file_name().to_string_lossy().to_string();
        let path = entry.path();
        let branch = if last { "└── " } else { "├── " };

        if path.is_dir() {
            lines.push(format!("{}{}📁 {}", prefix, branch, name));
            // Excluded directories are listed but not entered.
            if !exclude.contains(&name) {
                let child = format!("{}{}", prefix, if last { "    " } else { "│   " });
                // An unreadable subdirectory stays a leaf.
                if let Err(e) = walk(&path, &child, exclude, ancestors, lines) {
                    tracing::warn!("Skipping {} in tree: {:#}", path.display(), e);
                }
            }
        } else {
            lines.push(format!("{}{}📄 {}", prefix, branch, name));
        }
    }

    ancestors.pop();
    Ok(())
}

pub type SharedToolExecutor = Arc<ToolExecutor>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::trash::TrashCan;
    use tempfile::TempDir;

    fn setup() -> (TempDir, TempDir, ToolExecutor) {
        let work = TempDir::new().unwrap();
        let trash = TempDir::new().unwrap();
        let tools = ToolExecutor::new(
            vec!["node_modules".to_string()],
            Arc::new(TrashCan::freedesktop(trash.path())),
        );
        (work, trash, tools)
    }

    #[tokio::test]
    async fn test_write_creates_parents() {
        let (work, _trash, tools) = setup();
        let target = work.path().join("a/b/c.txt");
        tools.write_file(&target, "hello").await.unwrap();
        assert_eq!(tools.read_file(&target).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_copy_into_directory_keeps_name() {
        let (work, _trash, tools) = setup();
        let src = work.path().join("a.txt");
        std::fs::write(&src, "x").unwrap();
        std::fs::create_dir(work.path().join("dest")).unwrap();

        let target = tools.copy_file(&src, &work.path().join("dest")).await.unwrap();
        assert_eq!(target, work.path().join("dest/a.txt"));
        assert!(src.exists());
    }

    #[tokio::test]
    async fn test_move_renames() {
        let (work, _trash, tools) = setup();
        let src = work.path().join("a.txt");
        std::fs::write(&src, "x").unwrap();

        tools.move_path(&src, &work.path().join("b.txt")).await.unwrap();
        assert!(!src.exists());
        assert!(work.path().join("b.txt").is_file());
    }

    #[tokio::test]
    async fn test_soft_delete_checks_kind() {
        let (work, trash, tools) = setup();
        let dir = work.path().join("d");
        std::fs::create_dir(&dir).unwrap();

        assert!(tools.soft_delete_file(&dir).await.is_err());
        assert!(dir.exists());

        tools.soft_delete_dir(&dir).await.unwrap();
        assert!(!dir.exists());
        assert!(trash.path().join("files/d").is_dir());
    }

    #[tokio::test]
    async fn test_list_and_find_are_sorted() {
        let (work, _trash, tools) = setup();
        std::fs::write(work.path().join("b.TXT"), "").unwrap();
        std::fs::write(work.path().join("a.txt"), "").unwrap();
        std::fs::create_dir(work.path().join("css")).unwrap();

        let names: Vec<_> = tools
            .list_dir(work.path())
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["a.txt", "b.TXT", "css"]);

        let found = tools.find(work.path(), "txt").await.unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_tree_does_not_enter_excluded() {
        let (work, _trash, tools) = setup();
        std::fs::create_dir_all(work.path().join("node_modules/pkg")).unwrap();
        std::fs::create_dir_all(work.path().join("src")).unwrap();
        std::fs::write(work.path().join("src/main.js"), "").unwrap();

        let lines = tools.tree(work.path()).await.unwrap();
        assert_eq!(
            lines,
            vec![
                "├── 📁 node_modules".to_string(),
                "└── 📁 src".to_string(),
                "    └── 📄 main.js".to_string(),
            ]
        );
    }

    #[cfg(unix)]
    #[cfg(unix)]
    #[tokio::test]
    async fn test_tree_keeps_going_past_unreadable_dir() {
        use std::os::unix::fs::PermissionsExt;

        let (work, _trash, tools) = setup();
        let locked = work.path().join("locked");
        std::fs::create_dir_all(locked.join("inner")).unwrap();
        std::fs::write(work.path().join("z.txt"), "").unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();
        // Privileged users read through the mode bits.
        let readable = std::fs::read_dir(&locked).is_ok();

        let lines = tools.tree(work.path()).await;
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
        let lines = lines.unwrap();

        assert!(lines.iter().any(|l| l.ends_with("📁 locked")));
        assert!(lines.iter().any(|l| l.ends_with("📄 z.txt")));
        if !readable {
            assert!(!lines.iter().any(|l| l.contains("inner")));
        }
    }

    #[tokio::test]
    async fn test_tree_survives_symlink_cycle() {
        let (work, _trash, tools) = setup();
        std::fs::create_dir_all(work.path().join("a")).unwrap();
        std::os::unix::fs::symlink(work.path(), work.path().join("a/loop")).unwrap();

        let lines = tools.tree(work.path()).await.unwrap();
        assert_eq!(
            lines,
            vec!["└── 📁 a".to_string(), "    └── 📁 loop".to_string()]
        );
    }
}
