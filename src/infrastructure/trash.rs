//! # Trash
//!
//! `SoftDelete` implementations. Content is moved into a trash directory laid out like the
//! freedesktop.org trash (`files/` plus `info/<name>.trashinfo`) so desktop file managers
//! can restore it. macOS gets `~/.Trash` without info files. Other platforms have no
//! default and must configure `workspace.trash_dir`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::domain::errors::SoftDeleteError;
use crate::domain::traits::SoftDelete;

/// Moves paths into a trash directory.
#[derive(Debug, Clone)]
pub struct TrashCan {
    files_dir: PathBuf,
    info_dir: Option<PathBuf>,
}

impl TrashCan {
    /// Freedesktop layout rooted at `dir`.
    pub fn freedesktop(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            files_dir: dir.join("files"),
            info_dir: Some(dir.join("info")),
        }
    }

    /// Flat directory without restore metadata.
    pub fn flat(dir: impl Into<PathBuf>) -> Self {
        Self {
            files_dir: dir.into(),
            info_dir: None,
        }
    }

    /// First free name in the trash for `name`: `name`, `name.1`, `name.2`, ...
    fn free_slot(&self, name: &str) -> PathBuf {
        let mut candidate = self.files_dir.join(name);
        let mut n = 1;
        while candidate.symlink_metadata().is_ok() || self.info_path(&candidate).exists() {
            candidate = self.files_dir.join(format!("{}.{}", name, n));
            n += 1;
        }
        candidate
    }

    fn info_path(&self, slot: &Path) -> PathBuf {
        match (&self.info_dir, slot.file_name()) {
            (Some(info), Some(name)) => {
                info.join(format!("{}.trashinfo", name.to_string_lossy()))
            }
            _ => PathBuf::new(),
        }
    }

    fn write_info(&self, slot: &Path, original: &Path) -> io::Result<()> {
        let Some(info_dir) = &self.info_dir else {
            return Ok(());
        };
        fs::create_dir_all(info_dir)?;
        let deleted_at = chrono::Local::now().format("%Y-%m-%dT%H:%M:%S");
        let content = format!(
            "[Trash Info]\nPath={}\nDeletionDate={}\n",
            original.display(),
            deleted_at
        );
        fs::write(self.info_path(slot), content)
    }
}

impl TrashCan {
    /// Reserves a slot, records restore info, then hands the move to `relocate`.
    /// A failed move leaves neither an info file nor partial content behind.
    fn store_with(
        &self,
        path: &Path,
        relocate: impl FnOnce(&Path, &Path) -> io::Result<()>,
    ) -> Result<PathBuf, SoftDeleteError> {
        let io_err = |source| SoftDeleteError::Io {
            path: path.to_path_buf(),
            source,
        };

        if path.symlink_metadata().is_err() {
            return Err(SoftDeleteError::NotFound(path.to_path_buf()));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| SoftDeleteError::NotFound(path.to_path_buf()))?;
        if self.files_dir.starts_with(path) {
            return Err(io_err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "the trash lives inside this path",
            )));
        }

        fs::create_dir_all(&self.files_dir).map_err(io_err)?;
        let slot = self.free_slot(&name);
        self.write_info(&slot, path).map_err(io_err)?;

        if let Err(e) = relocate(path, &slot) {
            let _ = fs::remove_file(self.info_path(&slot));
            if slot.symlink_metadata().is_ok() {
                let _ = remove_path(&slot);
            }
            return Err(io_err(e));
        }

        tracing::info!("Moved {} to trash at {}", path.display(), slot.display());
        Ok(slot)
    }
}

impl SoftDelete for TrashCan {
    fn soft_delete(&self, path: &Path) -> Result<PathBuf, SoftDeleteError> {
        self.store_with(path, relocate)
    }
}

/// Renames into the trash, falling back to copy then remove across filesystems.
fn relocate(from: &Path, to: &Path) -> io::Result<()> {
    if let Err(e) = fs::rename(from, to) {
        tracing::debug!("rename into trash failed ({}), copying instead", e);
        copy_recursive(from, to)?;
        remove_path(from)?;
    }
    Ok(())
}

/// Used when no trash location exists for the platform.
#[derive(Debug, Clone, Copy)]
pub struct Unsupported;

impl SoftDelete for Unsupported {
    fn soft_delete(&self, _path: &Path) -> Result<PathBuf, SoftDeleteError> {
        Err(SoftDeleteError::Unsupported)
    }
}

/// Picks the trash for this platform, or `override_dir` when configured.
pub fn platform_trash(override_dir: Option<&Path>) -> Box<dyn SoftDelete> {
    if let Some(dir) = override_dir {
        return Box::new(TrashCan::freedesktop(dir));
    }

    if cfg!(target_os = "macos") {
        if let Some(home) = dirs::home_dir() {
            return Box::new(TrashCan::flat(home.join(".Trash")));
        }
    } else if cfg!(all(unix, not(target_os = "macos"))) {
        if let Some(data) = dirs::data_local_dir() {
            return Box::new(TrashCan::freedesktop(data.join("Trash")));
        }
    }

    tracing::warn!("No trash location for this platform; /rm and /rmdir will fail");
    Box::new(Unsupported)
}

fn copy_recursive(from: &Path, to: &Path) -> io::Result<()> {
    let meta = fs::symlink_metadata(from)?;
    if meta.is_dir() {
        fs::create_dir_all(to)?;
        for entry in fs::read_dir(from)? {
            let entry = entry?;
            copy_recursive(&entry.path(), &to.join(entry.file_name()))?;
        }
        Ok(())
    } else {
        fs::copy(from, to).map(|_| ())
    }
}

fn remove_path(path: &Path) -> io::Result<()> {
    if fs::symlink_metadata(path)?.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}
