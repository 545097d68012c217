//! # Workspace Paths
//!
//! Resolves user or model supplied paths against a session's working directory.
//! The workspace root acts as a floor: `..` never climbs above it, absolute paths
//! must already point inside it, and symlinks that lead out of it are rejected.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use crate::domain::errors::PathError;

/// Resolves `raw` relative to `cwd`. Both `root` and `cwd` are expected to be canonical,
/// with `cwd` inside `root`. The target does not have to exist.
pub fn resolve(root: &Path, cwd: &Path, raw: &str) -> Result<PathBuf, PathError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(PathError::Empty);
    }

    let target = Path::new(raw);
    let (mut parts, rest) = if target.is_absolute() {
        match target.strip_prefix(root) {
            Ok(rest) => (Vec::new(), rest),
            Err(_) => return Err(PathError::OutsideRoot(raw.to_string())),
        }
    } else {
        let rel = cwd
            .strip_prefix(root)
            .map_err(|_| PathError::OutsideRoot(cwd.display().to_string()))?;
        (normal_parts(rel), target)
    };

    for component in rest.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_os_string()),
            Component::ParentDir => {
                parts.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    let mut resolved = root.to_path_buf();
    resolved.extend(parts);
    ensure_contained(root, &resolved, raw)?;
    Ok(resolved)
}

/// Parent of `cwd`, floored at `root`.
pub fn parent_within(root: &Path, cwd: &Path) -> PathBuf {
    if cwd == root || !cwd.starts_with(root) {
        return root.to_path_buf();
    }
    cwd.parent()
        .filter(|p| p.starts_with(root))
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf())
}

/// `path` shown relative to `root`, with the root itself rendered as `/`.
pub fn display_relative(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => "/".to_string(),
        Ok(rel) => format!("/{}", rel.display()),
        Err(_) => path.display().to_string(),
    }
}

fn normal_parts(path: &Path) -> Vec<OsString> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_os_string()),
            _ => None,
        })
        .collect()
}

/// Canonicalizes the nearest existing ancestor so symlinks cannot lead out of `root`.
fn ensure_contained(root: &Path, path: &Path, raw: &str) -> Result<(), PathError> {
    let mut current = path;
    loop {
        match std::fs::canonicalize(current) {
            Ok(canonical) => {
                return if canonical.starts_with(root) {
                    Ok(())
                } else {
                    tracing::warn!(
                        "Path '{}' resolves outside workspace ({})",
                        raw,
                        canonical.display()
                    );
                    Err(PathError::OutsideRoot(raw.to_string()))
                };
            }
            Err(_) => match current.parent() {
                Some(parent) => current = parent,
                None => return Err(PathError::Unresolvable(raw.to_string())),
            },
        }
    }
}
