//! # Filesystem Operations
//!
//! The mutating verb set shared by model-proposed operations and user slash commands.
//! Parsing turns `verb + args` into an `FsOperation`; `apply` runs it against a session.

use anyhow::{Result, bail};

use crate::application::state::Session;
use crate::infrastructure::tools::executor::ToolExecutor;
use crate::strings::messages;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsOperation {
    ChangeDir(String),
    MakeDir(String),
    Touch(String),
    Remove(String),
    RemoveDir(String),
    Copy { from: String, to: String },
    Move { from: String, to: String },
}

impl FsOperation {
    /// `None` when `verb` is not a mutating verb. `Some(Err(usage))` when the
    /// arguments do not fit it.
    pub fn parse(verb: &str, args: &[String]) -> Option<Result<Self, &'static str>> {
        let verb = verb.strip_prefix('/').unwrap_or(verb);
        // Single-path verbs take the rest of the line so names may contain spaces.
        let joined = args.join(" ");
        let single = |usage: &'static str, build: fn(String) -> Self| {
            if joined.trim().is_empty() {
                Err(usage)
            } else {
                Ok(build(joined.trim().to_string()))
            }
        };
        let pair = |usage: &'static str, build: fn(String, String) -> Self| match args {
            [from, to] => Ok(build(from.clone(), to.clone())),
            _ => Err(usage),
        };

        let op = match verb {
            "cd" => single(messages::CD_USAGE, Self::ChangeDir),
            "mkdir" => single(messages::MKDIR_USAGE, Self::MakeDir),
            "touch" => single(messages::TOUCH_USAGE, Self::Touch),
            "rm" | "del" => single(messages::RM_USAGE, Self::Remove),
            "rmdir" => single(messages::RMDIR_USAGE, Self::RemoveDir),
            "cp" | "copy" => pair(messages::CP_USAGE, |from, to| Self::Copy { from, to }),
            "mv" | "move" | "rename" => {
                pair(messages::MV_USAGE, |from, to| Self::Move { from, to })
            }
            _ => return None,
        };
        Some(op)
    }

    /// Applies the operation. On success returns a short description of what changed.
    /// The working directory only moves when a `ChangeDir` succeeds.
    pub async fn apply(&self, session: &mut Session, tools: &ToolExecutor) -> Result<String> {
        match self {
            Self::ChangeDir(dir) => {
                let target = if dir == ".." {
                    session.parent_directory()
                } else {
                    session.resolve(dir)?
                };
                if !tools.is_dir(&target).await {
                    bail!(messages::directory_not_found(dir));
                }
                session.set_working_directory(target)?;
                Ok(messages::changed_directory(&session.display_cwd()))
            }
            Self::MakeDir(name) => {
                let path = session.resolve(name)?;
                tools.create_dir(&path).await?;
                Ok(messages::created(&session.display_path(&path)))
            }
            Self::Touch(name) => {
                let path = session.resolve(name)?;
                tools.touch(&path).await?;
                Ok(messages::created(&session.display_path(&path)))
            }
            Self::Remove(name) => {
                let path = session.resolve(name)?;
                if !tools.is_file(&path).await {
                    bail!(messages::file_not_found(name));
                }
                tools.soft_delete_file(&path).await?;
                Ok(messages::trashed(name))
            }
            Self::RemoveDir(name) => {
                let path = session.resolve(name)?;
                if !tools.is_dir(&path).await {
                    bail!(messages::directory_not_found(name));
                }
                if session.working_directory().starts_with(&path) {
                    bail!(messages::contains_working_directory(name));
                }
                tools.soft_delete_dir(&path).await?;
                Ok(messages::trashed(name))
            }
            Self::Copy { from, to } => {
                let src = session.resolve(from)?;
                let dst = session.resolve(to)?;
                if !tools.is_file(&src).await {
                    bail!(messages::source_not_found(from));
                }
                tools.copy_file(&src, &dst).await?;
                Ok(messages::copied(from, to))
            }
            Self::Move { from, to } => {
                let src = session.resolve(from)?;
                let dst = session.resolve(to)?;
                if src.symlink_metadata().is_err() {
                    bail!(messages::source_not_found(from));
                }
                // Covers the root itself, the cwd and every directory above it.
                if session.working_directory().starts_with(&src) {
                    bail!(messages::contains_working_directory(from));
                }
                tools.move_path(&src, &dst).await?;
                Ok(messages::moved(from, to))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::trash::TrashCan;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn setup() -> (TempDir, TempDir, Session, ToolExecutor) {
        let work = TempDir::new().unwrap();
        let trash = TempDir::new().unwrap();
        let session = Session::new("test", work.path()).unwrap();
        let tools = ToolExecutor::new(Vec::new(), Arc::new(TrashCan::freedesktop(trash.path())));
        (work, trash, session, tools)
    }

    #[test]
    fn test_parse_verbs_and_aliases() {
        assert_eq!(
            FsOperation::parse("/cd", &args(&["my", "dir"])),
            Some(Ok(FsOperation::ChangeDir("my dir".to_string())))
        );
        assert_eq!(
            FsOperation::parse("del", &args(&["a.txt"])),
            Some(Ok(FsOperation::Remove("a.txt".to_string())))
        );
        assert_eq!(
            FsOperation::parse("/rename", &args(&["a", "b"])),
            Some(Ok(FsOperation::Move {
                from: "a".to_string(),
                to: "b".to_string()
            }))
        );
        assert_eq!(FsOperation::parse("/ls", &[]), None);
    }

    #[test]
    fn test_parse_reports_usage() {
        assert_eq!(
            FsOperation::parse("/mkdir", &[]),
            Some(Err(messages::MKDIR_USAGE))
        );
        assert_eq!(
            FsOperation::parse("/cp", &args(&["only-one"])),
            Some(Err(messages::CP_USAGE))
        );
    }

    #[tokio::test]
    async fn test_cd_missing_leaves_cwd() {
        let (_work, _trash, mut session, tools) = setup();
        let before = session.working_directory().to_path_buf();
        let err = FsOperation::ChangeDir("nope".to_string())
            .apply(&mut session, &tools)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Directory not found: nope");
        assert_eq!(session.working_directory(), before);
    }

    #[tokio::test]
    async fn test_cd_into_file_fails() {
        let (_work, _trash, mut session, tools) = setup();
        std::fs::write(session.root().join("f.txt"), "").unwrap();
        assert!(
            FsOperation::ChangeDir("f.txt".to_string())
                .apply(&mut session, &tools)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_cd_up_and_down() {
        let (_work, _trash, mut session, tools) = setup();
        std::fs::create_dir(session.root().join("site")).unwrap();

        FsOperation::ChangeDir("site".to_string())
            .apply(&mut session, &tools)
            .await
            .unwrap();
        assert_eq!(session.working_directory(), session.root().join("site"));

        for _ in 0..3 {
            FsOperation::ChangeDir("..".to_string())
                .apply(&mut session, &tools)
                .await
                .unwrap();
        }
        assert_eq!(session.working_directory(), session.root());
    }

    #[tokio::test]
    async fn test_mkdir_touch_and_remove() {
        let (_work, trash, mut session, tools) = setup();
        FsOperation::MakeDir("a/b".to_string())
            .apply(&mut session, &tools)
            .await
            .unwrap();
        assert!(session.root().join("a/b").is_dir());

        let file = session.root().join("a/b/x.txt");
        std::fs::write(&file, "data").unwrap();
        FsOperation::Touch("a/b/x.txt".to_string())
            .apply(&mut session, &tools)
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "");

        FsOperation::Remove("a/b/x.txt".to_string())
            .apply(&mut session, &tools)
            .await
            .unwrap();
        assert!(!file.exists());
        assert!(trash.path().join("files/x.txt").exists());

        FsOperation::RemoveDir("a".to_string())
            .apply(&mut session, &tools)
            .await
            .unwrap();
        assert!(!session.root().join("a").exists());
    }

    #[tokio::test]
    async fn test_rm_missing_file() {
        let (_work, _trash, mut session, tools) = setup();
        let err = FsOperation::Remove("ghost.txt".to_string())
            .apply(&mut session, &tools)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "File not found: ghost.txt");
    }

    #[tokio::test]
    async fn test_copy_and_move() {
        let (_work, _trash, mut session, tools) = setup();
        std::fs::write(session.root().join("a.txt"), "A").unwrap();

        FsOperation::Copy {
            from: "a.txt".to_string(),
            to: "b.txt".to_string(),
        }
        .apply(&mut session, &tools)
        .await
        .unwrap();
        FsOperation::Move {
            from: "b.txt".to_string(),
            to: "c.txt".to_string(),
        }
        .apply(&mut session, &tools)
        .await
        .unwrap();

        assert_eq!(std::fs::read_to_string(session.root().join("a.txt")).unwrap(), "A");
        assert!(!session.root().join("b.txt").exists());
        assert_eq!(std::fs::read_to_string(session.root().join("c.txt")).unwrap(), "A");
    }

    #[tokio::test]
    async fn test_rmdir_root_is_refused() {
        let (_work, _trash, mut session, tools) = setup();
        for target in ["..", "."] {
            let err = FsOperation::RemoveDir(target.to_string())
                .apply(&mut session, &tools)
                .await
                .unwrap_err();
            assert!(err.to_string().contains("contains the working directory"));
        }
        assert!(session.root().is_dir());

        FsOperation::Touch("still-works.txt".to_string())
            .apply(&mut session, &tools)
            .await
            .unwrap();
        assert!(session.root().join("still-works.txt").exists());
    }

    #[tokio::test]
    async fn test_rmdir_cwd_is_refused() {
        let (_work, _trash, mut session, tools) = setup();
        std::fs::create_dir_all(session.root().join("site/css")).unwrap();
        FsOperation::ChangeDir("site/css".to_string())
            .apply(&mut session, &tools)
            .await
            .unwrap();

        for target in [".", "..", "../.."] {
            assert!(
                FsOperation::RemoveDir(target.to_string())
                    .apply(&mut session, &tools)
                    .await
                    .is_err()
            );
        }
        assert!(session.working_directory().is_dir());
    }

    #[tokio::test]
    async fn test_mv_ancestor_of_cwd_is_refused() {
        let (_work, _trash, mut session, tools) = setup();
        std::fs::create_dir(session.root().join("site")).unwrap();
        FsOperation::ChangeDir("site".to_string())
            .apply(&mut session, &tools)
            .await
            .unwrap();

        let err = FsOperation::Move {
            from: "../site".to_string(),
            to: "../moved".to_string(),
        }
        .apply(&mut session, &tools)
        .await
        .unwrap_err();
        assert!(err.to_string().contains("contains the working directory"));
        assert!(session.root().join("site").is_dir());
        assert!(!session.root().join("moved").exists());
    }

    #[tokio::test]
    async fn test_absolute_escape_is_refused() {
        let (_work, _trash, mut session, tools) = setup();
        let err = FsOperation::Touch("/etc/evil".to_string())
            .apply(&mut session, &tools)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("outside the workspace root"));
    }
}
