use crate::config::Config;
use crate::process::CommandRunner;
use crate::{util, vcs};
use anyhow::Result;
use std::path::{Path, PathBuf};

pub const INDEX_DIR: &str = ".scout";
pub const DB_FILE: &str = "index.db";
pub const TAGS_FILE: &str = "tags";

/// Where one repository keeps its index. Built per command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoIndex {
    root: PathBuf,
    dir: PathBuf,
    db_path: PathBuf,
    tags_path: PathBuf,
}

impl RepoIndex {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let dir = root.join(INDEX_DIR);
        Self {
            db_path: dir.join(DB_FILE),
            tags_path: dir.join(TAGS_FILE),
            dir,
            root,
        }
    }

    /// Resolves the repository root containing `path`: the VCS top-level when
    /// available, else the canonical form of `path` itself.
    pub fn discover(runner: &dyn CommandRunner, config: &Config, path: &Path) -> Self {
        let canonical = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let root = vcs::toplevel(runner, config, &canonical)
            .and_then(|top| std::fs::canonicalize(&top).ok())
            .unwrap_or(canonical);
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn tags_path(&self) -> &Path {
        &self.tags_path
    }

    pub fn exists(&self) -> bool {
        self.db_path.is_file()
    }

    pub fn ensure_dir(&self) -> Result<()> {
        util::ensure_dir(&self.dir)
    }
}
