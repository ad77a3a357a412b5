use crate::repo::INDEX_DIR;
use ignore::WalkBuilder;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct LanguageSpec {
    pub name: &'static str,
    pub extensions: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    pub no_ignore: bool,
}

impl ScanOptions {
    pub fn new(no_ignore: bool) -> Self {
        Self { no_ignore }
    }
}

static LANGUAGE_SPECS: &[LanguageSpec] = &[
    LanguageSpec {
        name: "python",
        extensions: &["py", "pyi"],
    },
    LanguageSpec {
        name: "rust",
        extensions: &["rs"],
    },
    LanguageSpec {
        name: "javascript",
        extensions: &["js", "jsx", "mjs", "cjs"],
    },
    LanguageSpec {
        name: "typescript",
        extensions: &["ts", "tsx", "mts", "cts"],
    },
    LanguageSpec {
        name: "go",
        extensions: &["go"],
    },
    LanguageSpec {
        name: "c",
        extensions: &["c", "h"],
    },
    LanguageSpec {
        name: "cpp",
        extensions: &["cc", "cpp", "cxx", "hh", "hpp", "hxx"],
    },
    LanguageSpec {
        name: "java",
        extensions: &["java"],
    },
    LanguageSpec {
        name: "csharp",
        extensions: &["cs"],
    },
    LanguageSpec {
        name: "ruby",
        extensions: &["rb"],
    },
    LanguageSpec {
        name: "php",
        extensions: &["php"],
    },
    LanguageSpec {
        name: "lua",
        extensions: &["lua"],
    },
    LanguageSpec {
        name: "shell",
        extensions: &["sh", "bash"],
    },
    LanguageSpec {
        name: "kotlin",
        extensions: &["kt", "kts"],
    },
    LanguageSpec {
        name: "swift",
        extensions: &["swift"],
    },
    LanguageSpec {
        name: "scala",
        extensions: &["scala"],
    },
];

/// Directory names never descended into.
pub static IGNORED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "__pycache__",
    INDEX_DIR,
    ".venv",
    "venv",
    "env",
    "node_modules",
    "target",
    "dist",
    "build",
    ".mypy_cache",
    ".pytest_cache",
    ".tox",
];

pub fn language_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension().and_then(|ext| ext.to_str())?;
    LANGUAGE_SPECS
        .iter()
        .find(|spec| spec.extensions.iter().any(|candidate| *candidate == ext))
        .map(|spec| spec.name)
}

pub fn is_tracked(rel_path: &str) -> bool {
    language_for_path(Path::new(rel_path)).is_some()
}

/// True when any directory segment of a repo-relative path is in the ignore set.
pub fn in_ignored_dir(rel_path: &str) -> bool {
    let mut segments: Vec<&str> = rel_path.split('/').collect();
    segments.pop();
    segments.iter().any(|segment| IGNORED_DIRS.contains(segment))
}

/// Repo-relative paths of every tracked source file, sorted.
pub fn scan_repo(repo_root: &Path) -> Vec<String> {
    scan_repo_with_options(repo_root, ScanOptions::default())
}

pub fn scan_repo_with_options(repo_root: &Path, options: ScanOptions) -> Vec<String> {
    let mut files = Vec::new();
    let mut builder = WalkBuilder::new(repo_root);
    if options.no_ignore {
        builder
            .ignore(false)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .parents(false);
    } else {
        builder
            .ignore(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .parents(true)
            .require_git(false);
    }
    let walker = builder
        .hidden(false)
        .filter_entry(|entry| !is_ignored_entry(entry))
        .build();

    for entry in walker {
        let entry = match entry {
            Ok(value) => value,
            Err(err) => {
                warn!("walk error: {err}");
                continue;
            }
        };
        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            continue;
        }
        let path = entry.path();
        if language_for_path(path).is_none() {
            continue;
        }
        match crate::util::normalize_rel_path(repo_root, path) {
            Ok(rel_path) => files.push(rel_path),
            Err(err) => debug!("dropping {}: {err}", path.display()),
        }
    }
    files.sort();
    files
}

fn is_ignored_entry(entry: &ignore::DirEntry) -> bool {
    let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
    is_dir
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| IGNORED_DIRS.contains(&name))
}
