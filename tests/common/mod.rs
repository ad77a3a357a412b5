#![allow(dead_code)]

use scout::process::{CommandRunner, ToolError};
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tempfile::TempDir;

pub fn temp_repo(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (rel, content) in files {
        write_file(dir.path(), rel, content);
    }
    dir
}

pub fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// Stand-in for ctags, git and rg.
///
/// The fake tag tool recognises Python `def`/`class` lines. The fake content
/// search does a plain substring match over every file outside `.scout`.
pub struct FakeTools {
    pub ctags: CtagsMode,
    pub rg_available: bool,
    /// `None` behaves like a missing git binary.
    pub git_status: RefCell<Option<String>>,
    pub ctags_calls: Cell<usize>,
    pub status_calls: Cell<usize>,
    /// Sets the flag once this many status checks have run.
    pub stop_after_status: Option<(usize, Arc<AtomicBool>)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtagsMode {
    Json,
    TabbedOnly,
    Missing,
}

impl Default for FakeTools {
    fn default() -> Self {
        Self {
            ctags: CtagsMode::Json,
            rg_available: true,
            git_status: RefCell::new(Some(String::new())),
            ctags_calls: Cell::new(0),
            status_calls: Cell::new(0),
            stop_after_status: None,
        }
    }
}

impl FakeTools {
    pub fn set_status(&self, status: Option<&str>) {
        *self.git_status.borrow_mut() = status.map(str::to_string);
    }

    /// Number of full tag extraction passes, counting the fallback attempt of a
    /// pass only once.
    pub fn rebuilds(&self) -> usize {
        self.ctags_calls.get()
    }

    fn ctags(&self, argv: &[String], cwd: &Path) -> Result<String, ToolError> {
        let json = argv.iter().any(|arg| arg == "--output-format=json");
        match self.ctags {
            CtagsMode::Missing => return Err(ToolError::NotFound(argv[0].clone())),
            CtagsMode::TabbedOnly if json => {
                return Err(ToolError::Failed {
                    program: argv[0].clone(),
                    code: Some(1),
                    stderr: "unknown option --output-format".to_string(),
                });
            }
            _ => {}
        }
        self.ctags_calls.set(self.ctags_calls.get() + 1);

        let out_pos = argv.iter().position(|arg| arg == "-f").unwrap();
        let out_path = PathBuf::from(&argv[out_pos + 1]);
        let dash = argv.iter().position(|arg| arg == "--").unwrap();
        let mut listing = String::new();
        if json {
            listing.push_str("{\"_type\": \"ptag\", \"name\": \"JSON_OUTPUT_VERSION\", \"path\": \"0.0\"}\n");
        } else {
            listing.push_str("!_TAG_FILE_FORMAT\t2\t/extended format/\n");
        }
        for file in &argv[dash + 1..] {
            let Ok(content) = std::fs::read_to_string(cwd.join(file)) else {
                continue;
            };
            for (idx, line) in content.lines().enumerate() {
                let Some((name, kind)) = python_symbol(line) else {
                    continue;
                };
                if json {
                    listing.push_str(&format!(
                        "{{\"_type\": \"tag\", \"name\": \"{name}\", \"path\": \"{file}\", \"line\": {}, \"kind\": \"{kind}\"}}\n",
                        idx + 1
                    ));
                } else {
                    listing.push_str(&format!("{name}\t{file}\t{};\"\t{kind}\n", idx + 1));
                }
            }
        }
        std::fs::write(out_path, listing).unwrap();
        Ok(String::new())
    }

    fn git(&self, argv: &[String]) -> Result<String, ToolError> {
        if argv.get(1).map(String::as_str) == Some("rev-parse") {
            return Err(ToolError::Failed {
                program: argv[0].clone(),
                code: Some(128),
                stderr: "not a git repository".to_string(),
            });
        }
        self.status_calls.set(self.status_calls.get() + 1);
        if let Some((after, flag)) = &self.stop_after_status {
            if self.status_calls.get() >= *after {
                flag.store(true, Ordering::SeqCst);
            }
        }
        self.git_status
            .borrow()
            .clone()
            .ok_or_else(|| ToolError::NotFound(argv[0].clone()))
    }

    fn rg(&self, argv: &[String], cwd: &Path) -> Result<String, ToolError> {
        if !self.rg_available {
            return Err(ToolError::NotFound(argv[0].clone()));
        }
        let dash = argv.iter().position(|arg| arg == "--").unwrap();
        let pattern = &argv[dash + 1];
        let mut out = String::new();
        let mut files = Vec::new();
        collect_files(cwd, cwd, &mut files);
        files.sort();
        for rel in files {
            let Ok(content) = std::fs::read_to_string(cwd.join(&rel)) else {
                continue;
            };
            for (idx, line) in content.lines().enumerate() {
                if line.contains(pattern.as_str()) {
                    out.push_str(&format!("./{rel}:{}:{line}\n", idx + 1));
                }
            }
        }
        if out.is_empty() {
            return Err(ToolError::Failed {
                program: argv[0].clone(),
                code: Some(1),
                stderr: String::new(),
            });
        }
        Ok(out)
    }
}

impl CommandRunner for FakeTools {
    fn run(&self, argv: &[String], cwd: &Path, _timeout: Duration) -> Result<String, ToolError> {
        match argv.first().map(String::as_str) {
            Some("ctags") => self.ctags(argv, cwd),
            Some("git") => self.git(argv),
            Some("rg") => self.rg(argv, cwd),
            Some(other) => Err(ToolError::NotFound(other.to_string())),
            None => Err(ToolError::EmptyCommand),
        }
    }
}

fn python_symbol(line: &str) -> Option<(String, &'static str)> {
    let trimmed = line.trim_start();
    let (rest, kind) = if let Some(rest) = trimmed.strip_prefix("def ") {
        (rest, if trimmed.len() == line.len() { "function" } else { "method" })
    } else if let Some(rest) = trimmed.strip_prefix("class ") {
        (rest, "class")
    } else {
        return None;
    };
    let name: String = rest
        .chars()
        .take_while(|ch| ch.is_alphanumeric() || *ch == '_')
        .collect();
    if name.is_empty() { None } else { Some((name, kind)) }
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<String>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if entry.file_name() != ".scout" {
                collect_files(root, &path, out);
            }
        } else if let Ok(rel) = path.strip_prefix(root) {
            out.push(rel.to_string_lossy().replace('\\', "/"));
        }
    }
}
