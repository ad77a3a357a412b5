//! Git queries used to decide whether the index is stale.

use crate::config::Config;
use crate::process::{CommandRunner, ToolError, argv};
use crate::util;
use std::path::{Path, PathBuf};

/// Paths reported by `git status --porcelain`, repo-relative.
pub fn changed_files(
    runner: &dyn CommandRunner,
    config: &Config,
    repo_root: &Path,
) -> Result<Vec<String>, ToolError> {
    let stdout = runner.run(
        &argv([
            config.git_bin.as_str(),
            "status",
            "--porcelain",
            "--untracked-files=all",
        ]),
        repo_root,
        config.vcs_timeout(),
    )?;
    Ok(parse_porcelain(&stdout))
}

/// True when the working tree differs from HEAD in any way.
pub fn has_changes(
    runner: &dyn CommandRunner,
    config: &Config,
    repo_root: &Path,
) -> Result<bool, ToolError> {
    changed_files(runner, config, repo_root).map(|files| !files.is_empty())
}

pub fn toplevel(runner: &dyn CommandRunner, config: &Config, path: &Path) -> Option<PathBuf> {
    let stdout = runner
        .run(
            &argv([config.git_bin.as_str(), "rev-parse", "--show-toplevel"]),
            path,
            config.vcs_timeout(),
        )
        .ok()?;
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    }
}

pub fn parse_porcelain(stdout: &str) -> Vec<String> {
    let mut files = Vec::new();
    for line in stdout.lines() {
        // "XY <path>" or "XY <old> -> <new>"
        if line.len() < 4 {
            continue;
        }
        let Some(rest) = line.get(3..) else {
            continue;
        };
        let path = match rest.rsplit_once(" -> ") {
            Some((_, new)) => new,
            None => rest,
        };
        let path = unquote(path.trim());
        if path.is_empty() {
            continue;
        }
        files.push(util::normalize_path(Path::new(&path)));
    }
    files
}

/// Undoes git's C-style path quoting, including the octal escapes it uses for
/// non-ASCII bytes.
fn unquote(raw: &str) -> String {
    let Some(inner) = raw.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) else {
        return raw.to_string();
    };
    let bytes = inner.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' || i + 1 >= bytes.len() {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        let next = bytes[i + 1];
        let octal = bytes
            .get(i + 1..i + 4)
            .filter(|digits| digits.iter().all(|b| (b'0'..=b'7').contains(b)));
        if let Some(digits) = octal {
            let value = digits
                .iter()
                .fold(0u32, |acc, digit| acc * 8 + u32::from(digit - b'0'));
            out.push(value as u8);
            i += 4;
            continue;
        }
        out.push(match next {
            b'n' => b'\n',
            b't' => b'\t',
            b'r' => b'\r',
            b'a' => 0x07,
            b'b' => 0x08,
            b'f' => 0x0c,
            b'v' => 0x0b,
            other => other,
        });
        i += 2;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn parses_modified_untracked_and_renamed() {
        let out = " M src/lib.rs\n?? notes/new file.py\nR  old.py -> pkg/new.py\nA  \"odd \\\"name\\\".rs\"\n";
        let files = parse_porcelain(out);
        assert_eq!(
            files,
            vec![
                "src/lib.rs".to_string(),
                "notes/new file.py".to_string(),
                "pkg/new.py".to_string(),
                "odd \"name\".rs".to_string(),
            ]
        );
    }

    #[test]
    fn clean_tree_has_no_changes() {
        let runner = |_: &[String], _: &Path, _: Duration| -> Result<String, ToolError> {
            Ok(String::new())
        };
        let changed = has_changes(&runner, &Config::default(), Path::new(".")).unwrap();
        assert!(!changed);
    }

    #[test]
    fn decodes_octal_escaped_paths() {
        let out = "?? \"caf\\303\\251.py\"\n M \"tab\\there.rs\"\n";
        assert_eq!(
            parse_porcelain(out),
            vec!["café.py".to_string(), "tab\there.rs".to_string()]
        );
    }

    #[test]
    fn toplevel_falls_back_to_none_on_failure() {
        let runner = |_: &[String], _: &Path, _: Duration| -> Result<String, ToolError> {
            Err(ToolError::NotFound("git".to_string()))
        };
        assert!(toplevel(&runner, &Config::default(), Path::new(".")).is_none());
    }
}
