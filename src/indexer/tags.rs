use crate::config::Config;
use crate::process::{CommandRunner, ToolError};
use crate::repo::RepoIndex;
use std::path::Path;
use tracing::{debug, info, warn};

/// Output mode requested from the tag tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagFormat {
    Json,
    Tabbed,
}

impl TagFormat {
    fn args(self) -> &'static [&'static str] {
        match self {
            TagFormat::Json => &["--output-format=json", "--fields=+nK"],
            TagFormat::Tabbed => &["--fields=+nK", "--excmd=number"],
        }
    }
}

/// Writes a raw tag listing to the index's tags path.
///
/// `files` defaults to the enumerator's output; either way the list is capped
/// at `config.max_tag_files`. Returns false when neither output mode worked.
pub fn extract(
    runner: &dyn CommandRunner,
    config: &Config,
    index: &RepoIndex,
    files: &[String],
) -> bool {
    if files.is_empty() {
        debug!("no files to tag");
        return false;
    }
    let capped = &files[..files.len().min(config.max_tag_files)];
    if capped.len() < files.len() {
        warn!(
            "tagging first {} of {} files (SCOUT_MAX_TAG_FILES)",
            capped.len(),
            files.len()
        );
    }

    for format in [TagFormat::Json, TagFormat::Tabbed] {
        match run_format(runner, config, index, capped, format) {
            Ok(()) if index.tags_path().is_file() => {
                info!(?format, files = capped.len(), "tag extraction finished");
                return true;
            }
            Ok(()) => warn!(?format, "tag tool produced no output file"),
            Err(err) => warn!(?format, "tag extraction failed: {err}"),
        }
    }
    false
}

fn run_format(
    runner: &dyn CommandRunner,
    config: &Config,
    index: &RepoIndex,
    files: &[String],
    format: TagFormat,
) -> Result<(), ToolError> {
    let _ = std::fs::remove_file(index.tags_path());
    let argv = tag_command(config, index.tags_path(), files, format);
    runner.run(&argv, index.root(), config.tag_timeout())?;
    Ok(())
}

pub fn tag_command(
    config: &Config,
    tags_path: &Path,
    files: &[String],
    format: TagFormat,
) -> Vec<String> {
    let mut argv = Vec::with_capacity(files.len() + 6);
    argv.push(config.ctags_bin.clone());
    argv.extend(format.args().iter().map(|arg| arg.to_string()));
    argv.push("-f".to_string());
    argv.push(tags_path.to_string_lossy().to_string());
    argv.push("--".to_string());
    argv.extend(files.iter().cloned());
    argv
}
