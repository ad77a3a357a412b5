//! Child-process plumbing shared by the tag extractor, the VCS client and the
//! content-search fallback.
//!
//! Every external tool goes through [`CommandRunner`], so callers can be
//! exercised against fakes. Closures with the right signature implement the
//! trait directly.

use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0}: command not found")]
    NotFound(String),
    #[error("{program} timed out after {}s", .timeout.as_secs())]
    Timeout { program: String, timeout: Duration },
    #[error("{program} exited with status {code:?}: {stderr}")]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("{program}: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("empty command line")]
    EmptyCommand,
}

pub trait CommandRunner {
    /// Runs `argv` in `cwd` and returns its stdout when it exits successfully.
    fn run(&self, argv: &[String], cwd: &Path, timeout: Duration) -> Result<String, ToolError>;
}

impl<F> CommandRunner for F
where
    F: Fn(&[String], &Path, Duration) -> Result<String, ToolError>,
{
    fn run(&self, argv: &[String], cwd: &Path, timeout: Duration) -> Result<String, ToolError> {
        self(argv, cwd, timeout)
    }
}

/// Spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, argv: &[String], cwd: &Path, timeout: Duration) -> Result<String, ToolError> {
        let (program, args) = argv.split_first().ok_or(ToolError::EmptyCommand)?;
        debug!(program = %program, args = args.len(), cwd = %cwd.display(), "spawn");
        let mut child = match Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(ToolError::NotFound(program.clone()));
            }
            Err(source) => {
                return Err(ToolError::Io {
                    program: program.clone(),
                    source,
                });
            }
        };

        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());
        let deadline = Instant::now() + timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) if Instant::now() >= deadline => {
                    abort(&mut child);
                    return Err(ToolError::Timeout {
                        program: program.clone(),
                        timeout,
                    });
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(source) => {
                    abort(&mut child);
                    return Err(ToolError::Io {
                        program: program.clone(),
                        source,
                    });
                }
            }
        };

        let stdout = collect(stdout);
        let stderr = collect(stderr);
        if !status.success() {
            return Err(ToolError::Failed {
                program: program.clone(),
                code: status.code(),
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(stdout)
    }
}

/// Kills and reaps the child so no zombie outlives the call.
fn abort(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

fn spawn_reader<R>(source: Option<R>) -> Option<JoinHandle<Vec<u8>>>
where
    R: Read + Send + 'static,
{
    source.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    })
}

fn collect(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|handle| handle.join().ok())
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

/// Builds an owned argv from string-ish parts.
pub fn argv<I, S>(parts: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    parts.into_iter().map(Into::into).collect()
}
