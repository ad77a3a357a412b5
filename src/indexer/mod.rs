use crate::config::Config;
use crate::db::Store;
use crate::process::CommandRunner;
use crate::repo::RepoIndex;
use crate::vcs;
use anyhow::Result;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, warn};

pub mod parse;
pub mod scan;
pub mod tags;

/// When `update` escalates to a full rebuild. There is no partial update of
/// individual symbols: a rebuild always re-tags the whole tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildPolicy {
    /// Rebuild when version control reports a change to a tracked source file.
    OnTrackedChange,
    /// Rebuild on every update.
    Always,
}

pub const DEFAULT_REBUILD_POLICY: RebuildPolicy = RebuildPolicy::OnTrackedChange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    pub symbols: usize,
    pub rebuilt: bool,
}

pub struct Indexer<'a> {
    index: RepoIndex,
    runner: &'a dyn CommandRunner,
    config: &'a Config,
    scan_options: scan::ScanOptions,
    policy: RebuildPolicy,
}

impl<'a> Indexer<'a> {
    pub fn new(index: RepoIndex, runner: &'a dyn CommandRunner, config: &'a Config) -> Self {
        Self {
            index,
            runner,
            config,
            scan_options: scan::ScanOptions::default(),
            policy: DEFAULT_REBUILD_POLICY,
        }
    }

    pub fn with_scan_options(mut self, scan_options: scan::ScanOptions) -> Self {
        self.scan_options = scan_options;
        self
    }

    pub fn with_policy(mut self, policy: RebuildPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn index(&self) -> &RepoIndex {
        &self.index
    }

    pub fn runner(&self) -> &dyn CommandRunner {
        self.runner
    }

    pub fn config(&self) -> &Config {
        self.config
    }

    /// Full rebuild: enumerate, tag, parse, load. A failed extraction still
    /// leaves a valid, empty table behind.
    pub fn build(&self) -> Result<usize> {
        let start = Instant::now();
        self.index.ensure_dir()?;
        let root = self.index.root();
        let files = scan::scan_repo_with_options(root, self.scan_options);
        debug!(files = files.len(), "enumerated source files");

        let extracted = tags::extract(self.runner, self.config, &self.index, &files);
        if !extracted {
            warn!("tag extraction unavailable; writing an empty index");
        }

        let mut store = Store::open(self.index.db_path(), self.config.busy_timeout())?;
        let tags_path = extracted.then(|| self.index.tags_path());
        let count = store.rebuild(tags_path, root)?;
        store.close()?;

        info!(
            symbols = count,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "index rebuilt"
        );
        Ok(count)
    }

    /// Rebuilds only when version control reports a tracked change; otherwise
    /// reports the current symbol count. Any VCS or store failure counts as
    /// a change.
    pub fn update(&self) -> Result<UpdateOutcome> {
        if self.policy == RebuildPolicy::OnTrackedChange {
            match self.tracked_changes() {
                Some(changed) if changed.is_empty() => match self.current_count() {
                    Ok(symbols) => {
                        debug!(symbols, "no tracked changes; skipping rebuild");
                        return Ok(UpdateOutcome {
                            symbols,
                            rebuilt: false,
                        });
                    }
                    Err(err) => debug!("existing index unreadable, rebuilding: {err:#}"),
                },
                Some(changed) => debug!(changed = changed.len(), "tracked files changed"),
                None => {}
            }
        }
        let symbols = self.build()?;
        Ok(UpdateOutcome {
            symbols,
            rebuilt: true,
        })
    }

    /// Changed tracked files, or `None` when version control could not answer.
    fn tracked_changes(&self) -> Option<Vec<String>> {
        match vcs::changed_files(self.runner, self.config, self.index.root()) {
            Ok(files) => Some(
                files
                    .into_iter()
                    .filter(|path| scan::is_tracked(path) && !scan::in_ignored_dir(path))
                    .collect(),
            ),
            Err(err) => {
                debug!("vcs status unavailable, assuming changes: {err}");
                None
            }
        }
    }

    /// Row count of the existing store; 0 when no index exists yet.
    pub fn current_count(&self) -> Result<usize> {
        match Store::open_existing(self.index.db_path(), self.config.busy_timeout())? {
            Some(store) => store.count(),
            None => Ok(0),
        }
    }
}
