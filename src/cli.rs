use crate::watch::DEFAULT_INTERVAL_SECS;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "scout",
    version,
    about = "Local code symbol index",
    after_help = r#"Examples:
  scout build
  scout update --repo ~/src/project
  scout query "parse config" --limit 5
  scout suggest "retry failed uploads in the http client"
  scout watch --interval 60
  scout stats --json
"#
)]
pub struct Args {
    /// Repository (or any directory inside it).
    #[arg(long, global = true, default_value = ".")]
    pub repo: PathBuf,
    /// Enable debug logging (SCOUT_LOG overrides).
    #[arg(long, short, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Rebuild the index from scratch.
    Build {
        /// Include files ignored by .gitignore.
        #[arg(long)]
        no_ignore: bool,
    },
    /// Rebuild only if tracked source files changed.
    Update {
        /// Include files ignored by .gitignore.
        #[arg(long)]
        no_ignore: bool,
        /// Rebuild even when version control reports no changes.
        #[arg(long)]
        force: bool,
    },
    /// Search symbols, falling back to a raw content search.
    Query {
        text: String,
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Broad candidate search for a free-text task description.
    Suggest {
        text: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Poll version control and keep the index fresh until interrupted.
    Watch {
        /// Seconds between polls.
        #[arg(long, default_value_t = DEFAULT_INTERVAL_SECS)]
        interval: u64,
        /// Include files ignored by .gitignore.
        #[arg(long)]
        no_ignore: bool,
    },
    /// Show symbol count, file count and index size.
    Stats {
        /// Print stats as JSON.
        #[arg(long)]
        json: bool,
    },
}
