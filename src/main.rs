use anyhow::Result;
use clap::Parser;
use scout::cli;
use scout::commands::{self, Outcome};
use scout::config::Config;
use scout::indexer::scan::ScanOptions;
use scout::indexer::{DEFAULT_REBUILD_POLICY, Indexer, RebuildPolicy};
use scout::process::SystemRunner;
use scout::repo::RepoIndex;
use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("SCOUT_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let args = cli::Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(outcome) => outcome.into(),
        Err(err) => {
            eprintln!("scout: {err:#}");
            ExitCode::from(1)
        }
    }
}

fn run(args: cli::Args) -> Result<Outcome> {
    let config = Config::get();
    let runner = SystemRunner;
    let index = RepoIndex::discover(&runner, config, &args.repo);
    let mut out = io::stdout().lock();
    let mut err = io::stderr();

    match args.command {
        cli::Command::Build { no_ignore } => {
            let indexer = Indexer::new(index, &runner, config)
                .with_scan_options(ScanOptions::new(no_ignore));
            commands::build(&indexer, &mut out)
        }
        cli::Command::Update { no_ignore, force } => {
            let policy = if force {
                RebuildPolicy::Always
            } else {
                DEFAULT_REBUILD_POLICY
            };
            let indexer = Indexer::new(index, &runner, config)
                .with_scan_options(ScanOptions::new(no_ignore))
                .with_policy(policy);
            commands::update(&indexer, &mut out)
        }
        cli::Command::Query { text, limit, json } => {
            let indexer = Indexer::new(index, &runner, config);
            commands::query(&indexer, &text, limit, json, &mut out, &mut err)
        }
        cli::Command::Suggest { text, limit, json } => {
            commands::suggest(&index, config, &text, limit, json, &mut out, &mut err)
        }
        cli::Command::Watch {
            interval,
            no_ignore,
        } => {
            let stop = Arc::new(AtomicBool::new(false));
            let handler_flag = Arc::clone(&stop);
            ctrlc::set_handler(move || handler_flag.store(true, Ordering::SeqCst))?;
            let indexer = Indexer::new(index, &runner, config)
                .with_scan_options(ScanOptions::new(no_ignore));
            commands::watch(&indexer, interval, &stop, &mut out)
        }
        cli::Command::Stats { json } => {
            commands::stats(&index, config, json, &mut out, &mut err)
        }
    }
}
