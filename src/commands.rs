//! Subcommand bodies. Each writes results to `out`, diagnostics to `err`, and
//! reports whether the invocation succeeded.

use crate::db::Store;
use crate::indexer::Indexer;
use crate::model::IndexStats;
use crate::config::Config;
use crate::repo::RepoIndex;
use crate::{search, util, watch};
use anyhow::{Context, Result};
use serde_json::json;
use std::io::Write;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::Failure => ExitCode::from(1),
        }
    }
}

pub fn build(indexer: &Indexer<'_>, out: &mut dyn Write) -> Result<Outcome> {
    let count = indexer.build()?;
    writeln!(
        out,
        "indexed {count} symbols into {}",
        indexer.index().dir().display()
    )?;
    Ok(Outcome::Success)
}

pub fn update(indexer: &Indexer<'_>, out: &mut dyn Write) -> Result<Outcome> {
    let outcome = indexer.update()?;
    let note = if outcome.rebuilt {
        "rebuilt"
    } else {
        "up to date"
    };
    writeln!(out, "{} symbols ({note})", outcome.symbols)?;
    Ok(Outcome::Success)
}

/// Structured search first; raw content search only when that finds nothing.
pub fn query(
    indexer: &Indexer<'_>,
    text: &str,
    limit: usize,
    as_json: bool,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<Outcome> {
    let result = search::query(indexer.index(), indexer.config(), text, limit);
    let elapsed_ms = result.elapsed.as_secs_f64() * 1000.0;
    if !result.hits.is_empty() {
        if as_json {
            let body = json!({ "source": "index", "elapsed_ms": elapsed_ms, "hits": result.hits });
            writeln!(out, "{}", serde_json::to_string_pretty(&body)?)?;
        } else {
            writeln!(out, "{} result(s) in {elapsed_ms:.1}ms", result.hits.len())?;
            for hit in &result.hits {
                writeln!(out, "  {}:{}  {} ({})", hit.file, hit.line, hit.name, hit.kind)?;
            }
        }
        return Ok(Outcome::Success);
    }

    let content = search::ripgrep_search(
        indexer.runner(),
        indexer.config(),
        indexer.index().root(),
        text,
        limit,
    );
    if content.is_empty() {
        writeln!(err, "no results for {text:?}")?;
        return Ok(Outcome::Failure);
    }
    if as_json {
        let body = json!({ "source": "content", "elapsed_ms": elapsed_ms, "hits": content });
        writeln!(out, "{}", serde_json::to_string_pretty(&body)?)?;
    } else {
        writeln!(out, "no symbol matches; {} content match(es):", content.len())?;
        for hit in &content {
            writeln!(out, "  {}:{}: {}", hit.file, hit.line, hit.snippet)?;
        }
    }
    Ok(Outcome::Success)
}

pub fn suggest(
    index: &RepoIndex,
    config: &Config,
    text: &str,
    limit: usize,
    as_json: bool,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<Outcome> {
    let hits = match search::suggest(index, config, text, limit) {
        Some(hits) if !hits.is_empty() => hits,
        _ => {
            writeln!(err, "no suggestions for {text:?}")?;
            return Ok(Outcome::Failure);
        }
    };
    if as_json {
        writeln!(out, "{}", serde_json::to_string_pretty(&hits)?)?;
    } else {
        for hit in &hits {
            writeln!(out, "{}:{}  {} ({})", hit.file, hit.line, hit.name, hit.kind)?;
        }
    }
    Ok(Outcome::Success)
}

pub fn watch(
    indexer: &Indexer<'_>,
    interval_secs: u64,
    stop: &AtomicBool,
    out: &mut dyn Write,
) -> Result<Outcome> {
    writeln!(
        out,
        "watching {} every {interval_secs}s (Ctrl-C to stop)",
        indexer.index().root().display()
    )?;
    out.flush()?;
    watch::run(indexer, Duration::from_secs(interval_secs), stop, out)?;
    writeln!(out, "watch stopped")?;
    Ok(Outcome::Success)
}

pub fn index_stats(index: &RepoIndex, config: &Config) -> Result<Option<IndexStats>> {
    let Some(store) = Store::open_existing(index.db_path(), config.busy_timeout())? else {
        return Ok(None);
    };
    let stats = IndexStats {
        symbols: store.count()?,
        files: store.file_count()?,
        size_bytes: util::file_size(index.db_path()),
        db_path: index.db_path().to_string_lossy().to_string(),
    };
    Ok(Some(stats))
}

pub fn stats(
    index: &RepoIndex,
    config: &Config,
    as_json: bool,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<Outcome> {
    let stats = match index_stats(index, config).context("read index stats")? {
        Some(stats) => stats,
        None => {
            writeln!(
                err,
                "no index found at {} (run `scout build`)",
                index.dir().display()
            )?;
            return Ok(Outcome::Failure);
        }
    };
    if as_json {
        writeln!(out, "{}", serde_json::to_string_pretty(&stats)?)?;
    } else {
        writeln!(out, "symbols: {}", stats.symbols)?;
        writeln!(out, "files: {}", stats.files)?;
        writeln!(out, "index size: {:.2} MB", stats.size_mb())?;
    }
    Ok(Outcome::Success)
}
