use crate::config::Config;
use crate::db::Store;
use crate::model::{ContentHit, QueryResult, Symbol};
use crate::process::{CommandRunner, argv};
use crate::repo::RepoIndex;
use crate::util;
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, warn};

/// Longest token list `suggest` turns into a match expression.
const SUGGEST_MAX_TOKENS: usize = 5;
const SUGGEST_MIN_TOKEN_LEN: usize = 3;

static STOP_WORDS: &[&str] = &[
    "a", "about", "add", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been",
    "but", "by", "can", "could", "do", "does", "for", "from", "has", "have", "how", "if", "in",
    "into", "is", "it", "its", "make", "need", "needs", "new", "not", "of", "on", "or", "our",
    "please", "should", "so", "some", "that", "the", "their", "them", "then", "there", "these",
    "this", "those", "to", "use", "was", "we", "were", "what", "when", "where", "which", "while",
    "will", "with", "would", "you", "your",
];

/// Precise symbol lookup: every whitespace token must match.
///
/// A missing index yields an empty result with zero elapsed time. A match
/// expression the FTS engine rejects is retried once as a literal phrase.
pub fn query(index: &RepoIndex, config: &Config, text: &str, limit: usize) -> QueryResult {
    let store = match Store::open_existing(index.db_path(), config.busy_timeout()) {
        Ok(Some(store)) => store,
        Ok(None) => return QueryResult::default(),
        Err(err) => {
            warn!("cannot open index: {err:#}");
            return QueryResult::default();
        }
    };
    let start = Instant::now();
    let hits = match and_expression(text) {
        Some(expr) => run_with_retry(&store, &expr, text, limit),
        None => Vec::new(),
    };
    QueryResult {
        hits,
        elapsed: start.elapsed(),
    }
}

fn run_with_retry(store: &Store, expr: &str, raw: &str, limit: usize) -> Vec<Symbol> {
    match store.search(expr, limit) {
        Ok(hits) => hits,
        Err(err) => {
            debug!("match expression {expr:?} rejected ({err}); retrying as phrase");
            store
                .search(&literal_phrase(raw), limit)
                .unwrap_or_else(|err| {
                    debug!("phrase retry failed: {err}");
                    Vec::new()
                })
        }
    }
}

pub fn and_expression(text: &str) -> Option<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" AND "))
    }
}

pub fn literal_phrase(text: &str) -> String {
    format!("\"{}\"", text.trim().replace('"', "\"\""))
}

/// Raw content search through `rg`. Any tool failure, including "no matches",
/// yields an empty list.
pub fn ripgrep_search(
    runner: &dyn CommandRunner,
    config: &Config,
    repo_root: &Path,
    text: &str,
    limit: usize,
) -> Vec<ContentHit> {
    if text.trim().is_empty() || limit == 0 {
        return Vec::new();
    }
    let max_count = limit.to_string();
    let cmd = argv([
        config.rg_bin.as_str(),
        "--line-number",
        "--no-heading",
        "--color",
        "never",
        "--max-count",
        max_count.as_str(),
        "--",
        text,
        ".",
    ]);
    match runner.run(&cmd, repo_root, config.search_timeout()) {
        Ok(stdout) => parse_rg_output(&stdout, limit),
        Err(err) => {
            debug!("content search unavailable: {err}");
            Vec::new()
        }
    }
}

/// Parses `path:line:snippet` lines, skipping anything else.
pub fn parse_rg_output(stdout: &str, limit: usize) -> Vec<ContentHit> {
    let mut hits = Vec::new();
    for line in stdout.lines() {
        if hits.len() >= limit {
            break;
        }
        let mut parts = line.splitn(3, ':');
        let (Some(path), Some(line_no), Some(snippet)) = (parts.next(), parts.next(), parts.next())
        else {
            continue;
        };
        let Ok(line_no) = line_no.trim().parse::<u32>() else {
            continue;
        };
        hits.push(ContentHit {
            file: util::normalize_path(Path::new(path)),
            line: line_no,
            snippet: snippet.trim().to_string(),
        });
    }
    hits
}

/// Broad candidate search for grounding a free-text task in source locations.
///
/// Keeps at most five non-stop-word tokens of three or more characters and
/// ORs them together. `None` when there is no index or nothing to search for.
pub fn suggest(
    index: &RepoIndex,
    config: &Config,
    task_text: &str,
    limit: usize,
) -> Option<Vec<Symbol>> {
    let tokens = suggest_tokens(task_text);
    if tokens.is_empty() {
        return None;
    }
    let store = Store::open_existing(index.db_path(), config.busy_timeout())
        .ok()
        .flatten()?;
    let expr = tokens.join(" OR ");
    match store.search(&expr, limit) {
        Ok(hits) => Some(hits),
        Err(err) => {
            debug!("suggest query {expr:?} failed: {err}");
            None
        }
    }
}

pub fn suggest_tokens(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.split(|ch: char| !(ch.is_alphanumeric() || ch == '_'))
        .map(|token| token.trim_matches('_').to_lowercase())
        .filter(|token| token.chars().count() >= SUGGEST_MIN_TOKEN_LEN)
        .filter(|token| !STOP_WORDS.contains(&token.as_str()))
        .filter(|token| seen.insert(token.clone()))
        .take(SUGGEST_MAX_TOKENS)
        .collect()
}
