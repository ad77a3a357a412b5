use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_KIND: &str = "symbol";

#[derive(Debug, Serialize, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol {
    pub name: String,
    pub file: String,
    pub line: u32,
    pub kind: String,
}

/// Outcome of parsing one raw tag line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedTag {
    Parsed(Symbol),
    Skipped,
}

impl ParsedTag {
    pub fn into_symbol(self) -> Option<Symbol> {
        match self {
            ParsedTag::Parsed(symbol) => Some(symbol),
            ParsedTag::Skipped => None,
        }
    }
}

#[derive(Debug, Serialize, Clone, Default)]
pub struct QueryResult {
    pub hits: Vec<Symbol>,
    #[serde(serialize_with = "serialize_millis", rename = "elapsed_ms")]
    pub elapsed: Duration,
}

/// One line of raw content-search output.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ContentHit {
    pub file: String,
    pub line: u32,
    pub snippet: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct IndexStats {
    pub symbols: usize,
    pub files: usize,
    pub size_bytes: u64,
    pub db_path: String,
}

impl IndexStats {
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / (1024.0 * 1024.0)
    }
}

fn serialize_millis<S>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_f64(elapsed.as_secs_f64() * 1000.0)
}
