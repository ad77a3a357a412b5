use crate::indexer::parse;
use crate::model::Symbol;
use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags, Row, params};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

mod schema;

/// The FTS5-backed symbol table under `.scout/index.db`.
pub struct Store {
    db_path: PathBuf,
    conn: Connection,
}

impl Store {
    /// Opens (creating if needed) the store for writing. Lock contention waits
    /// up to `busy_timeout` before failing.
    pub fn open(db_path: &Path, busy_timeout: Duration) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create db directory {}", parent.display()))?;
        }
        let conn = Connection::open(db_path)
            .with_context(|| format!("open sqlite db at {}", db_path.display()))?;
        Self::configure(db_path, conn, busy_timeout)
    }

    /// Opens an existing store read-only. `None` when there is no index yet.
    pub fn open_existing(db_path: &Path, busy_timeout: Duration) -> Result<Option<Self>> {
        if !db_path.is_file() {
            return Ok(None);
        }
        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("open sqlite db at {}", db_path.display()))?;
        Self::configure(db_path, conn, busy_timeout).map(Some)
    }

    fn configure(db_path: &Path, conn: Connection, busy_timeout: Duration) -> Result<Self> {
        conn.busy_timeout(busy_timeout)?;
        Ok(Self {
            db_path: db_path.to_path_buf(),
            conn,
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Drop-if-exists then create. Idempotent.
    pub fn create_schema(&self) -> Result<()> {
        schema::recreate(&self.conn).context("create symbols table")
    }

    /// Parses `tags_path` and inserts every valid record in one transaction.
    /// An unreadable tag file loads nothing.
    pub fn bulk_load(&mut self, tags_path: &Path, repo_root: &Path) -> Result<usize> {
        let Some(content) = read_tags(tags_path) else {
            return Ok(0);
        };
        let tx = self.conn.transaction()?;
        let count = insert_tags(&tx, &content, repo_root)?;
        tx.commit()?;
        debug!(count, "bulk load committed");
        Ok(count)
    }

    /// Schema drop, create and bulk insert as a single transaction, so a reader
    /// sees either the previous table or the complete new one.
    pub fn rebuild(&mut self, tags_path: Option<&Path>, repo_root: &Path) -> Result<usize> {
        let content = tags_path.and_then(read_tags);
        let tx = self.conn.transaction()?;
        schema::recreate(&tx).context("recreate symbols table")?;
        let count = match content {
            Some(content) => insert_tags(&tx, &content, repo_root)?,
            None => 0,
        };
        tx.commit()?;
        Ok(count)
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM symbols", [], |row| row.get(0))
            .context("count symbols")?;
        Ok(count as usize)
    }

    pub fn file_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(DISTINCT file) FROM symbols", [], |row| {
                row.get(0)
            })
            .context("count files")?;
        Ok(count as usize)
    }

    /// Runs a raw FTS5 match expression. Syntax errors come back as the
    /// underlying SQLite error so callers can decide how to retry.
    pub fn search(&self, match_expr: &str, limit: usize) -> rusqlite::Result<Vec<Symbol>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT name, file, CAST(line AS INTEGER), kind
             FROM symbols
             WHERE symbols MATCH ?1
             ORDER BY rank, file, CAST(line AS INTEGER)
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![match_expr, limit as i64], symbol_from_row)?;
        rows.collect()
    }

    /// Every stored symbol in a stable order.
    pub fn all_symbols(&self) -> Result<Vec<Symbol>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, file, CAST(line AS INTEGER), kind
             FROM symbols
             ORDER BY file, CAST(line AS INTEGER), name, kind",
        )?;
        let rows = stmt.query_map([], symbol_from_row)?;
        let mut symbols = Vec::new();
        for row in rows {
            symbols.push(row?);
        }
        Ok(symbols)
    }

    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, err)| err)
            .with_context(|| format!("close {}", self.db_path.display()))
    }
}

fn read_tags(tags_path: &Path) -> Option<String> {
    match std::fs::read(tags_path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(err) => {
            warn!("read {}: {err}", tags_path.display());
            None
        }
    }
}

fn insert_tags(conn: &Connection, content: &str, repo_root: &Path) -> Result<usize> {
    let mut stmt = conn
        .prepare_cached("INSERT INTO symbols (name, file, line, kind) VALUES (?1, ?2, ?3, ?4)")?;
    let mut count = 0;
    for line in content.lines() {
        let Some(symbol) = parse::parse_line(line, repo_root).into_symbol() else {
            continue;
        };
        stmt.execute(params![symbol.name, symbol.file, symbol.line, symbol.kind])?;
        count += 1;
    }
    Ok(count)
}

fn symbol_from_row(row: &Row<'_>) -> rusqlite::Result<Symbol> {
    let line: i64 = row.get(2)?;
    Ok(Symbol {
        name: row.get(0)?,
        file: row.get(1)?,
        line: u32::try_from(line).unwrap_or(0),
        kind: row.get(3)?,
    })
}
