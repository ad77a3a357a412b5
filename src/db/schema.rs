use anyhow::Result;
use rusqlite::Connection;

/// Drops and recreates the symbol table. Always leaves it empty.
pub fn recreate(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        DROP TABLE IF EXISTS symbols;
        CREATE VIRTUAL TABLE symbols USING fts5(
            name,
            file,
            line UNINDEXED,
            kind
        );
        ",
    )?;
    Ok(())
}
