use crate::config::DatabaseLocation;
use anyhow::{Context, Result};
use rusqlite::Connection;

/// Open the configured database (file or in-memory)
pub fn open_database(location: &DatabaseLocation) -> Result<Connection> {
    let conn = match location {
        DatabaseLocation::Memory => Connection::open_in_memory()?,
        DatabaseLocation::File(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create database directory {:?}", parent)
                    })?;
                }
            }
            Connection::open(path)
                .with_context(|| format!("Failed to open database at {:?}", path))?
        }
    };

    Ok(conn)
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL for crash recovery (in-memory databases stay in "memory" mode)
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // ==========================================================================
    // Data Types Table
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS data_types (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            description TEXT
        )",
        [],
    )?;

    // ==========================================================================
    // Data Entries Table (type is checked in code, no foreign key)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS data_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            type TEXT NOT NULL,
            value REAL NOT NULL
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_data_types_name ON data_types(name)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_data_entries_date ON data_entries(date)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_data_entries_type ON data_entries(type)",
        [],
    )?;

    Ok(())
}

/// Row count for one of our tables
pub fn count_rows(conn: &Connection, table: &str) -> Result<i64> {
    let sql = match table {
        "data_types" => "SELECT COUNT(*) FROM data_types",
        "data_entries" => "SELECT COUNT(*) FROM data_entries",
        other => anyhow::bail!("Unknown table: {}", other),
    };

    let count: i64 = conn.query_row(sql, [], |row| row.get(0))?;

    Ok(count)
}
