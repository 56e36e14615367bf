//! Agent store schema and queries
//!
//! Every agent store carries the same versioned schema. Reads here are
//! exact-match only; there is no search over log text.

use crate::error::Result;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection to an agent store, opened for one call and closed on drop
pub type StoreHandle = Connection;

/// Insert a first occurrence
pub(crate) const SQL_INSERT_PM: &str =
    "INSERT INTO pm_event (date_first, date_last, log, pci_dss, cis) VALUES (?1, ?2, ?3, ?4, ?5)";

/// Advance the last-seen date of an existing finding, never backwards
pub(crate) const SQL_UPDATE_PM: &str =
    "UPDATE pm_event SET date_last = MAX(date_last, ?1) WHERE log = ?2";

const SQL_SELECT_COLUMNS: &str = "SELECT id, date_first, date_last, log, pci_dss, cis FROM pm_event";

/// One deduplicated policy monitoring finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: i64,
    pub date_first: i64,
    pub date_last: i64,
    pub log: String,
    pub pci_dss: Option<String>,
    pub cis: Option<String>,
}

impl EventRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            date_first: row.get(1)?,
            date_last: row.get(2)?,
            log: row.get(3)?,
            pci_dss: row.get(4)?,
            cis: row.get(5)?,
        })
    }
}

/// Apply per-connection settings
pub fn configure(conn: &Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    conn.busy_timeout(busy_timeout)?;
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        ",
    )
}

fn schema_version(conn: &Connection) -> rusqlite::Result<i32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM _migrations",
        [],
        |row| row.get(0),
    )
}

/// Run schema migrations
///
/// Pending migrations are applied under one immediate transaction, so
/// concurrent openers of a new store serialize and the later one sees the
/// schema already in place.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    if schema_version(conn).unwrap_or(0) >= MIGRATIONS.len() as i32 {
        return Ok(());
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    tx.execute(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        )",
        [],
    )?;

    let current_version = schema_version(&tx)?;

    for (version, migration) in MIGRATIONS.iter().enumerate() {
        let version = version as i32 + 1;

        if version > current_version {
            tracing::debug!("Applying agent store migration {}", version);

            tx.execute_batch(migration)?;

            tx.execute(
                "INSERT INTO _migrations (version, applied_at) VALUES (?1, datetime('now'))",
                params![version],
            )?;
        }
    }

    tx.commit()?;
    Ok(())
}

/// Exact-match lookup by log text, oldest record first on duplicates
pub fn find_by_log(conn: &Connection, log: &str) -> Result<Option<EventRecord>> {
    let sql = format!("{} WHERE log = ?1 ORDER BY id ASC LIMIT 1", SQL_SELECT_COLUMNS);
    let record = conn
        .query_row(&sql, params![log], EventRecord::from_row)
        .optional()?;
    Ok(record)
}

/// Most recently seen findings first
pub fn list_events(conn: &Connection, limit: usize) -> Result<Vec<EventRecord>> {
    let sql = format!(
        "{} ORDER BY date_last DESC, id DESC LIMIT ?1",
        SQL_SELECT_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let records = stmt
        .query_map(params![limit as i64], EventRecord::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(records)
}

pub fn count_events(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM pm_event", [], |row| row.get(0))?;
    Ok(count as usize)
}

/// Agent store migrations (each string is one migration)
const MIGRATIONS: &[&str] = &[
    // Migration 1: policy monitoring events
    r#"
    CREATE TABLE pm_event (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date_first INTEGER NOT NULL,
        date_last INTEGER NOT NULL,
        log TEXT NOT NULL,
        pci_dss TEXT,
        cis TEXT
    );

    CREATE INDEX idx_pm_event_log ON pm_event(log);
    CREATE INDEX idx_pm_event_date_last ON pm_event(date_last);
    "#,
];
