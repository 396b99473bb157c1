//! SQLite-backed persistence for deferred work.
//! Pending schedules survive restarts; one row per unique key.

use beacon_core::BeaconError;
use beacon_core::error::Result;
use beacon_core::traits::{WorkData, WorkKind, WorkRequest};
use chrono::{DateTime, Utc};
use std::path::Path;

use crate::work::WorkItem;

/// SQLite-backed store for pending work items.
pub struct WorkDb {
    conn: rusqlite::Connection,
}

fn db_err(context: &str) -> impl Fn(rusqlite::Error) -> BeaconError + '_ {
    move |e| BeaconError::Scheduler(format!("{context}: {e}"))
}

fn parse_time(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

impl WorkDb {
    /// Open or create the work database.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = rusqlite::Connection::open(path).map_err(db_err("DB open"))?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Throwaway store that lives as long as the connection.
    pub fn open_in_memory() -> Result<Self> {
        let conn = rusqlite::Connection::open_in_memory().map_err(db_err("DB open"))?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "
            CREATE TABLE IF NOT EXISTS deferred_work (
                unique_key TEXT PRIMARY KEY,
                tag TEXT NOT NULL,
                kind TEXT NOT NULL,              -- JSON: {kind: one_shot} or {kind: periodic, interval_minutes}
                initial_delay_secs INTEGER NOT NULL,
                data TEXT NOT NULL,              -- JSON object of strings
                created_at TEXT NOT NULL,
                next_run TEXT NOT NULL,
                last_run TEXT,
                run_count INTEGER NOT NULL DEFAULT 0
            );
            CREATE INDEX IF NOT EXISTS idx_deferred_work_tag ON deferred_work(tag);
         ",
            )
            .map_err(db_err("Migration"))?;
        Ok(())
    }

    /// Insert or replace the row for `item.request.unique_key`.
    pub fn save(&self, item: &WorkItem) -> Result<()> {
        let request = &item.request;
        self.conn
            .execute(
                "INSERT OR REPLACE INTO deferred_work
                 (unique_key, tag, kind, initial_delay_secs, data, created_at, next_run, last_run, run_count)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                rusqlite::params![
                    request.unique_key,
                    request.tag,
                    serde_json::to_string(&request.kind)?,
                    request.initial_delay_secs as i64,
                    serde_json::to_string(&request.data)?,
                    item.created_at.to_rfc3339(),
                    item.next_run.to_rfc3339(),
                    item.last_run.map(|t| t.to_rfc3339()),
                    item.run_count,
                ],
            )
            .map_err(db_err("Save work"))?;
        Ok(())
    }

    /// Delete one item. Returns whether a row existed.
    pub fn delete(&self, unique_key: &str) -> Result<bool> {
        let n = self
            .conn
            .execute(
                "DELETE FROM deferred_work WHERE unique_key = ?1",
                rusqlite::params![unique_key],
            )
            .map_err(db_err("Delete work"))?;
        Ok(n > 0)
    }

    /// Delete every item carrying `tag`. Returns the number removed.
    pub fn delete_by_tag(&self, tag: &str) -> Result<usize> {
        self.conn
            .execute(
                "DELETE FROM deferred_work WHERE tag = ?1",
                rusqlite::params![tag],
            )
            .map_err(db_err("Delete by tag"))
    }

    /// Load every stored item, oldest first. Rows that no longer decode
    /// are skipped with a warning.
    pub fn load_all(&self) -> Result<Vec<WorkItem>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT unique_key, tag, kind, initial_delay_secs, data, created_at, next_run, last_run, run_count
                 FROM deferred_work ORDER BY created_at",
            )
            .map_err(db_err("Load work"))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(RawRow {
                    unique_key: row.get(0)?,
                    tag: row.get(1)?,
                    kind: row.get(2)?,
                    initial_delay_secs: row.get(3)?,
                    data: row.get(4)?,
                    created_at: row.get(5)?,
                    next_run: row.get(6)?,
                    last_run: row.get(7)?,
                    run_count: row.get(8)?,
                })
            })
            .map_err(db_err("Load work"))?;

        let mut items = Vec::new();
        for row in rows {
            let raw = row.map_err(db_err("Read row"))?;
            let key = raw.unique_key.clone();
            match raw.into_item() {
                Some(item) => items.push(item),
                None => tracing::warn!("⚠️ Skipping undecodable work row '{key}'"),
            }
        }
        Ok(items)
    }
}

struct RawRow {
    unique_key: String,
    tag: String,
    kind: String,
    initial_delay_secs: i64,
    data: String,
    created_at: String,
    next_run: String,
    last_run: Option<String>,
    run_count: u32,
}

impl RawRow {
    fn into_item(self) -> Option<WorkItem> {
        let kind: WorkKind = serde_json::from_str(&self.kind).ok()?;
        let data: WorkData = serde_json::from_str(&self.data).ok()?;
        Some(WorkItem {
            request: WorkRequest {
                unique_key: self.unique_key,
                tag: self.tag,
                kind,
                initial_delay_secs: self.initial_delay_secs.max(0) as u64,
                data,
            },
            created_at: parse_time(&self.created_at)?,
            next_run: parse_time(&self.next_run)?,
            last_run: self.last_run.as_deref().and_then(parse_time),
            run_count: self.run_count,
        })
    }
}
