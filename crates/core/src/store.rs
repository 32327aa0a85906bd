// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed bounded session store.
//!
//! The [`SessionStore`] keeps every captured [`SessionRecord`] until it is
//! deleted or, once synced, evicted to stay under the configured capacity.
//! Unsynced records are never evicted.
//!
//! Mutating operations take `&mut self`; share a store between tasks behind
//! a mutex so that exactly one writer runs at a time.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::record::{RecordId, SessionRecord};
use crate::value::Value;

/// Default capacity ceiling: 50 MiB of encoded payload.
pub const DEFAULT_MAX_SIZE_BYTES: u64 = 50 * 1024 * 1024;

/// Eviction stops once usage is at or below this fraction of capacity.
pub const DEFAULT_LOW_WATER_RATIO: f64 = 0.8;

/// SQL schema for the session store.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL,
    user_id TEXT,
    payload TEXT NOT NULL,
    timestamp TEXT NOT NULL,     -- RFC 3339, fixed microsecond width
    synced INTEGER NOT NULL DEFAULT 0,
    synced_at TEXT,
    size_bytes INTEGER NOT NULL,
    CHECK (synced IN (0, 1)),
    CHECK (synced = (synced_at IS NOT NULL)),
    CHECK (size_bytes >= 0)
);

CREATE INDEX IF NOT EXISTS idx_sessions_timestamp ON sessions(timestamp);
CREATE INDEX IF NOT EXISTS idx_sessions_synced ON sessions(synced, timestamp);
CREATE INDEX IF NOT EXISTS idx_sessions_session_id ON sessions(session_id);
CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);
"#;

const COLUMNS: &str = "id, session_id, user_id, payload, timestamp, synced_at, size_bytes";

/// What to do when unsynced data alone exceeds capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Keep the record and log a warning.
    #[default]
    Allow,
    /// Roll the save back with [`Error::CapacityExceeded`].
    Reject,
}

/// Capacity settings for a [`SessionStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub max_size_bytes: u64,
    pub low_water_ratio: f64,
    pub overflow: OverflowPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
            low_water_ratio: DEFAULT_LOW_WATER_RATIO,
            overflow: OverflowPolicy::default(),
        }
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_size_bytes == 0 {
            return Err(Error::InvalidConfig("max_size_bytes must be greater than zero".into()));
        }
        if !(self.low_water_ratio > 0.0 && self.low_water_ratio <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "low_water_ratio must be in (0, 1], got {}",
                self.low_water_ratio
            )));
        }
        Ok(())
    }

    /// Size eviction shrinks the store down to.
    pub fn low_water_bytes(&self) -> u64 {
        (self.max_size_bytes as f64 * self.low_water_ratio).floor() as u64
    }
}

/// Point-in-time usage summary, derived from the stored rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageStats {
    pub total_sessions: u64,
    pub unsynced_sessions: u64,
    pub total_size_bytes: u64,
    pub max_size_bytes: u64,
    pub usage_percentage: f64,
}

/// Format a timestamp so that lexical order matches chronological order.
fn stamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a string value from the database.
fn parse_db<T: std::str::FromStr>(value: &str, column: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::CorruptedData(format!("invalid value '{value}' in column '{column}'")))
}

/// Parse an RFC3339 timestamp from the database.
fn parse_timestamp(value: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc)).map_err(|_| {
        Error::CorruptedData(format!("invalid timestamp '{value}' in column '{column}'"))
    })
}

/// Columns of one `sessions` row, not yet decoded.
struct StoredRow {
    id: String,
    session_id: String,
    user_id: Option<String>,
    payload: String,
    timestamp: String,
    synced_at: Option<String>,
    size_bytes: i64,
}

impl StoredRow {
    fn read(row: &Row<'_>) -> std::result::Result<Self, rusqlite::Error> {
        Ok(StoredRow {
            id: row.get(0)?,
            session_id: row.get(1)?,
            user_id: row.get(2)?,
            payload: row.get(3)?,
            timestamp: row.get(4)?,
            synced_at: row.get(5)?,
            size_bytes: row.get(6)?,
        })
    }

    /// Fails with [`Error::CorruptedData`] if any column does not decode.
    fn decode(self) -> Result<SessionRecord> {
        let payload = Value::decode(&self.payload).map_err(|e| {
            Error::CorruptedData(format!("invalid payload for '{}': {}", self.id, e))
        })?;
        let synced_at = self.synced_at.map(|s| parse_timestamp(&s, "synced_at")).transpose()?;
        let size_bytes = u64::try_from(self.size_bytes)
            .map_err(|_| Error::CorruptedData(format!("negative size_bytes for '{}'", self.id)))?;

        Ok(SessionRecord::restore(
            parse_db(&self.id, "id")?,
            self.session_id,
            self.user_id,
            payload,
            parse_timestamp(&self.timestamp, "timestamp")?,
            synced_at,
            size_bytes,
        ))
    }
}

fn total_size(conn: &Connection) -> Result<u64> {
    let total: i64 =
        conn.query_row("SELECT COALESCE(SUM(size_bytes), 0) FROM sessions", [], |row| row.get(0))?;
    Ok(total.max(0) as u64)
}

/// Evict synced records, oldest first, until usage reaches the low-water mark.
///
/// Does nothing unless usage is above capacity. Returns the number of
/// records removed.
fn evict_synced(conn: &Connection, config: &StoreConfig) -> Result<usize> {
    let mut used = total_size(conn)?;
    if used <= config.max_size_bytes {
        return Ok(0);
    }

    let target = config.low_water_bytes();
    let mut evicted = 0;
    while used > target {
        let oldest: Option<String> = conn
            .query_row(
                "SELECT id FROM sessions WHERE synced = 1
                 ORDER BY timestamp ASC, rowid ASC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        let Some(id) = oldest else {
            break;
        };
        conn.execute("DELETE FROM sessions WHERE id = ?1", params![id])?;
        evicted += 1;
        used = total_size(conn)?;
        debug!(id = %id, used, target, "evicted synced session");
    }
    Ok(evicted)
}

/// Run schema creation on a database connection.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Durable bounded storage for session records.
pub struct SessionStore {
    conn: Connection,
    config: StoreConfig,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("path", &self.conn.path())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Open a store at the given path, creating and migrating if needed.
    pub fn open(path: &Path, config: StoreConfig) -> Result<Self> {
        config.validate()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = FULL;
             PRAGMA busy_timeout = 5000;",
        )?;
        run_migrations(&conn)?;
        Ok(SessionStore { conn, config, clock: Arc::new(SystemClock) })
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(SessionStore { conn, config, clock: Arc::new(SystemClock) })
    }

    /// Replace the clock used to stamp `synced_at`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Persist a record, then enforce capacity.
    ///
    /// The insert and any eviction it causes commit together. Under
    /// [`OverflowPolicy::Reject`] a save that leaves the store above capacity
    /// is rolled back entirely.
    pub fn save(&mut self, record: &SessionRecord) -> Result<RecordId> {
        let payload = record.payload().encode()?;
        let tx = self.conn.transaction()?;

        let inserted = tx.execute(
            "INSERT INTO sessions (id, session_id, user_id, payload, timestamp,
             synced, synced_at, size_bytes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                record.id().to_string(),
                record.session_id(),
                record.user_id(),
                payload,
                stamp(record.timestamp()),
                record.synced(),
                record.synced_at().map(stamp),
                record.size_bytes() as i64,
            ],
        );
        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                return Err(Error::DuplicateRecord(record.id().to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        let evicted = evict_synced(&tx, &self.config)?;
        let used = total_size(&tx)?;
        if used > self.config.max_size_bytes {
            match self.config.overflow {
                OverflowPolicy::Reject => {
                    return Err(Error::CapacityExceeded {
                        used_bytes: used,
                        max_bytes: self.config.max_size_bytes,
                    });
                }
                OverflowPolicy::Allow => warn!(
                    used,
                    max = self.config.max_size_bytes,
                    "unsynced sessions exceed storage capacity"
                ),
            }
        }
        tx.commit()?;

        if evicted > 0 {
            info!(evicted, used, "evicted synced sessions to reclaim space");
        }
        Ok(record.id())
    }

    /// Get a record by id.
    ///
    /// A row that no longer decodes is [`Error::CorruptedData`].
    pub fn get(&self, id: RecordId) -> Result<SessionRecord> {
        self.conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM sessions WHERE id = ?1"),
                params![id.to_string()],
                StoredRow::read,
            )
            .optional()?
            .ok_or_else(|| Error::NotFound(id.to_string()))?
            .decode()
    }

    /// All unsynced records, oldest first.
    ///
    /// Rows that fail to decode are logged and left out, so one damaged
    /// record never blocks the rest of the queue.
    pub fn fetch_unsynced(&self) -> Result<Vec<SessionRecord>> {
        self.query_records(
            &format!(
                "SELECT {COLUMNS} FROM sessions WHERE synced = 0
                 ORDER BY timestamp ASC, rowid ASC"
            ),
            [],
        )
    }

    /// Up to `limit` records, most recent first.
    pub fn recent(&self, limit: usize) -> Result<Vec<SessionRecord>> {
        self.query_records(
            &format!("SELECT {COLUMNS} FROM sessions ORDER BY timestamp DESC, rowid DESC LIMIT ?1"),
            params![i64::try_from(limit).unwrap_or(i64::MAX)],
        )
    }

    /// Records whose session id or user id contains `query`, ignoring ASCII case.
    pub fn search(&self, query: &str) -> Result<Vec<SessionRecord>> {
        let escaped = query.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
        let pattern = format!("%{escaped}%");
        self.query_records(
            &format!(
                "SELECT {COLUMNS} FROM sessions
                 WHERE session_id LIKE ?1 ESCAPE '\\' OR user_id LIKE ?1 ESCAPE '\\'
                 ORDER BY timestamp DESC, rowid DESC"
            ),
            params![pattern],
        )
    }

    /// Records belonging to one user, most recent first.
    pub fn by_user(&self, user_id: &str) -> Result<Vec<SessionRecord>> {
        self.query_records(
            &format!(
                "SELECT {COLUMNS} FROM sessions WHERE user_id = ?1
                 ORDER BY timestamp DESC, rowid DESC"
            ),
            params![user_id],
        )
    }

    /// Records stamped within `[from, to]`, most recent first.
    pub fn in_range(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<SessionRecord>> {
        self.query_records(
            &format!(
                "SELECT {COLUMNS} FROM sessions WHERE timestamp >= ?1 AND timestamp <= ?2
                 ORDER BY timestamp DESC, rowid DESC"
            ),
            params![stamp(from), stamp(to)],
        )
    }

    /// Mark a record as acknowledged by the remote service.
    ///
    /// Returns `Ok(false)` if it was already synced; the original `synced_at`
    /// is kept.
    pub fn mark_synced(&mut self, id: RecordId) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE sessions SET synced = 1, synced_at = ?2 WHERE id = ?1 AND synced = 0",
            params![id.to_string(), stamp(self.clock.now())],
        )?;
        if changed > 0 {
            return Ok(true);
        }
        if self.exists(id)? {
            Ok(false)
        } else {
            Err(Error::NotFound(id.to_string()))
        }
    }

    /// Delete a record. Returns whether anything was removed.
    pub fn delete(&mut self, id: RecordId) -> Result<bool> {
        let removed =
            self.conn.execute("DELETE FROM sessions WHERE id = ?1", params![id.to_string()])?;
        Ok(removed > 0)
    }

    /// Delete every record carrying `session_id`.
    pub fn delete_session(&mut self, session_id: &str) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM sessions WHERE session_id = ?1", params![session_id])?)
    }

    pub fn delete_all(&mut self) -> Result<usize> {
        Ok(self.conn.execute("DELETE FROM sessions", [])?)
    }

    /// Run the eviction pass outside of a save.
    pub fn enforce_capacity(&mut self) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let evicted = evict_synced(&tx, &self.config)?;
        tx.commit()?;
        if evicted > 0 {
            info!(evicted, "evicted synced sessions to reclaim space");
        }
        Ok(evicted)
    }

    /// Compact the database file.
    pub fn vacuum(&mut self) -> Result<()> {
        self.conn.execute_batch("VACUUM")?;
        Ok(())
    }

    pub fn stats(&self) -> Result<StorageStats> {
        let (total, unsynced, size): (i64, i64, i64) = self.conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(CASE WHEN synced = 0 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(size_bytes), 0)
             FROM sessions",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;
        let total_size_bytes = size.max(0) as u64;
        let max_size_bytes = self.config.max_size_bytes;
        Ok(StorageStats {
            total_sessions: total.max(0) as u64,
            unsynced_sessions: unsynced.max(0) as u64,
            total_size_bytes,
            max_size_bytes,
            usage_percentage: total_size_bytes as f64 / max_size_bytes as f64 * 100.0,
        })
    }

    fn exists(&self, id: RecordId) -> Result<bool> {
        let found: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sessions WHERE id = ?1)",
            params![id.to_string()],
            |row| row.get(0),
        )?;
        Ok(found)
    }

    fn query_records<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Vec<SessionRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, StoredRow::read)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.id.clone();
            match row.decode() {
                Ok(record) => records.push(record),
                Err(e) => warn!(id = %id, error = %e, "skipping undecodable session"),
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
