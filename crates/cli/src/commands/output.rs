// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Text and JSON rendering shared by the commands.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use sk_core::{SessionRecord, StorageStats, Value};
use sk_sync::SyncResult;

use crate::error::Result;

/// JSON shape of one stored session.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordView<'a> {
    pub id: String,
    pub session_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<&'a str>,
    pub timestamp: DateTime<Utc>,
    pub synced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synced_at: Option<DateTime<Utc>>,
    pub size_bytes: u64,
    pub data: &'a Value,
}

impl<'a> From<&'a SessionRecord> for RecordView<'a> {
    fn from(record: &'a SessionRecord) -> Self {
        RecordView {
            id: record.id().to_string(),
            session_id: record.session_id(),
            user_id: record.user_id(),
            timestamp: record.timestamp(),
            synced: record.synced(),
            synced_at: record.synced_at(),
            size_bytes: record.size_bytes(),
            data: record.payload(),
        }
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn records_json(records: &[SessionRecord]) -> Vec<RecordView<'_>> {
    records.iter().map(RecordView::from).collect()
}

/// Human-readable byte count.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// One line per record: id, time, session, user, size, sync state.
pub fn format_record_line(record: &SessionRecord) -> String {
    format!(
        "{}  {}  {}  {}  {}  {}",
        record.id(),
        record.timestamp().to_rfc3339_opts(SecondsFormat::Secs, true),
        record.session_id(),
        record.user_id().unwrap_or("-"),
        format_bytes(record.size_bytes()),
        if record.synced() { "synced" } else { "pending" },
    )
}

pub fn format_stats(stats: &StorageStats) -> String {
    format!(
        "sessions: {} ({} unsynced)\nsize:     {} of {} ({:.1}%)",
        stats.total_sessions,
        stats.unsynced_sessions,
        format_bytes(stats.total_size_bytes),
        format_bytes(stats.max_size_bytes),
        stats.usage_percentage,
    )
}

pub fn format_sync_result(result: &SyncResult) -> String {
    if result.attempted() == 0 {
        return "nothing to sync".to_string();
    }
    let mut out = format!("synced {}, failed {}", result.successful, result.failed);
    for failure in &result.errors {
        out.push_str(&format!("\n  {}: {}", failure.session_id, failure.error_message));
    }
    out
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
