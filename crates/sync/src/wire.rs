// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! JSON bodies sent to the remote session service.
//!
//! Single upload: `POST /sessions`
//! ```json
//! {"sessionId": "...", "data": {...}, "timestamp": "2026-03-01T12:00:00Z", "localId": "..."}
//! ```
//! Batch upload: `POST /sessions/batch` with `{"sessions": [<single upload>, ...]}`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use sk_core::{SessionRecord, Value};

use crate::error::Result;

/// Path for single-record uploads.
pub const SESSIONS_PATH: &str = "/sessions";
/// Path for batch uploads.
pub const BATCH_PATH: &str = "/sessions/batch";

fn iso8601<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Upload body for one record.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPayload<'a> {
    pub session_id: &'a str,
    pub data: &'a Value,
    #[serde(serialize_with = "iso8601")]
    pub timestamp: DateTime<Utc>,
    pub local_id: String,
}

impl<'a> From<&'a SessionRecord> for UploadPayload<'a> {
    fn from(record: &'a SessionRecord) -> Self {
        UploadPayload {
            session_id: record.session_id(),
            data: record.payload(),
            timestamp: record.timestamp(),
            local_id: record.id().to_string(),
        }
    }
}

/// Upload body for several records at once.
#[derive(Debug, Serialize)]
pub struct BatchPayload<'a> {
    pub sessions: Vec<UploadPayload<'a>>,
}

/// Encode the body for `POST /sessions`.
pub fn encode_upload(record: &SessionRecord) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&UploadPayload::from(record))?)
}

/// Encode the body for `POST /sessions/batch`.
pub fn encode_batch(records: &[SessionRecord]) -> Result<Vec<u8>> {
    let batch = BatchPayload { sessions: records.iter().map(UploadPayload::from).collect() };
    Ok(serde_json::to_vec(&batch)?)
}

#[cfg(test)]
#[path = "wire_tests.rs"]
mod tests;
