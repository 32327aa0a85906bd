// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Session records.
//!
//! A [`SessionRecord`] is one captured event. Everything but its sync state
//! is fixed at creation; the sync state only moves from unsynced to synced
//! and only the store moves it.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::value::Value;

/// Locally generated record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    pub fn new() -> Self {
        RecordId(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for RecordId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s).map(RecordId).map_err(|_| Error::InvalidId(s.to_string()))
    }
}

/// Generates a session id of the form `session_<unix-seconds>_<8 hex>`.
pub fn generate_session_id(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("session_{}_{}", now.timestamp(), &suffix[..8])
}

/// A captured session event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    id: RecordId,
    session_id: String,
    user_id: Option<String>,
    payload: Value,
    timestamp: DateTime<Utc>,
    synced_at: Option<DateTime<Utc>>,
    size_bytes: u64,
}

impl SessionRecord {
    /// Creates an unsynced record stamped at `timestamp`, truncated to the
    /// microseconds the store keeps.
    ///
    /// The payload is encoded once here to fix `size_bytes`; a payload that
    /// cannot be encoded is rejected.
    pub fn new_at(
        session_id: impl Into<String>,
        user_id: Option<String>,
        payload: Value,
        timestamp: DateTime<Utc>,
    ) -> Result<Self> {
        let size_bytes = payload.encoded_len()?;
        Ok(SessionRecord {
            id: RecordId::new(),
            session_id: session_id.into(),
            user_id,
            payload,
            timestamp: timestamp.trunc_subsecs(6),
            synced_at: None,
            size_bytes,
        })
    }

    /// Creates a record, generating a session id when none is given.
    pub fn from_payload(
        payload: Value,
        session_id: Option<String>,
        user_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let session_id = session_id.unwrap_or_else(|| generate_session_id(now));
        Self::new_at(session_id, user_id, payload, now)
    }

    /// Rebuilds a record from persisted columns.
    pub(crate) fn restore(
        id: RecordId,
        session_id: String,
        user_id: Option<String>,
        payload: Value,
        timestamp: DateTime<Utc>,
        synced_at: Option<DateTime<Utc>>,
        size_bytes: u64,
    ) -> Self {
        SessionRecord { id, session_id, user_id, payload, timestamp, synced_at, size_bytes }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// True once the remote service has acknowledged this record.
    pub fn synced(&self) -> bool {
        self.synced_at.is_some()
    }

    pub fn synced_at(&self) -> Option<DateTime<Utc>> {
        self.synced_at
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
