// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// All possible errors that can occur in the skrs library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] sk_core::Error),

    #[error(transparent)]
    Sync(#[from] sk_sync::SyncError),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid payload: {0}\n  hint: payloads are JSON documents, e.g. '{{\"steps\": 120}}'")]
    InvalidPayload(String),

    #[error("invalid timestamp: '{0}'\n  hint: use RFC 3339, e.g. 2026-03-01T12:00:00Z")]
    InvalidTimestamp(String),

    #[error("store is in use by another sk process: {0}")]
    AlreadyRunning(String),

    #[error("sync endpoint not configured\n  hint: set sync.api_base_url in {0}")]
    NotConfigured(String),

    #[error("offline: connectivity probe to {0} failed")]
    Offline(String),

    #[error("{failed} session(s) failed to sync and remain queued")]
    SyncIncomplete { failed: usize },

    #[error("{0}")]
    InvalidInput(String),
}

/// A specialized Result type for skrs operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
