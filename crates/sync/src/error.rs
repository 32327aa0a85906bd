// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for sync operations.

/// Error type for uploads and sync runs.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status.
    #[error("server returned HTTP {status}")]
    Server { status: u16 },

    /// The upload body could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The local store failed.
    #[error("store error: {0}")]
    Store(#[from] sk_core::Error),
}

impl SyncError {
    /// Whether another attempt might succeed.
    ///
    /// Transport failures, timeouts, throttling and server-side errors are
    /// transient; other client errors and encoding failures are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Transport(_) => true,
            SyncError::Server { status } => matches!(status, 408 | 429 | 500..=599),
            SyncError::Serialization(_) | SyncError::Store(_) => false,
        }
    }
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
