// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for sk-core operations.

use thiserror::Error;

/// All possible errors that can occur in sk-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("session record not found: {0}")]
    NotFound(String),

    #[error("duplicate session record: {0}")]
    DuplicateRecord(String),

    #[error("invalid record id: '{0}'\n  hint: record ids are hyphenated UUIDs")]
    InvalidId(String),

    #[error("payload could not be serialized: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] rusqlite::Error),

    #[error(
        "storage capacity exceeded: {used_bytes} of {max_bytes} bytes in use\n  hint: sync pending sessions to free space"
    )]
    CapacityExceeded { used_bytes: u64, max_bytes: u64 },

    #[error("invalid store configuration: {0}")]
    InvalidConfig(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

/// A specialized Result type for sk-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
