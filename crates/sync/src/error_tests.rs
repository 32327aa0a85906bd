// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use yare::parameterized;

#[parameterized(
    transport = { SyncError::Transport("connection reset".into()), true },
    request_timeout = { SyncError::Server { status: 408 }, true },
    throttled = { SyncError::Server { status: 429 }, true },
    internal = { SyncError::Server { status: 500 }, true },
    unavailable = { SyncError::Server { status: 503 }, true },
    bad_request = { SyncError::Server { status: 400 }, false },
    unauthorized = { SyncError::Server { status: 401 }, false },
    conflict = { SyncError::Server { status: 409 }, false },
    store = { SyncError::Store(sk_core::Error::NotFound("x".into())), false },
)]
fn retryable(err: SyncError, expected: bool) {
    assert_eq!(err.is_retryable(), expected);
}

#[test]
fn serialization_is_not_retryable() {
    let err: SyncError = serde_json::from_str::<()>("nope").unwrap_err().into();
    assert!(!err.is_retryable());
}

#[test]
fn server_error_display_has_status() {
    assert!(SyncError::Server { status: 502 }.to_string().contains("502"));
}
