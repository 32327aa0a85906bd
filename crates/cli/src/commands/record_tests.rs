// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::commands::testing::{t0, TestContext};
use sk_core::StoreConfig;
use yare::parameterized;

#[test]
fn records_payload_with_generated_session_id() {
    let mut ctx = TestContext::new();
    let id = run_impl(&mut ctx.store, r#"{"steps": 1200, "tags": ["am"]}"#, None, None).unwrap();

    let record = ctx.store.get(id).unwrap();
    assert!(record.session_id().starts_with(&format!("session_{}_", t0().timestamp())));
    assert_eq!(record.timestamp(), t0());
    assert_eq!(record.payload().get("steps").and_then(Value::as_i64), Some(1200));
    assert!(!record.synced());
}

#[test]
fn records_explicit_ids() {
    let mut ctx = TestContext::new();
    let id = run_impl(&mut ctx.store, "{}", Some("run-7".into()), Some("u-42".into())).unwrap();

    let record = ctx.store.get(id).unwrap();
    assert_eq!(record.session_id(), "run-7");
    assert_eq!(record.user_id(), Some("u-42"));
}

#[parameterized(
    empty = { "" },
    truncated = { r#"{"steps": "# },
    bare_word = { "steps" },
)]
fn rejects_malformed_json(payload: &str) {
    let mut ctx = TestContext::new();
    let err = run_impl(&mut ctx.store, payload, None, None).unwrap_err();
    assert!(matches!(err, Error::InvalidPayload(_)), "{err}");
    assert_eq!(ctx.store.stats().unwrap().total_sessions, 0);
}

#[parameterized(
    number = { "42" },
    string = { r#""hello""# },
    null = { "null" },
    list = { "[1, 2, 3]" },
)]
fn accepts_any_json_document(payload: &str) {
    let mut ctx = TestContext::new();
    run_impl(&mut ctx.store, payload, None, None).unwrap();
    assert_eq!(ctx.store.stats().unwrap().total_sessions, 1);
}

#[test]
fn reject_overflow_surfaces_capacity_error() {
    let mut ctx = TestContext::with_store_config(StoreConfig {
        max_size_bytes: 16,
        low_water_ratio: 0.8,
        overflow: sk_core::OverflowPolicy::Reject,
    });
    let err = run_impl(&mut ctx.store, r#"{"text": "far more than sixteen bytes"}"#, None, None)
        .unwrap_err();
    assert!(matches!(err, Error::Store(sk_core::Error::CapacityExceeded { .. })), "{err}");
}
