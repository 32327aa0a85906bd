// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use chrono::TimeZone;
use serde_json::json;

fn record() -> SessionRecord {
    let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 5).unwrap()
        + chrono::Duration::microseconds(250);
    SessionRecord::new_at(
        "session_1772368205_ab12cd34",
        Some("user-1".into()),
        Value::map([("kind", Value::from("ride")), ("km", Value::from(42.5))]),
        at,
    )
    .unwrap()
}

#[test]
fn upload_body_shape() {
    let record = record();
    let body: serde_json::Value = serde_json::from_slice(&encode_upload(&record).unwrap()).unwrap();
    assert_eq!(
        body,
        json!({
            "sessionId": "session_1772368205_ab12cd34",
            "data": {"kind": "ride", "km": 42.5},
            "timestamp": "2026-03-01T12:30:05Z",
            "localId": record.id().to_string(),
        })
    );
}

#[test]
fn user_id_is_not_sent() {
    let body: serde_json::Value =
        serde_json::from_slice(&encode_upload(&record()).unwrap()).unwrap();
    assert!(body.get("userId").is_none());
}

#[test]
fn batch_body_wraps_sessions_in_order() {
    let a = record();
    let b = SessionRecord::new_at("second", None, Value::Null, a.timestamp()).unwrap();
    let body: serde_json::Value =
        serde_json::from_slice(&encode_batch(&[a.clone(), b.clone()]).unwrap()).unwrap();

    let sessions = body["sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0]["localId"], json!(a.id().to_string()));
    assert_eq!(sessions[1]["sessionId"], json!("second"));
    assert_eq!(sessions[1]["data"], json!(null));
}
