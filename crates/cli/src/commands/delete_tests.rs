// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::commands::testing::TestContext;

#[test]
fn deletes_single_record() {
    let mut ctx = TestContext::new();
    let a = ctx.add("a", None, 0);
    let b = ctx.add("b", None, 1);

    assert_eq!(run_impl(&mut ctx.store, &DeleteTarget::Record(a)).unwrap(), 1);
    assert!(ctx.store.get(a).is_err());
    assert!(ctx.store.get(b).is_ok());
}

#[test]
fn missing_record_is_not_found() {
    let mut ctx = TestContext::new();
    let err = run_impl(&mut ctx.store, &DeleteTarget::Record(RecordId::new())).unwrap_err();
    assert!(matches!(err, Error::Store(sk_core::Error::NotFound(_))));
}

#[test]
fn deletes_every_record_of_a_session() {
    let mut ctx = TestContext::new();
    ctx.add("run-1", None, 0);
    ctx.add("run-1", None, 1);
    ctx.add("run-2", None, 2);

    let removed = run_impl(&mut ctx.store, &DeleteTarget::Session("run-1".into())).unwrap();
    assert_eq!(removed, 2);
    assert_eq!(ctx.store.stats().unwrap().total_sessions, 1);

    let removed = run_impl(&mut ctx.store, &DeleteTarget::Session("nope".into())).unwrap();
    assert_eq!(removed, 0);
}

#[test]
fn deletes_everything_including_unsynced() {
    let mut ctx = TestContext::new();
    let a = ctx.add("a", None, 0);
    ctx.add("b", None, 1);
    ctx.mark_synced(a);

    assert_eq!(run_impl(&mut ctx.store, &DeleteTarget::All).unwrap(), 2);
    assert_eq!(ctx.store.stats().unwrap().total_sessions, 0);
}

#[test]
fn target_from_args() {
    let id = RecordId::new();
    assert_eq!(
        DeleteTarget::from_args(Some(id.to_string()), None, false).unwrap(),
        DeleteTarget::Record(id)
    );
    assert_eq!(
        DeleteTarget::from_args(None, Some("s".into()), false).unwrap(),
        DeleteTarget::Session("s".into())
    );
    assert_eq!(DeleteTarget::from_args(None, None, true).unwrap(), DeleteTarget::All);
    assert!(matches!(
        DeleteTarget::from_args(None, None, false),
        Err(Error::InvalidInput(_))
    ));
}

#[test]
fn malformed_id_is_rejected() {
    let err = DeleteTarget::from_args(Some("not-a-uuid".into()), None, false).unwrap_err();
    assert!(matches!(err, Error::Store(sk_core::Error::InvalidId(_))));
}
