// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::env::tests::EnvGuard;
use crate::env::vars;

#[test]
fn flag_wins() {
    let _guard = EnvGuard::set(vars::SESSKEEP_STATE_DIR, "/from/env");
    let dir = resolve_state_dir(Some(PathBuf::from("/from/flag")));
    assert_eq!(dir, PathBuf::from("/from/flag"));
}

#[test]
fn env_var_before_xdg() {
    let _guard = EnvGuard::set(vars::SESSKEEP_STATE_DIR, "/from/env")
        .and_set(vars::XDG_STATE_HOME, "/xdg");
    assert_eq!(resolve_state_dir(None), PathBuf::from("/from/env"));
}

#[test]
fn xdg_state_home_gets_app_dir() {
    let _guard = EnvGuard::remove(vars::SESSKEEP_STATE_DIR).and_set(vars::XDG_STATE_HOME, "/xdg");
    assert_eq!(resolve_state_dir(None), PathBuf::from("/xdg/sesskeep"));
}

#[test]
fn falls_back_to_local_state() {
    let _guard = EnvGuard::remove(vars::SESSKEEP_STATE_DIR).and_remove(vars::XDG_STATE_HOME);
    assert!(resolve_state_dir(None).ends_with(".local/state/sesskeep"));
}

#[test]
fn lock_is_exclusive() {
    let dir = tempfile::tempdir().unwrap();
    let held = acquire_lock(dir.path()).unwrap();

    let err = acquire_lock(dir.path()).unwrap_err();
    assert!(matches!(err, Error::AlreadyRunning(_)));

    drop(held);
    acquire_lock(dir.path()).unwrap();
}

#[test]
fn lock_creates_state_dir() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    let _lock = acquire_lock(&nested).unwrap();
    assert!(nested.join(LOCK_FILE_NAME).exists());
}
