// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// `sk` pointed at `state`, with no outside config or log filter leaking in.
pub fn sk(state: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("sk");
    cmd.env("SESSKEEP_STATE_DIR", state.path())
        .env_remove("SESSKEEP_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

/// Records a payload and returns the printed record id.
pub fn record(state: &TempDir, payload: &str, extra: &[&str]) -> String {
    let output = sk(state).arg("record").arg(payload).args(extra).output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Runs a command with `--json` and parses its output.
pub fn json(state: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = sk(state).args(args).arg("--json").output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

pub fn write_config(state: &TempDir, content: &str) {
    std::fs::write(state.path().join("config.toml"), content).unwrap();
}
