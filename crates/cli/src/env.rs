// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables used by the CLI are defined here
//! with typed accessor functions. The variable name constants are generated
//! by `build.rs` and live in the [`vars`] submodule.

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_vars.rs"));
}

/// Returns the value of `SESSKEEP_STATE_DIR` if set.
pub fn state_dir() -> Option<PathBuf> {
    std::env::var(vars::SESSKEEP_STATE_DIR).ok().map(PathBuf::from)
}

/// Returns the value of `SESSKEEP_CONFIG` if set.
pub fn config_path() -> Option<PathBuf> {
    std::env::var(vars::SESSKEEP_CONFIG).ok().map(PathBuf::from)
}

/// Returns the value of `XDG_STATE_HOME` if set.
pub fn xdg_state_home() -> Option<PathBuf> {
    std::env::var(vars::XDG_STATE_HOME).ok().map(PathBuf::from)
}

/// Returns `true` if `RUST_LOG` is set to a non-empty value.
pub fn log_filter_set() -> bool {
    std::env::var(vars::RUST_LOG).is_ok_and(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
pub(crate) mod tests;
