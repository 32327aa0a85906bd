// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing subscriber setup.
//!
//! `RUST_LOG` overrides the default level in every mode.

use std::fs;
use std::path::Path;

use tracing_subscriber::EnvFilter;

use crate::env;

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    /// Short-lived commands: warnings and errors on stderr.
    Stderr,
    /// The agent: append to a log file, falling back to stderr.
    File(&'a Path),
}

fn filter(default_level: &str) -> EnvFilter {
    if env::log_filter_set() {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return filter;
        }
    }
    EnvFilter::new(default_level)
}

/// Default filter directive for a target.
pub fn default_level(target: LogTarget<'_>, verbose: bool) -> &'static str {
    match target {
        LogTarget::File(_) => "info",
        LogTarget::Stderr if verbose => "info",
        LogTarget::Stderr => "warn",
    }
}

/// Installs the global subscriber. Later calls are no-ops.
pub fn setup_logging(target: LogTarget<'_>, verbose: bool) {
    let filter = filter(default_level(target, verbose));

    let file = match target {
        LogTarget::File(path) => fs::OpenOptions::new().create(true).append(true).open(path).ok(),
        LogTarget::Stderr => None,
    };

    // Try the log file first, fall back to stderr
    let _ = if let Some(file) = file {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
    };
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
