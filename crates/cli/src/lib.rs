// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! skrs - the library behind the `sk` command.
//!
//! Wires the session store (`sk-core`) and the sync engine (`sk-sync`) to a
//! command line: configuration, state directory, logging, and commands.
//!
//! # Main Components
//!
//! - [`Cli`] - Command-line definition
//! - [`Config`] - `config.toml` settings
//! - [`state`] - State directory resolution and locking
//! - [`Error`] - Error types for all commands
//!
//! ```rust,ignore
//! use clap::Parser;
//!
//! let cli = skrs::Cli::parse_from(["sk", "record", "{\"steps\": 12}"]);
//! skrs::run(cli)?;
//! ```

mod cli;
mod commands;
mod logging;

pub mod config;
pub mod env;
pub mod error;
pub mod state;

pub use cli::{Cli, Command, OutputArgs, OutputFormat};
pub use config::Config;
pub use error::{Error, Result};

use logging::{setup_logging, LogTarget};

/// Execute a CLI invocation. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub fn run(cli: Cli) -> Result<()> {
    let state_dir = state::resolve_state_dir(cli.state_dir);

    match &cli.command {
        Command::Run { verbose: false, .. } => {
            std::fs::create_dir_all(&state_dir)?;
            let log_path = state_dir.join(state::LOG_FILE_NAME);
            setup_logging(LogTarget::File(&log_path), false);
        }
        Command::Run { verbose: true, .. } => setup_logging(LogTarget::Stderr, true),
        _ => setup_logging(LogTarget::Stderr, false),
    }

    let ctx = commands::Context::load(state_dir)?;

    match cli.command {
        Command::Record { payload, session_id, user_id } => {
            commands::record::run(&ctx, &payload, session_id, user_id)
        }
        Command::Stats { output } => commands::stats::run(&ctx, &output),
        Command::Recent { limit, output } => commands::recent::run(&ctx, limit, &output),
        Command::List { user, query, since, until, unsynced, limit, output } => {
            commands::list::run(&ctx, user, query, since, until, unsynced, limit, &output)
        }
        Command::Delete { id, session, all } => commands::delete::run(&ctx, id, session, all),
        Command::Maintain { vacuum } => commands::maintain::run(&ctx, vacuum),
        Command::Sync { output } => commands::sync::run(&ctx, &output),
        Command::Probe => commands::probe::run(&ctx),
        Command::Run { user_id, .. } => commands::run::run(&ctx, user_id),
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
