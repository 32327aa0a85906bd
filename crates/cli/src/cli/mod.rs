// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod args;

use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand, ValueEnum};

pub use args::OutputArgs;

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

// Custom help template that groups commands into sections
const HELP_TEMPLATE: &str = "{about-with-newline}
{usage-heading} {usage}

{before-help}Options:
{options}{after-help}";

const COMMANDS_HELP: &str = "\
Sessions:
  record      Store a session payload
  recent      Show the most recent sessions
  list        List sessions with filters
  delete      Delete sessions
  stats       Show storage usage

Sync:
  sync        Upload unsynced sessions now
  probe       Check network reachability
  run         Run the agent: record from stdin, sync in the background

Maintenance:
  maintain    Evict synced sessions over capacity

";

const QUICKSTART_HELP: &str = "\
Quickstart:
  sk record '{\"steps\": 1200}'       Store a session
  sk recent -n 5                     Show the last five sessions
  sk sync                            Upload everything not yet synced";

#[derive(Parser)]
#[command(name = "sk")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Local-first session store with background cloud sync")]
#[command(
    long_about = "Local-first session store with background cloud sync.\n\n\
    Sessions are saved to a local database first and uploaded when the network allows. \
    Unsynced sessions are never evicted."
)]
#[command(help_template = HELP_TEMPLATE)]
#[command(before_help = COMMANDS_HELP)]
#[command(after_help = QUICKSTART_HELP)]
pub struct Cli {
    /// State directory holding the database, config, and logs
    #[arg(long, global = true, value_name = "dir")]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Store a session payload
    #[command(after_help = "\
Examples:
  sk record '{\"steps\": 1200}'                  Generated session id
  sk record '{\"hr\": [60, 62]}' --user-id u-42  Attach a user
  sk record '{}' --session-id run-7             Explicit session id")]
    Record {
        /// Payload as a JSON document
        payload: String,

        /// Session id (generated when omitted)
        #[arg(long, value_parser = non_empty_string)]
        session_id: Option<String>,

        /// User the session belongs to
        #[arg(long, value_parser = non_empty_string)]
        user_id: Option<String>,
    },

    /// Show storage usage
    Stats {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show the most recent sessions
    Recent {
        /// Maximum number of sessions
        #[arg(short = 'n', long, default_value_t = sk_sync::DEFAULT_RECENT_LIMIT)]
        limit: usize,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List sessions with filters
    #[command(after_help = "\
Examples:
  sk list --user u-42                           One user's sessions
  sk list -q run                                Session or user id contains 'run'
  sk list --since 2026-03-01 --until 2026-03-02 Time window (RFC 3339 or date)
  sk list --unsynced                            Waiting for upload")]
    List {
        /// Only sessions of this user
        #[arg(long)]
        user: Option<String>,

        /// Substring of the session id or user id
        #[arg(short = 'q', long)]
        query: Option<String>,

        /// Earliest timestamp (inclusive)
        #[arg(long, value_name = "time")]
        since: Option<String>,

        /// Latest timestamp (inclusive)
        #[arg(long, value_name = "time")]
        until: Option<String>,

        /// Only sessions not yet synced
        #[arg(long)]
        unsynced: bool,

        /// Maximum number of sessions
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Delete sessions
    #[command(group(ArgGroup::new("target").required(true).args(["id", "session", "all"])))]
    Delete {
        /// Local record id
        id: Option<String>,

        /// Delete every record with this session id
        #[arg(long)]
        session: Option<String>,

        /// Delete everything, synced or not
        #[arg(long)]
        all: bool,
    },

    /// Evict synced sessions over capacity
    Maintain {
        /// Compact the database file afterwards
        #[arg(long)]
        vacuum: bool,
    },

    /// Upload unsynced sessions now
    Sync {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Check network reachability (exit status 1 when offline)
    Probe,

    /// Run the agent: record from stdin, sync in the background
    #[command(after_help = "\
Reads one JSON payload per line from stdin and stores each as a session.
Stops on end of input or Ctrl-C. Logs go to <state-dir>/sesskeep.log unless --verbose.")]
    Run {
        /// Log to stderr instead of the log file
        #[arg(short = 'v', long)]
        verbose: bool,

        /// User attached to every recorded session
        #[arg(long, value_parser = non_empty_string)]
        user_id: Option<String>,
    },
}

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
