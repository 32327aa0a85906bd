// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! State directory layout and single-owner locking.
//!
//! ```text
//! <state_dir>/
//!   config.toml     optional settings
//!   sessions.db     the session store
//!   sesskeep.lock   held while a command owns the store
//!   sesskeep.log    agent log (`sk run`)
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::env;
use crate::error::{Error, Result};

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DB_FILE_NAME: &str = "sessions.db";
pub const LOCK_FILE_NAME: &str = "sesskeep.lock";
pub const LOG_FILE_NAME: &str = "sesskeep.log";

const APP_DIR_NAME: &str = "sesskeep";

/// Resolves the state directory.
///
/// Order: explicit flag, `SESSKEEP_STATE_DIR`, `$XDG_STATE_HOME/sesskeep`,
/// `~/.local/state/sesskeep`.
pub fn resolve_state_dir(flag: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = flag {
        return dir;
    }
    if let Some(dir) = env::state_dir() {
        return dir;
    }
    if let Some(dir) = env::xdg_state_home() {
        return dir.join(APP_DIR_NAME);
    }
    dirs::home_dir()
        .map(|h| h.join(".local/state").join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".local/state").join(APP_DIR_NAME))
}

/// Exclusive lock on the state directory, released on drop.
#[derive(Debug)]
pub struct StoreLock {
    _file: fs::File,
}

/// Takes the exclusive lock, failing fast if another process holds it.
pub fn acquire_lock(state_dir: &Path) -> Result<StoreLock> {
    use fs2::FileExt;

    fs::create_dir_all(state_dir)?;
    let lock_path = state_dir.join(LOCK_FILE_NAME);
    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&lock_path)?;
    file.try_lock_exclusive()
        .map_err(|_| Error::AlreadyRunning(state_dir.display().to_string()))?;
    Ok(StoreLock { _file: file })
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
