// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod delete;
pub mod list;
pub mod maintain;
pub mod output;
pub mod probe;
pub mod recent;
pub mod record;
pub mod run;
pub mod stats;
pub mod sync;
#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;

use std::path::PathBuf;

use sk_core::SessionStore;

use crate::config::{config_path, Config};
use crate::error::Result;
use crate::state::{acquire_lock, StoreLock};

/// Resolved state directory plus the configuration loaded from it.
#[derive(Debug, Clone)]
pub struct Context {
    pub state_dir: PathBuf,
    pub config: Config,
    pub config_path: PathBuf,
}

impl Context {
    pub fn load(state_dir: PathBuf) -> Result<Self> {
        let config_path = config_path(&state_dir);
        let config = Config::load(&config_path)?;
        Ok(Context { state_dir, config, config_path })
    }

    /// Takes the state directory lock, then opens the store.
    ///
    /// Bind as `let (_lock, store) = ...` so the store closes before the
    /// lock is released.
    pub fn open_store(&self) -> Result<(StoreLock, SessionStore)> {
        let lock = acquire_lock(&self.state_dir)?;
        let db_path = self.config.db_path(&self.state_dir);
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let store = SessionStore::open(&db_path, self.config.store_config())?;
        Ok((lock, store))
    }
}
