// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Agent configuration.
//!
//! Configuration is read from `<state_dir>/config.toml` (or the file named by
//! `SESSKEEP_CONFIG`). Every field has a default, so a missing file or a
//! missing section is the same as an empty one.
//!
//! ```toml
//! [store]
//! max_size_mib = 50
//! low_water_percent = 80
//! overflow = "allow"
//!
//! [sync]
//! api_base_url = "https://api.example.com"
//! max_attempts = 3
//! retry_delay_ms = 1000
//! request_timeout_secs = 30
//! batch_size = 1
//! interval_secs = 300
//! auto_sync = true
//!
//! [connectivity]
//! poll_interval_secs = 10
//! probe_url = "https://www.apple.com"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use sk_core::{OverflowPolicy, StoreConfig};
use sk_sync::{RetryPolicy, SchedulerConfig};

use crate::env;
use crate::error::{Error, Result};
use crate::state::{CONFIG_FILE_NAME, DB_FILE_NAME};

const MIB: u64 = 1024 * 1024;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub sync: SyncSection,
    #[serde(default)]
    pub connectivity: ConnectivitySection,
}

/// `[store]`: where sessions live and how much space they may take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSection {
    /// Database file, relative to the state directory unless absolute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default = "default_max_size_mib")]
    pub max_size_mib: u64,
    /// Eviction shrinks the store to this share of `max_size_mib`.
    #[serde(default = "default_low_water_percent")]
    pub low_water_percent: u8,
    #[serde(default)]
    pub overflow: OverflowPolicy,
}

/// `[sync]`: remote endpoint and retry behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSection {
    /// Base URL of the sessions API. Sync is disabled when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Records per request. `1` uploads each record on its own.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_auto_sync")]
    pub auto_sync: bool,
}

/// `[connectivity]`: how `sk run` decides it is online.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectivitySection {
    /// `host:port` polled with a TCP connect. Derived from `api_base_url` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reachability_addr: Option<String>,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// URL fetched by `sk probe`; reachable means HTTP 200.
    #[serde(default = "default_probe_url")]
    pub probe_url: String,
}

fn default_max_size_mib() -> u64 {
    50
}

fn default_low_water_percent() -> u8 {
    80
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1_000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_batch_size() -> usize {
    1
}

fn default_interval_secs() -> u64 {
    300
}

fn default_auto_sync() -> bool {
    true
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_probe_url() -> String {
    "https://www.apple.com".to_string()
}

impl Default for StoreSection {
    fn default() -> Self {
        StoreSection {
            path: None,
            max_size_mib: default_max_size_mib(),
            low_water_percent: default_low_water_percent(),
            overflow: OverflowPolicy::default(),
        }
    }
}

impl Default for SyncSection {
    fn default() -> Self {
        SyncSection {
            api_base_url: None,
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            batch_size: default_batch_size(),
            interval_secs: default_interval_secs(),
            auto_sync: default_auto_sync(),
        }
    }
}

impl Default for ConnectivitySection {
    fn default() -> Self {
        ConnectivitySection {
            reachability_addr: None,
            poll_interval_secs: default_poll_interval_secs(),
            probe_url: default_probe_url(),
        }
    }
}

/// Config file location: `SESSKEEP_CONFIG` if set, else inside the state directory.
pub fn config_path(state_dir: &Path) -> PathBuf {
    env::config_path().unwrap_or_else(|| state_dir.join(CONFIG_FILE_NAME))
}

impl Config {
    /// Loads and validates the file at `path`. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let config = match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
            Err(e) => {
                return Err(Error::Config(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Rejects values that would make the store or sync loop misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.store.max_size_mib == 0 {
            return Err(Error::Config("store.max_size_mib must be greater than zero".into()));
        }
        if !(1..=100).contains(&self.store.low_water_percent) {
            return Err(Error::Config(format!(
                "store.low_water_percent must be between 1 and 100, got {}",
                self.store.low_water_percent
            )));
        }
        if self.sync.max_attempts == 0 {
            return Err(Error::Config("sync.max_attempts must be at least 1".into()));
        }
        if self.sync.batch_size == 0 {
            return Err(Error::Config("sync.batch_size must be at least 1".into()));
        }
        if self.sync.request_timeout_secs == 0 {
            return Err(Error::Config("sync.request_timeout_secs must be greater than zero".into()));
        }
        if self.sync.interval_secs == 0 {
            return Err(Error::Config("sync.interval_secs must be greater than zero".into()));
        }
        if self.connectivity.poll_interval_secs == 0 {
            return Err(Error::Config(
                "connectivity.poll_interval_secs must be greater than zero".into(),
            ));
        }
        if let Some(url) = &self.sync.api_base_url {
            parse_http_url("sync.api_base_url", url)?;
        }
        parse_http_url("connectivity.probe_url", &self.connectivity.probe_url)?;
        Ok(())
    }

    /// Path of the session database.
    pub fn db_path(&self, state_dir: &Path) -> PathBuf {
        match &self.store.path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => state_dir.join(path),
            None => state_dir.join(DB_FILE_NAME),
        }
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            max_size_bytes: self.store.max_size_mib.saturating_mul(MIB),
            low_water_ratio: f64::from(self.store.low_water_percent) / 100.0,
            overflow: self.store.overflow,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.sync.max_attempts,
            base_delay: Duration::from_millis(self.sync.retry_delay_ms),
            attempt_timeout: self.request_timeout(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.sync.request_timeout_secs)
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            interval: Duration::from_secs(self.sync.interval_secs),
            auto_sync: self.sync.auto_sync,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.connectivity.poll_interval_secs)
    }

    /// The configured API base URL, or [`Error::NotConfigured`] naming `config_path`.
    pub fn require_api_base_url(&self, config_path: &Path) -> Result<&str> {
        self.sync
            .api_base_url
            .as_deref()
            .ok_or_else(|| Error::NotConfigured(config_path.display().to_string()))
    }

    /// `host:port` to poll for reachability.
    pub fn reachability_addr(&self) -> Option<String> {
        if let Some(addr) = &self.connectivity.reachability_addr {
            return Some(addr.clone());
        }
        self.sync.api_base_url.as_deref().and_then(host_port)
    }
}

/// Parses an http(s) URL that names a host.
fn parse_http_url(key: &str, value: &str) -> Result<Url> {
    let url = Url::parse(value)
        .map_err(|e| Error::Config(format!("{key} is not a valid URL '{value}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "{key} must start with http:// or https://, got '{value}'"
        )));
    }
    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(Error::Config(format!("{key} has no host: '{value}'"))),
    }
}

/// `host:port` of an http(s) URL, filling in the scheme's default port.
fn host_port(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    Some(format!("{}:{}", url.host_str()?, url.port_or_known_default()?))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
