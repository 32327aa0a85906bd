// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Deciding when to sync.
//!
//! The scheduler is either idle or syncing. Triggers that arrive while a
//! sync is running are dropped, not queued: the running sync already covers
//! everything that was unsynced when it started, and the next trigger picks
//! up the rest.
//!
//! | trigger       | fires when                         | requires            |
//! |---------------|------------------------------------|---------------------|
//! | `Manual`      | a caller asks                      | nothing             |
//! | `Reconnected` | status goes offline to online      | online, auto-sync   |
//! | `Periodic`    | every `interval`                   | online, auto-sync   |
//! | `Recorded`    | a new session was recorded         | online, auto-sync   |

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::connectivity::ConnectivityMonitor;
use crate::engine::{SyncEngine, SyncResult};
use crate::error::Result;
use crate::transport::{HttpTransport, Transport};

/// Default period between automatic syncs.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Syncing,
}

/// Why a sync was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Manual,
    Reconnected,
    Periodic,
    Recorded,
}

impl Trigger {
    pub fn as_str(self) -> &'static str {
        match self {
            Trigger::Manual => "manual",
            Trigger::Reconnected => "reconnected",
            Trigger::Periodic => "periodic",
            Trigger::Recorded => "recorded",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub interval: Duration,
    pub auto_sync: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig { interval: DEFAULT_SYNC_INTERVAL, auto_sync: true }
    }
}

/// Runs the [`SyncEngine`] in response to triggers.
pub struct SyncScheduler<T: Transport + 'static = HttpTransport> {
    inner: Arc<SchedulerInner<T>>,
}

struct SchedulerInner<T: Transport + 'static> {
    engine: Arc<SyncEngine<T>>,
    monitor: Arc<ConnectivityMonitor>,
    interval: Duration,
    auto_sync: AtomicBool,
    cancel: CancellationToken,
}

impl<T: Transport + 'static> Clone for SyncScheduler<T> {
    fn clone(&self) -> Self {
        SyncScheduler { inner: Arc::clone(&self.inner) }
    }
}

impl<T: Transport + 'static> SyncScheduler<T> {
    pub fn new(
        engine: Arc<SyncEngine<T>>,
        monitor: Arc<ConnectivityMonitor>,
        config: SchedulerConfig,
    ) -> Self {
        SyncScheduler {
            inner: Arc::new(SchedulerInner {
                engine,
                monitor,
                interval: config.interval,
                auto_sync: AtomicBool::new(config.auto_sync),
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn engine(&self) -> &Arc<SyncEngine<T>> {
        &self.inner.engine
    }

    pub fn state(&self) -> SchedulerState {
        if self.inner.engine.is_syncing() {
            SchedulerState::Syncing
        } else {
            SchedulerState::Idle
        }
    }

    pub fn auto_sync_enabled(&self) -> bool {
        self.inner.auto_sync.load(Ordering::Acquire)
    }

    pub fn enable_auto_sync(&self) {
        self.inner.auto_sync.store(true, Ordering::Release);
        info!("auto-sync enabled");
    }

    /// Stops automatic triggers. A sync already running is left to finish.
    pub fn disable_auto_sync(&self) {
        self.inner.auto_sync.store(false, Ordering::Release);
        info!("auto-sync disabled");
    }

    fn admits(&self, trigger: Trigger) -> bool {
        match trigger {
            Trigger::Manual => true,
            Trigger::Reconnected | Trigger::Periodic | Trigger::Recorded => {
                self.auto_sync_enabled() && self.inner.monitor.is_online()
            }
        }
    }

    /// Starts a sync in the background unless the trigger is ignored or a
    /// sync is already running.
    pub fn trigger(&self, trigger: Trigger) -> Option<JoinHandle<()>> {
        if !self.admits(trigger) {
            debug!(%trigger, "sync trigger ignored");
            return None;
        }
        let Some(guard) = self.inner.engine.flight().try_begin() else {
            debug!(%trigger, "sync in progress, trigger dropped");
            return None;
        };

        let engine = Arc::clone(&self.inner.engine);
        Some(tokio::spawn(async move {
            debug!(%trigger, "sync triggered");
            match engine.run(guard).await {
                Ok(result) if result.failed > 0 => {
                    warn!(%trigger, failed = result.failed, "sync left sessions unsynced");
                }
                Ok(_) => {}
                Err(e) => error!(%trigger, error = %e, "sync failed"),
            }
        }))
    }

    /// Resolves once the scheduler is back to [`SchedulerState::Idle`].
    pub async fn wait_idle(&self) {
        self.inner.engine.wait_idle().await;
    }

    /// Runs a manual sync on the calling task and returns its outcome.
    ///
    /// `None` if a sync was already running.
    pub async fn sync_now(&self) -> Option<Result<SyncResult>> {
        let guard = self.inner.engine.flight().try_begin()?;
        Some(self.inner.engine.run(guard).await)
    }

    /// Spawns the trigger loop: an initial sync if already online, then
    /// reconnections and the periodic timer until [`shutdown`](Self::shutdown).
    pub fn start(&self) -> JoinHandle<()> {
        let scheduler = self.clone();
        tokio::spawn(async move { scheduler.run_loop().await })
    }

    /// Stops the trigger loop. Does not interrupt a running sync.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
    }

    async fn run_loop(self) {
        let mut status = self.inner.monitor.subscribe();
        let mut was_online = *status.borrow_and_update();
        if was_online {
            self.trigger(Trigger::Reconnected);
        }

        let period = self.inner.interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_secs = period.as_secs(), "sync scheduler started");

        loop {
            tokio::select! {
                _ = self.inner.cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.trigger(Trigger::Periodic);
                }
                changed = status.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let online = *status.borrow_and_update();
                    if online && !was_online {
                        self.trigger(Trigger::Reconnected);
                    }
                    was_online = online;
                }
            }
        }
        info!("sync scheduler stopped");
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
