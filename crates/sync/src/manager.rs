// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Facade used by the rest of the application.

use std::sync::Arc;

use sk_core::{RecordId, SessionRecord, StorageStats, Value};
use tokio::task::JoinHandle;

use crate::connectivity::ConnectivityMonitor;
use crate::engine::{SyncEngine, SyncResult};
use crate::error::Result;
use crate::scheduler::{SchedulerConfig, SchedulerState, SyncScheduler, Trigger};
use crate::shared::SharedStore;
use crate::transport::{HttpTransport, Transport};

/// Number of sessions returned by default from recent-session queries.
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Records sessions and keeps them synced.
pub struct SessionManager<T: Transport + 'static = HttpTransport> {
    store: SharedStore,
    monitor: Arc<ConnectivityMonitor>,
    scheduler: SyncScheduler<T>,
}

impl<T: Transport + 'static> SessionManager<T> {
    pub fn new(
        engine: SyncEngine<T>,
        monitor: Arc<ConnectivityMonitor>,
        config: SchedulerConfig,
    ) -> Self {
        let store = engine.store().clone();
        let scheduler = SyncScheduler::new(Arc::new(engine), Arc::clone(&monitor), config);
        SessionManager { store, monitor, scheduler }
    }

    /// Saves a new session and, when online with auto-sync on, starts a sync.
    ///
    /// A session id is generated when `session_id` is `None`.
    pub async fn record_session(
        &self,
        payload: Value,
        session_id: Option<String>,
        user_id: Option<String>,
    ) -> sk_core::Result<RecordId> {
        let id = self.store.record(payload, session_id, user_id).await?;
        self.scheduler.trigger(Trigger::Recorded);
        Ok(id)
    }

    /// Starts a sync in the background. False if one is already running.
    pub fn trigger_sync(&self) -> bool {
        self.scheduler.trigger(Trigger::Manual).is_some()
    }

    /// Syncs on the calling task. `None` if a sync is already running.
    pub async fn sync_now(&self) -> Option<Result<SyncResult>> {
        self.scheduler.sync_now().await
    }

    pub async fn storage_stats(&self) -> sk_core::Result<StorageStats> {
        self.store.stats().await
    }

    /// The `limit` most recent sessions, newest first.
    pub async fn recent_sessions(&self, limit: usize) -> sk_core::Result<Vec<SessionRecord>> {
        self.store.recent(limit).await
    }

    pub fn enable_auto_sync(&self) {
        self.scheduler.enable_auto_sync();
    }

    pub fn disable_auto_sync(&self) {
        self.scheduler.disable_auto_sync();
    }

    pub fn is_online(&self) -> bool {
        self.monitor.is_online()
    }

    pub fn is_syncing(&self) -> bool {
        self.scheduler.state() == SchedulerState::Syncing
    }

    /// Resolves once any running sync has finished.
    pub async fn wait_idle(&self) {
        self.scheduler.wait_idle().await;
    }

    /// Starts the scheduler loop.
    pub fn start(&self) -> JoinHandle<()> {
        self.scheduler.start()
    }

    pub fn shutdown(&self) {
        self.scheduler.shutdown();
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn monitor(&self) -> &Arc<ConnectivityMonitor> {
        &self.monitor
    }

    pub fn scheduler(&self) -> &SyncScheduler<T> {
        &self.scheduler
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
