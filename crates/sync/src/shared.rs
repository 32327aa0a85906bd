// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared store handle.
//!
//! Wraps the [`SessionStore`] for access from many tasks. Every operation,
//! reads included, goes through one mutex, so writes are never interleaved
//! and never observed half-done.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sk_core::{
    Clock, RecordId, Result, SessionRecord, SessionStore, StorageStats, StoreConfig, Value,
};
use tokio::sync::Mutex;

/// Cloneable handle to a single [`SessionStore`].
#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<SharedStoreInner>,
}

struct SharedStoreInner {
    store: Mutex<SessionStore>,
    clock: Arc<dyn Clock>,
}

impl SharedStore {
    pub fn new(store: SessionStore) -> Self {
        let clock = store.clock();
        SharedStore { inner: Arc::new(SharedStoreInner { store: Mutex::new(store), clock }) }
    }

    /// Opens a store on disk and wraps it.
    pub fn open(path: &Path, config: StoreConfig) -> Result<Self> {
        Ok(Self::new(SessionStore::open(path, config)?))
    }

    /// Current time according to the store's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.inner.clock.now()
    }

    /// Builds a record stamped now and saves it.
    pub async fn record(
        &self,
        payload: Value,
        session_id: Option<String>,
        user_id: Option<String>,
    ) -> Result<RecordId> {
        let record = SessionRecord::from_payload(payload, session_id, user_id, self.now())?;
        self.save(&record).await
    }

    pub async fn save(&self, record: &SessionRecord) -> Result<RecordId> {
        self.inner.store.lock().await.save(record)
    }

    pub async fn get(&self, id: RecordId) -> Result<SessionRecord> {
        self.inner.store.lock().await.get(id)
    }

    pub async fn fetch_unsynced(&self) -> Result<Vec<SessionRecord>> {
        self.inner.store.lock().await.fetch_unsynced()
    }

    pub async fn mark_synced(&self, id: RecordId) -> Result<bool> {
        self.inner.store.lock().await.mark_synced(id)
    }

    pub async fn delete(&self, id: RecordId) -> Result<bool> {
        self.inner.store.lock().await.delete(id)
    }

    pub async fn recent(&self, limit: usize) -> Result<Vec<SessionRecord>> {
        self.inner.store.lock().await.recent(limit)
    }

    pub async fn stats(&self) -> Result<StorageStats> {
        self.inner.store.lock().await.stats()
    }
}
