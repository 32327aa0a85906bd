// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Upload of unsynced records.
//!
//! A sync run reads every unsynced record, oldest first, and uploads each
//! one. A record is marked synced only after the server confirms it, so a
//! crash between upload and mark means the record is sent again later.
//! One record failing never stops the rest of the run.

use std::time::Duration;

use serde::Serialize;
use sk_core::SessionRecord;
use tracing::{debug, info, warn};

use crate::error::{Result, SyncError};
use crate::flight::{FlightGuard, SingleFlight};
use crate::shared::SharedStore;
use crate::transport::{HttpTransport, Transport};
use crate::wire::{self, BATCH_PATH, SESSIONS_PATH};

/// Bounded retry with linearly growing delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per record, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    /// Upper bound on a single attempt.
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            attempt_timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay before the attempt that follows failed attempt number `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

/// One record that could not be synced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncFailure {
    pub session_id: String,
    pub error_message: String,
}

/// Outcome of a sync run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub successful: usize,
    pub failed: usize,
    pub errors: Vec<SyncFailure>,
}

impl SyncResult {
    /// Records attempted in this run.
    pub fn attempted(&self) -> usize {
        self.successful + self.failed
    }

    fn record_success(&mut self) {
        self.successful += 1;
    }

    fn record_failure(&mut self, session_id: &str, err: &SyncError) {
        self.failed += 1;
        self.errors.push(SyncFailure {
            session_id: session_id.to_string(),
            error_message: err.to_string(),
        });
    }

    fn absorb(&mut self, other: SyncResult) {
        self.successful += other.successful;
        self.failed += other.failed;
        self.errors.extend(other.errors);
    }
}

/// Uploads unsynced records through a [`Transport`].
pub struct SyncEngine<T: Transport = HttpTransport> {
    store: SharedStore,
    transport: T,
    policy: RetryPolicy,
    batch_size: usize,
    flight: SingleFlight,
}

impl<T: Transport> SyncEngine<T> {
    pub fn new(store: SharedStore, transport: T) -> Self {
        SyncEngine {
            store,
            transport,
            policy: RetryPolicy::default(),
            batch_size: 1,
            flight: SingleFlight::new(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Upload in batches of `size` records; 1 uploads records one by one.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// True while a sync run is in progress.
    pub fn is_syncing(&self) -> bool {
        self.flight.is_busy()
    }

    /// Resolves once no sync run is in progress.
    pub async fn wait_idle(&self) {
        self.flight.idle().await;
    }

    pub(crate) fn flight(&self) -> &SingleFlight {
        &self.flight
    }

    /// Upload every unsynced record.
    ///
    /// Returns an empty result immediately if another run is in progress.
    /// Fails only if the unsynced records cannot be read; per-record
    /// failures are reported in the result.
    pub async fn sync_all(&self) -> Result<SyncResult> {
        let Some(guard) = self.flight.try_begin() else {
            debug!("sync already in progress, skipping");
            return Ok(SyncResult::default());
        };
        self.run(guard).await
    }

    /// Body of a sync run; the caller already holds the flight guard.
    pub(crate) async fn run(&self, _guard: FlightGuard) -> Result<SyncResult> {
        let pending = self.store.fetch_unsynced().await?;
        if pending.is_empty() {
            debug!("no unsynced sessions");
            return Ok(SyncResult::default());
        }
        info!(pending = pending.len(), "starting sync");

        let mut result = SyncResult::default();
        if self.batch_size == 1 {
            for record in &pending {
                self.deliver(record, &mut result).await;
            }
        } else {
            for chunk in pending.chunks(self.batch_size) {
                result.absorb(self.upload_batch(chunk).await);
            }
        }

        info!(successful = result.successful, failed = result.failed, "sync finished");
        Ok(result)
    }

    /// Upload one record, retrying transient failures.
    ///
    /// Does not mark the record synced.
    pub async fn upload_one(&self, record: &SessionRecord) -> Result<()> {
        let body = wire::encode_upload(record)?;
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.attempt(SESSIONS_PATH, body.clone()).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < max_attempts && e.is_retryable() => {
                    let delay = self.policy.delay_for(attempt);
                    warn!(
                        session_id = record.session_id(),
                        attempt,
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        "upload failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Upload several records in one request, without retry.
    pub async fn send_batch(&self, records: &[SessionRecord]) -> Result<()> {
        let body = wire::encode_batch(records)?;
        self.attempt(BATCH_PATH, body).await
    }

    /// Upload records as one batch, marking all of them synced on success.
    ///
    /// If the batch request fails, each record falls back to
    /// [`upload_one`](Self::upload_one) on its own.
    pub async fn upload_batch(&self, records: &[SessionRecord]) -> SyncResult {
        let mut result = SyncResult::default();
        if records.is_empty() {
            return result;
        }

        match self.send_batch(records).await {
            Ok(()) => {
                for record in records {
                    match self.store.mark_synced(record.id()).await {
                        Ok(_) => result.record_success(),
                        Err(e) => result.record_failure(record.session_id(), &e.into()),
                    }
                }
            }
            Err(e) => {
                warn!(size = records.len(), error = %e, "batch upload failed, uploading individually");
                for record in records {
                    self.deliver(record, &mut result).await;
                }
            }
        }
        result
    }

    /// Upload then mark, folding the outcome into `result`.
    async fn deliver(&self, record: &SessionRecord, result: &mut SyncResult) {
        let outcome = match self.upload_one(record).await {
            Ok(()) => self.store.mark_synced(record.id()).await.map(|_| ()).map_err(SyncError::from),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(()) => result.record_success(),
            Err(e) => {
                warn!(session_id = record.session_id(), error = %e, "session not synced");
                result.record_failure(record.session_id(), &e);
            }
        }
    }

    async fn attempt(&self, path: &str, body: Vec<u8>) -> Result<()> {
        let timeout = self.policy.attempt_timeout;
        match tokio::time::timeout(timeout, self.transport.post(path, body)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(SyncError::Transport(format!(
                "request timed out after {}ms",
                timeout.as_millis()
            ))),
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
