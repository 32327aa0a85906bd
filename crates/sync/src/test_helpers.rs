// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use sk_core::{ManualClock, SessionRecord, SessionStore, StoreConfig, Value};
use tokio::sync::{Notify, Semaphore};

use crate::error::SyncError;
use crate::shared::SharedStore;
use crate::transport::{Transport, TransportFuture};
use crate::wire::BATCH_PATH;

/// Scripted result of one mock request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Transport,
    Status(u16),
    /// Never completes.
    Hang,
}

/// A request the mock received.
#[derive(Debug, Clone)]
pub struct Call {
    pub path: String,
    pub body: serde_json::Value,
}

/// Mock transport for testing without a server.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<MockInner>,
}

#[derive(Default)]
struct MockInner {
    calls: Mutex<Vec<Call>>,
    script: Mutex<VecDeque<Outcome>>,
    failing_sessions: Mutex<HashSet<String>>,
    fail_batches: AtomicBool,
    gate: Mutex<Option<Arc<Semaphore>>>,
    entered: Notify,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue outcomes for the next requests; afterwards requests succeed.
    pub fn script(&self, outcomes: impl IntoIterator<Item = Outcome>) {
        self.inner.script.lock().unwrap().extend(outcomes);
    }

    /// Every upload carrying this session id fails with HTTP 500.
    pub fn always_fail(&self, session_id: &str) {
        self.inner.failing_sessions.lock().unwrap().insert(session_id.to_string());
    }

    /// Every batch request fails with HTTP 500.
    pub fn fail_batches(&self) {
        self.inner.fail_batches.store(true, Ordering::SeqCst);
    }

    /// Hold every request until [`release`](Self::release) is called.
    pub fn hold(&self) {
        *self.inner.gate.lock().unwrap() = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let `n` held requests through.
    pub fn release(&self, n: usize) {
        let gate = self.inner.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.add_permits(n);
        }
    }

    /// Wait until a request has reached the mock.
    pub async fn entered(&self) {
        self.inner.entered.notified().await;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.calls.lock().unwrap().clone()
    }

    /// Session ids of single uploads, in request order.
    pub fn uploaded_ids(&self) -> Vec<String> {
        self.calls()
            .iter()
            .filter(|c| c.path != BATCH_PATH)
            .filter_map(|c| c.body["sessionId"].as_str().map(str::to_string))
            .collect()
    }
}

impl Transport for MockTransport {
    fn post(&self, path: &str, body: Vec<u8>) -> TransportFuture<'_> {
        let path = path.to_string();
        Box::pin(async move {
            let body: serde_json::Value = serde_json::from_slice(&body)?;
            self.inner.calls.lock().unwrap().push(Call { path: path.clone(), body: body.clone() });
            self.inner.entered.notify_one();

            let gate = self.inner.gate.lock().unwrap().clone();
            if let Some(gate) = gate {
                gate.acquire().await.unwrap().forget();
            }

            if path == BATCH_PATH && self.inner.fail_batches.load(Ordering::SeqCst) {
                return Err(SyncError::Server { status: 500 });
            }
            let session_id = body["sessionId"].as_str().unwrap_or_default().to_string();
            if self.inner.failing_sessions.lock().unwrap().contains(&session_id) {
                return Err(SyncError::Server { status: 500 });
            }

            let next = self.inner.script.lock().unwrap().pop_front();
            match next.unwrap_or(Outcome::Ok) {
                Outcome::Ok => Ok(()),
                Outcome::Transport => Err(SyncError::Transport("connection reset".into())),
                Outcome::Status(status) => Err(SyncError::Server { status }),
                Outcome::Hang => {
                    std::future::pending::<()>().await;
                    Ok(())
                }
            }
        })
    }
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

/// In-memory store on a manual clock starting at [`t0`].
pub fn memory_store() -> (SharedStore, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(t0()));
    let store = SessionStore::open_in_memory(StoreConfig::default())
        .unwrap()
        .with_clock(clock.clone());
    (SharedStore::new(store), clock)
}

/// Save a small record `offset_secs` after [`t0`].
pub async fn seed(store: &SharedStore, session_id: &str, offset_secs: i64) -> SessionRecord {
    let record = SessionRecord::new_at(
        session_id,
        None,
        Value::map([("n", Value::from(offset_secs))]),
        t0() + chrono::Duration::seconds(offset_secs),
    )
    .unwrap();
    store.save(&record).await.unwrap();
    record
}

/// Retry policy with no waiting, for fast tests.
pub fn fast_policy() -> crate::engine::RetryPolicy {
    crate::engine::RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::ZERO,
        attempt_timeout: Duration::from_secs(5),
    }
}
