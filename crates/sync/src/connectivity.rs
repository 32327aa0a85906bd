// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Network reachability tracking.
//!
//! The [`ConnectivityMonitor`] holds the last known online/offline status
//! and tells listeners only when it changes. Status comes in through
//! [`ConnectivityMonitor::report`], usually from a polling task started with
//! [`ConnectivityMonitor::spawn_polling`].

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{Result, SyncError};

/// Future returned by a reachability check.
pub type CheckFuture<'a> = Pin<Box<dyn Future<Output = bool> + Send + 'a>>;

/// A way of asking "is the network usable right now?".
pub trait Reachability: Send + Sync {
    fn check(&self) -> CheckFuture<'_>;
}

/// Reachable when a TCP connection to `addr` opens within the timeout.
#[derive(Debug, Clone)]
pub struct TcpReachability {
    addr: String,
    timeout: Duration,
}

impl TcpReachability {
    /// `addr` is `host:port`.
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        TcpReachability { addr: addr.into(), timeout }
    }
}

impl Reachability for TcpReachability {
    fn check(&self) -> CheckFuture<'_> {
        Box::pin(async move {
            matches!(
                tokio::time::timeout(self.timeout, TcpStream::connect(&self.addr)).await,
                Ok(Ok(_))
            )
        })
    }
}

/// Reachable when a GET to `url` answers HTTP 200.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    url: String,
}

impl HttpProbe {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Transport(e.to_string()))?;
        Ok(HttpProbe { client, url: url.into() })
    }
}

impl Reachability for HttpProbe {
    fn check(&self) -> CheckFuture<'_> {
        Box::pin(async move {
            match self.client.get(&self.url).send().await {
                Ok(response) => response.status() == reqwest::StatusCode::OK,
                Err(e) => {
                    debug!(url = %self.url, error = %e, "connectivity probe failed");
                    false
                }
            }
        })
    }
}

type Handler = Arc<dyn Fn(bool) + Send + Sync>;

/// Edge-triggered online/offline status.
pub struct ConnectivityMonitor {
    status: watch::Sender<bool>,
    handlers: Mutex<Vec<Handler>>,
    probe: Option<Arc<dyn Reachability>>,
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectivityMonitor {
    /// Creates a monitor that starts offline.
    pub fn new() -> Self {
        let (status, _) = watch::channel(false);
        ConnectivityMonitor { status, handlers: Mutex::new(Vec::new()), probe: None }
    }

    /// Sets the probe used by [`test_connectivity`](Self::test_connectivity).
    pub fn with_probe(mut self, probe: Arc<dyn Reachability>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn is_online(&self) -> bool {
        *self.status.borrow()
    }

    /// Receiver that wakes on every transition.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.status.subscribe()
    }

    /// Registers a callback run on every transition.
    ///
    /// Callbacks run on the reporting task, after the lock on the callback
    /// list is released, so they may report or register in turn.
    pub fn on_status_change(&self, handler: impl Fn(bool) + Send + Sync + 'static) {
        self.handlers.lock().unwrap_or_else(|e| e.into_inner()).push(Arc::new(handler));
    }

    /// Records the current status. Returns true if it changed.
    pub fn report(&self, online: bool) -> bool {
        let changed = self.status.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        });
        if changed {
            info!(online, "connectivity changed");
            let handlers = self.handlers.lock().unwrap_or_else(|e| e.into_inner()).clone();
            for handler in &handlers {
                handler(online);
            }
        }
        changed
    }

    /// Actively probes the network. Leaves the tracked status untouched.
    pub async fn test_connectivity(&self) -> bool {
        match &self.probe {
            Some(probe) => probe.check().await,
            None => false,
        }
    }

    /// Polls `reachability` every `interval` and reports the result.
    pub fn spawn_polling(
        self: &Arc<Self>,
        reachability: Arc<dyn Reachability>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        let online = reachability.check().await;
                        monitor.report(online);
                    }
                }
            }
            debug!("connectivity polling stopped");
        })
    }
}

#[cfg(test)]
#[path = "connectivity_tests.rs"]
mod tests;
