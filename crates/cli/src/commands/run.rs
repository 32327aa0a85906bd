// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! `sk run`: the long-running agent.
//!
//! Records one session per JSON line on stdin while the scheduler syncs in
//! the background. On end of input or Ctrl-C the scheduler and connectivity
//! polling stop, any running sync finishes, and a final sync flushes what is
//! left if the network is up.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use sk_sync::{
    ConnectivityMonitor, HttpTransport, Reachability, SessionManager, SharedStore, SyncResult,
    TcpReachability, Transport,
};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

use super::record::parse_payload;
use super::sync::build_engine;
use super::Context;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Agent settings that do not come from the manager itself.
pub(crate) struct AgentOptions {
    /// Attached to every recorded session.
    pub user_id: Option<String>,
    /// `None` treats the network as always up.
    pub reachability: Option<Arc<dyn Reachability>>,
    pub poll_interval: Duration,
}

/// What the agent did before it stopped.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AgentSummary {
    pub recorded: usize,
    pub rejected: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_sync: Option<SyncResult>,
}

pub fn run(ctx: &Context, user_id: Option<String>) -> Result<()> {
    let base_url = ctx.config.require_api_base_url(&ctx.config_path)?;
    let transport = HttpTransport::new(base_url, ctx.config.request_timeout())?;
    let reachability = match ctx.config.reachability_addr() {
        Some(addr) => {
            Some(Arc::new(TcpReachability::new(addr, CONNECT_TIMEOUT)) as Arc<dyn Reachability>)
        }
        None => {
            warn!(base_url, "cannot derive a reachability address, assuming online");
            None
        }
    };
    let options =
        AgentOptions { user_id, reachability, poll_interval: ctx.config.poll_interval() };

    let (_lock, store) = ctx.open_store()?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let engine = build_engine(&ctx.config, SharedStore::new(store), transport);
        let monitor = Arc::new(ConnectivityMonitor::new());
        let manager = SessionManager::new(engine, monitor, ctx.config.scheduler_config());

        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "cannot listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
            info!("interrupted");
        };

        let summary = run_agent(&manager, tokio::io::stdin(), options, shutdown).await?;
        info!(
            recorded = summary.recorded,
            rejected = summary.rejected,
            flushed = summary.final_sync.as_ref().map_or(0, |r| r.successful),
            "agent stopped"
        );
        let stats = manager.storage_stats().await?;
        eprintln!(
            "recorded {}, rejected {}, {} session(s) still unsynced",
            summary.recorded, summary.rejected, stats.unsynced_sessions
        );
        Ok::<(), Error>(())
    })
}

/// Drives the manager until `input` ends or `shutdown` completes.
pub(crate) async fn run_agent<T, R>(
    manager: &SessionManager<T>,
    input: R,
    options: AgentOptions,
    shutdown: impl Future<Output = ()>,
) -> Result<AgentSummary>
where
    T: Transport + 'static,
    R: AsyncRead + Unpin,
{
    let cancel = CancellationToken::new();
    let poller = match options.reachability {
        Some(reachability) => {
            // Settle the status before the scheduler looks at it.
            manager.monitor().report(reachability.check().await);
            Some(manager.monitor().spawn_polling(
                reachability,
                options.poll_interval,
                cancel.clone(),
            ))
        }
        None => {
            manager.monitor().report(true);
            None
        }
    };
    let scheduler = manager.start();
    info!(online = manager.is_online(), "agent started");

    let mut summary = AgentSummary::default();
    let mut lines = BufReader::new(input).lines();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("end of input");
                    break;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let payload = match parse_payload(line) {
                    Ok(payload) => payload,
                    Err(e) => {
                        summary.rejected += 1;
                        warn!(error = %e, "skipping malformed payload line");
                        continue;
                    }
                };
                match manager.record_session(payload, None, options.user_id.clone()).await {
                    Ok(id) => {
                        summary.recorded += 1;
                        debug!(%id, "session recorded");
                    }
                    Err(e) => {
                        summary.rejected += 1;
                        warn!(error = %e, "failed to record session");
                    }
                }
            }
        }
    }

    cancel.cancel();
    manager.shutdown();
    let _ = scheduler.await;
    if let Some(poller) = poller {
        let _ = poller.await;
    }

    manager.wait_idle().await;
    if manager.is_online() {
        summary.final_sync = match manager.sync_now().await {
            Some(Ok(result)) => Some(result),
            Some(Err(e)) => {
                warn!(error = %e, "final sync failed");
                None
            }
            None => None,
        };
    }
    Ok(summary)
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
