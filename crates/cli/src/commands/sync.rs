// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use sk_core::SessionStore;
use sk_sync::{HttpTransport, SharedStore, SyncEngine, SyncResult, Transport};

use crate::cli::{OutputArgs, OutputFormat};
use crate::config::Config;
use crate::error::{Error, Result};

use super::output::{format_sync_result, print_json};
use super::Context;

pub fn run(ctx: &Context, output: &OutputArgs) -> Result<()> {
    let base_url = ctx.config.require_api_base_url(&ctx.config_path)?;
    let transport = HttpTransport::new(base_url, ctx.config.request_timeout())?;
    let (_lock, store) = ctx.open_store()?;

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(run_impl(&ctx.config, store, transport))?;

    match output.format() {
        OutputFormat::Text => println!("{}", format_sync_result(&result)),
        OutputFormat::Json => print_json(&result)?,
    }
    if result.failed > 0 {
        return Err(Error::SyncIncomplete { failed: result.failed });
    }
    Ok(())
}

/// Engine wired with the configured retry policy and batch size.
pub(crate) fn build_engine<T: Transport>(
    config: &Config,
    store: SharedStore,
    transport: T,
) -> SyncEngine<T> {
    SyncEngine::new(store, transport)
        .with_policy(config.retry_policy())
        .with_batch_size(config.sync.batch_size)
}

/// One sync run over everything currently unsynced.
pub(crate) async fn run_impl<T: Transport>(
    config: &Config,
    store: SessionStore,
    transport: T,
) -> Result<SyncResult> {
    let engine = build_engine(config, SharedStore::new(store), transport);
    Ok(engine.sync_all().await?)
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
