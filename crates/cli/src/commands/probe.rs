// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use sk_sync::{ConnectivityMonitor, HttpProbe, Reachability};

use crate::error::{Error, Result};

use super::Context;

pub fn run(ctx: &Context) -> Result<()> {
    let url = &ctx.config.connectivity.probe_url;
    let probe = HttpProbe::new(url.clone(), ctx.config.request_timeout())?;

    let runtime = tokio::runtime::Runtime::new()?;
    if runtime.block_on(run_impl(Arc::new(probe))) {
        println!("online");
        Ok(())
    } else {
        Err(Error::Offline(url.clone()))
    }
}

/// Active reachability check; does not touch any tracked status.
pub(crate) async fn run_impl(probe: Arc<dyn Reachability>) -> bool {
    ConnectivityMonitor::new().with_probe(probe).test_connectivity().await
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod tests;
