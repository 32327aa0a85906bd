// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde::Serialize;
use sk_core::{SessionStore, StorageStats};

use crate::error::Result;

use super::output::{format_bytes, format_stats};
use super::Context;

/// What a maintenance pass did.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintainReport {
    pub evicted: usize,
    pub vacuumed: bool,
    pub stats: StorageStats,
}

pub fn run(ctx: &Context, vacuum: bool) -> Result<()> {
    let (_lock, mut store) = ctx.open_store()?;
    let report = run_impl(&mut store, vacuum)?;
    println!(
        "evicted {} synced session(s), low-water mark {}",
        report.evicted,
        format_bytes(store.config().low_water_bytes())
    );
    if report.vacuumed {
        println!("database compacted");
    }
    println!("{}", format_stats(&report.stats));
    Ok(())
}

/// Runs the eviction pass, optionally followed by a vacuum.
pub(crate) fn run_impl(store: &mut SessionStore, vacuum: bool) -> Result<MaintainReport> {
    let evicted = store.enforce_capacity()?;
    if vacuum {
        store.vacuum()?;
    }
    Ok(MaintainReport { evicted, vacuumed: vacuum, stats: store.stats()? })
}

#[cfg(test)]
#[path = "maintain_tests.rs"]
mod tests;
