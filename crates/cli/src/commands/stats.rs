// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use sk_core::{SessionStore, StorageStats};

use crate::cli::{OutputArgs, OutputFormat};
use crate::error::Result;

use super::output::{format_stats, print_json};
use super::Context;

pub fn run(ctx: &Context, output: &OutputArgs) -> Result<()> {
    let (_lock, store) = ctx.open_store()?;
    let stats = run_impl(&store)?;
    match output.format() {
        OutputFormat::Text => println!("{}", format_stats(&stats)),
        OutputFormat::Json => print_json(&stats)?,
    }
    Ok(())
}

pub(crate) fn run_impl(store: &SessionStore) -> Result<StorageStats> {
    Ok(store.stats()?)
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
