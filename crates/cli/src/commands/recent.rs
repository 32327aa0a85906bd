// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use sk_core::{SessionRecord, SessionStore};

use crate::cli::{OutputArgs, OutputFormat};
use crate::error::Result;

use super::output::{format_record_line, print_json, records_json};
use super::Context;

pub fn run(ctx: &Context, limit: usize, output: &OutputArgs) -> Result<()> {
    let (_lock, store) = ctx.open_store()?;
    let records = run_impl(&store, limit)?;
    print_records(&records, output)
}

pub(crate) fn run_impl(store: &SessionStore, limit: usize) -> Result<Vec<SessionRecord>> {
    Ok(store.recent(limit)?)
}

/// Prints records in the requested format; text output says so when empty.
pub(crate) fn print_records(records: &[SessionRecord], output: &OutputArgs) -> Result<()> {
    match output.format() {
        OutputFormat::Text if records.is_empty() => println!("no sessions"),
        OutputFormat::Text => {
            for record in records {
                println!("{}", format_record_line(record));
            }
        }
        OutputFormat::Json => print_json(&records_json(records))?,
    }
    Ok(())
}

#[cfg(test)]
#[path = "recent_tests.rs"]
mod tests;
