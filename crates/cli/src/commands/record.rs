// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use sk_core::{RecordId, SessionRecord, SessionStore, Value};

use crate::error::{Error, Result};

use super::Context;

pub fn run(
    ctx: &Context,
    payload: &str,
    session_id: Option<String>,
    user_id: Option<String>,
) -> Result<()> {
    let (_lock, mut store) = ctx.open_store()?;
    let id = run_impl(&mut store, payload, session_id, user_id)?;
    println!("{}", id);
    Ok(())
}

/// Parses a JSON payload into a [`Value`].
pub(crate) fn parse_payload(payload: &str) -> Result<Value> {
    serde_json::from_str(payload).map_err(|e| Error::InvalidPayload(e.to_string()))
}

pub(crate) fn run_impl(
    store: &mut SessionStore,
    payload: &str,
    session_id: Option<String>,
    user_id: Option<String>,
) -> Result<RecordId> {
    let payload = parse_payload(payload)?;
    let record = SessionRecord::from_payload(payload, session_id, user_id, store.clock().now())?;
    Ok(store.save(&record)?)
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
