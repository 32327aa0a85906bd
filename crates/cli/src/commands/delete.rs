// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use sk_core::{RecordId, SessionStore};
use tracing::warn;

use crate::error::{Error, Result};

use super::Context;

/// What `sk delete` removes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Record(RecordId),
    Session(String),
    All,
}

impl DeleteTarget {
    /// Builds the target from the mutually exclusive command-line arguments.
    pub fn from_args(id: Option<String>, session: Option<String>, all: bool) -> Result<Self> {
        match (id, session, all) {
            (Some(id), None, false) => Ok(DeleteTarget::Record(id.parse()?)),
            (None, Some(session), false) => Ok(DeleteTarget::Session(session)),
            (None, None, true) => Ok(DeleteTarget::All),
            _ => Err(Error::InvalidInput(
                "specify exactly one of <ID>, --session, or --all".to_string(),
            )),
        }
    }
}

pub fn run(ctx: &Context, id: Option<String>, session: Option<String>, all: bool) -> Result<()> {
    let target = DeleteTarget::from_args(id, session, all)?;
    let (_lock, mut store) = ctx.open_store()?;
    let removed = run_impl(&mut store, &target)?;
    println!("deleted {} session(s)", removed);
    Ok(())
}

/// Deletes the target and returns how many records went away.
///
/// A single record id that does not exist is an error; a session id or
/// `--all` matching nothing is not.
pub(crate) fn run_impl(store: &mut SessionStore, target: &DeleteTarget) -> Result<usize> {
    match target {
        DeleteTarget::Record(id) => {
            if store.delete(*id)? {
                Ok(1)
            } else {
                Err(sk_core::Error::NotFound(id.to_string()).into())
            }
        }
        DeleteTarget::Session(session_id) => Ok(store.delete_session(session_id)?),
        DeleteTarget::All => {
            let unsynced = store.stats()?.unsynced_sessions;
            if unsynced > 0 {
                warn!(unsynced, "deleting sessions that were never synced");
            }
            Ok(store.delete_all()?)
        }
    }
}

#[cfg(test)]
#[path = "delete_tests.rs"]
mod tests;
