// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sk_core::{SessionRecord, SessionStore};

use crate::cli::OutputArgs;
use crate::error::{Error, Result};

use super::recent::print_records;
use super::Context;

/// Filters for `sk list`. All given filters must match.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub user: Option<String>,
    pub query: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub unsynced: bool,
    pub limit: Option<usize>,
}

impl ListFilter {
    fn matches(&self, record: &SessionRecord) -> bool {
        if let Some(user) = &self.user {
            if record.user_id() != Some(user.as_str()) {
                return false;
            }
        }
        if let Some(query) = &self.query {
            let query = query.to_ascii_lowercase();
            let contains = |s: &str| s.to_ascii_lowercase().contains(&query);
            if !contains(record.session_id()) && !record.user_id().is_some_and(contains) {
                return false;
            }
        }
        if self.since.is_some_and(|since| record.timestamp() < since) {
            return false;
        }
        if self.until.is_some_and(|until| record.timestamp() > until) {
            return false;
        }
        !(self.unsynced && record.synced())
    }
}

/// Which end of a date-only bound to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Bound {
    Start,
    End,
}

/// Parses an RFC 3339 timestamp, or a `YYYY-MM-DD` date covering the whole day.
pub(crate) fn parse_time(value: &str, bound: Bound) -> Result<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| Error::InvalidTimestamp(value.to_string()))?;
    let time = match bound {
        Bound::Start => NaiveTime::from_hms_opt(0, 0, 0),
        Bound::End => NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999),
    }
    .ok_or_else(|| Error::InvalidTimestamp(value.to_string()))?;
    Ok(date.and_time(time).and_utc())
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    ctx: &Context,
    user: Option<String>,
    query: Option<String>,
    since: Option<String>,
    until: Option<String>,
    unsynced: bool,
    limit: Option<usize>,
    output: &OutputArgs,
) -> Result<()> {
    let filter = ListFilter {
        user,
        query,
        since: since.as_deref().map(|s| parse_time(s, Bound::Start)).transpose()?,
        until: until.as_deref().map(|s| parse_time(s, Bound::End)).transpose()?,
        unsynced,
        limit,
    };
    let (_lock, store) = ctx.open_store()?;
    let records = run_impl(&store, &filter)?;
    print_records(&records, output)
}

/// Most recent first. Narrows with the most selective store query, then
/// applies the remaining filters.
pub(crate) fn run_impl(store: &SessionStore, filter: &ListFilter) -> Result<Vec<SessionRecord>> {
    if let (Some(since), Some(until)) = (filter.since, filter.until) {
        if since > until {
            return Err(Error::InvalidInput(format!(
                "--since ({}) is after --until ({})",
                since.to_rfc3339(),
                until.to_rfc3339()
            )));
        }
    }

    let candidates = if let Some(user) = &filter.user {
        store.by_user(user)?
    } else if let (Some(since), Some(until)) = (filter.since, filter.until) {
        store.in_range(since, until)?
    } else if let Some(query) = &filter.query {
        store.search(query)?
    } else {
        store.recent(usize::MAX)?
    };

    let matching = candidates.into_iter().filter(|r| filter.matches(r));
    Ok(match filter.limit {
        Some(limit) => matching.take(limit).collect(),
        None => matching.collect(),
    })
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
