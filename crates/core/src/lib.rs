// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! sk-core: Bounded local storage for session events
//!
//! This crate provides the session record model, payload values, and the
//! SQLite-backed [`SessionStore`] used by the sync engine and the `sk` CLI.

pub mod clock;
pub mod error;
pub mod record;
pub mod store;
pub mod value;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use record::{generate_session_id, RecordId, SessionRecord};
pub use store::{
    OverflowPolicy, SessionStore, StorageStats, StoreConfig, DEFAULT_LOW_WATER_RATIO,
    DEFAULT_MAX_SIZE_BYTES,
};
pub use value::{Value, MAX_NESTING_DEPTH};
