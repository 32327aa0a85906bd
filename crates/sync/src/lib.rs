// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! sk-sync: Cloud synchronization for locally stored sessions
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐   ┌─────────────┐   ┌─────────────┐   ┌─────────┐
//! │ SessionManager │──►│  Scheduler  │──►│   Engine    │──►│Transport│──► remote
//! └────────────────┘   └─────────────┘   └─────────────┘   └─────────┘
//!         │                   ▲                 │
//!         ▼                   │                 ▼
//!   ┌───────────┐    ┌────────────────┐   ┌───────────┐
//!   │SharedStore│    │  Connectivity  │   │SharedStore│
//!   └───────────┘    └────────────────┘   └───────────┘
//! ```
//!
//! - Uploads oldest first, marks synced only on a confirmed 2xx
//! - Bounded retry for transient failures, one bad record never blocks others
//! - At most one sync at a time; triggers during a sync are dropped
//! - Injectable transport trait for testing

pub mod connectivity;
pub mod engine;
pub mod error;
pub mod flight;
pub mod manager;
pub mod scheduler;
pub mod shared;
pub mod transport;
pub mod wire;

pub use connectivity::{ConnectivityMonitor, HttpProbe, Reachability, TcpReachability};
pub use engine::{RetryPolicy, SyncEngine, SyncFailure, SyncResult};
pub use error::{Result, SyncError};
pub use manager::{SessionManager, DEFAULT_RECENT_LIMIT};
pub use scheduler::{SchedulerConfig, SchedulerState, SyncScheduler, Trigger, DEFAULT_SYNC_INTERVAL};
pub use shared::SharedStore;
pub use transport::{HttpTransport, Transport};

#[cfg(test)]
mod test_helpers;
