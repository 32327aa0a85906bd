// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! At-most-one-in-flight guard.

use std::sync::Arc;

use tokio::sync::watch;

/// Flag that admits one holder at a time.
#[derive(Debug, Clone)]
pub struct SingleFlight {
    busy: Arc<watch::Sender<bool>>,
}

impl Default for SingleFlight {
    fn default() -> Self {
        let (busy, _) = watch::channel(false);
        SingleFlight { busy: Arc::new(busy) }
    }
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the flag, or `None` if someone already holds it.
    pub fn try_begin(&self) -> Option<FlightGuard> {
        let claimed = self.busy.send_if_modified(|busy| {
            if *busy {
                false
            } else {
                *busy = true;
                true
            }
        });
        claimed.then(|| FlightGuard { busy: Arc::clone(&self.busy) })
    }

    pub fn is_busy(&self) -> bool {
        *self.busy.borrow()
    }

    /// Resolves once no guard is held.
    pub async fn idle(&self) {
        let mut busy = self.busy.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = busy.wait_for(|busy| !*busy).await;
    }
}

/// Releases the flag when dropped, including on early return or panic.
#[derive(Debug)]
pub struct FlightGuard {
    busy: Arc<watch::Sender<bool>>,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.busy.send_replace(false);
    }
}

#[cfg(test)]
#[path = "flight_tests.rs"]
mod tests;
