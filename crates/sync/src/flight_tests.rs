// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use super::*;

#[test]
fn second_begin_is_refused_while_held() {
    let flight = SingleFlight::new();
    let guard = flight.try_begin().unwrap();
    assert!(flight.is_busy());
    assert!(flight.try_begin().is_none());
    drop(guard);
    assert!(!flight.is_busy());
    assert!(flight.try_begin().is_some());
}

#[test]
fn clones_share_the_flag() {
    let flight = SingleFlight::new();
    let other = flight.clone();
    let _guard = flight.try_begin().unwrap();
    assert!(other.try_begin().is_none());
}

#[test]
fn guard_released_on_panic() {
    let flight = SingleFlight::new();
    let inner = flight.clone();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
        let _guard = inner.try_begin().unwrap();
        panic!("sync blew up");
    }));
    assert!(result.is_err());
    assert!(!flight.is_busy());
}

#[tokio::test]
async fn idle_resolves_at_once_when_free() {
    let flight = SingleFlight::new();
    tokio::time::timeout(std::time::Duration::from_secs(1), flight.idle()).await.unwrap();
}

#[tokio::test]
async fn idle_waits_for_guard_release() {
    let flight = SingleFlight::new();
    let guard = flight.try_begin().unwrap();

    let waiter = {
        let flight = flight.clone();
        tokio::spawn(async move { flight.idle().await })
    };
    tokio::task::yield_now().await;
    assert!(!waiter.is_finished());

    drop(guard);
    tokio::time::timeout(std::time::Duration::from_secs(1), waiter).await.unwrap().unwrap();
    assert!(!flight.is_busy());
}
