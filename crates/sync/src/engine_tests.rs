// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::test_helpers::{fast_policy, memory_store, seed, MockTransport, Outcome};
use std::sync::Arc;
use tokio::time::Instant;

fn engine(store: &SharedStore, mock: &MockTransport) -> SyncEngine<MockTransport> {
    SyncEngine::new(store.clone(), mock.clone()).with_policy(fast_policy())
}

async fn unsynced_ids(store: &SharedStore) -> Vec<String> {
    store
        .fetch_unsynced()
        .await
        .unwrap()
        .iter()
        .map(|r| r.session_id().to_string())
        .collect()
}

#[test]
fn test_delay_grows_linearly() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.delay_for(1), Duration::from_secs(1));
    assert_eq!(policy.delay_for(2), Duration::from_secs(2));
    assert_eq!(policy.max_attempts, 3);
    assert_eq!(policy.attempt_timeout, Duration::from_secs(30));
}

#[tokio::test]
async fn test_sync_all_uploads_oldest_first_and_marks() {
    let (store, _clock) = memory_store();
    let mock = MockTransport::new();
    seed(&store, "late", 30).await;
    seed(&store, "early", 0).await;
    seed(&store, "middle", 10).await;

    let result = engine(&store, &mock).sync_all().await.unwrap();

    assert_eq!(result, SyncResult { successful: 3, failed: 0, errors: vec![] });
    assert_eq!(mock.uploaded_ids(), ["early", "middle", "late"]);
    assert!(unsynced_ids(&store).await.is_empty());
    assert!(mock.calls().iter().all(|c| c.path == SESSIONS_PATH));
}

#[tokio::test]
async fn test_sync_all_with_nothing_pending() {
    let (store, _clock) = memory_store();
    let mock = MockTransport::new();

    let result = engine(&store, &mock).sync_all().await.unwrap();

    assert_eq!(result, SyncResult::default());
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn test_synced_records_are_not_uploaded_again() {
    let (store, _clock) = memory_store();
    let mock = MockTransport::new();
    seed(&store, "a", 0).await;
    let engine = engine(&store, &mock);

    engine.sync_all().await.unwrap();
    let second = engine.sync_all().await.unwrap();

    assert_eq!(second.attempted(), 0);
    assert_eq!(mock.calls().len(), 1);
}

#[tokio::test]
async fn test_partial_failure_is_isolated() {
    let (store, _clock) = memory_store();
    let mock = MockTransport::new();
    seed(&store, "first", 0).await;
    seed(&store, "second", 1).await;
    seed(&store, "third", 2).await;
    mock.always_fail("second");

    let result = engine(&store, &mock).sync_all().await.unwrap();

    assert_eq!(result.successful, 2);
    assert_eq!(result.failed, 1);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].session_id, "second");
    assert!(result.errors[0].error_message.contains("500"));
    assert_eq!(unsynced_ids(&store).await, ["second"]);
    // first, three tries of second, third
    assert_eq!(mock.uploaded_ids(), ["first", "second", "second", "second", "third"]);
}

#[tokio::test(start_paused = true)]
async fn test_retry_succeeds_on_third_attempt_with_linear_backoff() {
    let (store, _clock) = memory_store();
    let mock = MockTransport::new();
    let record = seed(&store, "flaky", 0).await;
    mock.script([Outcome::Transport, Outcome::Transport]);
    let engine = SyncEngine::new(store.clone(), mock.clone());

    let started = Instant::now();
    let result = engine.sync_all().await.unwrap();

    assert_eq!(result.successful, 1);
    assert_eq!(mock.calls().len(), 3);
    // 1s after the first failure, 2s after the second
    assert!(started.elapsed() >= Duration::from_secs(3));
    assert!(store.get(record.id()).await.unwrap().synced());
}

#[tokio::test]
async fn test_retries_exhausted_leaves_record_unsynced() {
    let (store, _clock) = memory_store();
    let mock = MockTransport::new();
    seed(&store, "down", 0).await;
    mock.script([Outcome::Status(503), Outcome::Status(503), Outcome::Status(503)]);

    let result = engine(&store, &mock).sync_all().await.unwrap();

    assert_eq!(result.failed, 1);
    assert_eq!(mock.calls().len(), 3);
    assert_eq!(unsynced_ids(&store).await, ["down"]);
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let (store, _clock) = memory_store();
    let mock = MockTransport::new();
    let record = seed(&store, "rejected", 0).await;
    mock.script([Outcome::Status(422)]);

    let err = engine(&store, &mock).upload_one(&record).await.unwrap_err();

    assert!(matches!(err, SyncError::Server { status: 422 }));
    assert_eq!(mock.calls().len(), 1);
}

#[tokio::test]
async fn test_upload_one_does_not_mark() {
    let (store, _clock) = memory_store();
    let mock = MockTransport::new();
    let record = seed(&store, "a", 0).await;

    engine(&store, &mock).upload_one(&record).await.unwrap();

    assert!(!store.get(record.id()).await.unwrap().synced());
    let body = &mock.calls()[0].body;
    assert_eq!(body["localId"], serde_json::json!(record.id().to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_hung_attempt_times_out_and_retries() {
    let (store, _clock) = memory_store();
    let mock = MockTransport::new();
    seed(&store, "slow", 0).await;
    mock.script([Outcome::Hang]);
    let policy = RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_secs(1),
        attempt_timeout: Duration::from_millis(100),
    };
    let engine = SyncEngine::new(store.clone(), mock.clone()).with_policy(policy);

    let result = engine.sync_all().await.unwrap();

    assert_eq!(result.successful, 1);
    assert_eq!(mock.calls().len(), 2);
}

#[tokio::test]
async fn test_concurrent_sync_returns_empty_result() {
    let (store, _clock) = memory_store();
    let mock = MockTransport::new();
    seed(&store, "a", 0).await;
    mock.hold();
    let engine = Arc::new(engine(&store, &mock));

    let running = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move { engine.sync_all().await }
    });
    mock.entered().await;
    assert!(engine.is_syncing());

    let skipped = engine.sync_all().await.unwrap();
    assert_eq!(skipped, SyncResult::default());

    mock.release(1);
    let result = running.await.unwrap().unwrap();
    assert_eq!(result.successful, 1);
    assert_eq!(mock.calls().len(), 1);
    assert!(!engine.is_syncing());
}

#[tokio::test]
async fn test_record_deleted_mid_upload_counts_as_failure() {
    let (store, _clock) = memory_store();
    let mock = MockTransport::new();
    let record = seed(&store, "gone", 0).await;
    mock.hold();
    let engine = Arc::new(engine(&store, &mock));

    let running = tokio::spawn({
        let engine = Arc::clone(&engine);
        async move { engine.sync_all().await }
    });
    mock.entered().await;
    store.delete(record.id()).await.unwrap();
    mock.release(1);

    let result = running.await.unwrap().unwrap();
    assert_eq!(result.successful, 0);
    assert_eq!(result.failed, 1);
    assert!(result.errors[0].error_message.contains("not found"));
}

#[tokio::test]
async fn test_batch_upload_marks_all() {
    let (store, _clock) = memory_store();
    let mock = MockTransport::new();
    for (i, name) in ["a", "b", "c"].iter().enumerate() {
        seed(&store, name, i as i64).await;
    }

    let result = engine(&store, &mock).with_batch_size(10).sync_all().await.unwrap();

    assert_eq!(result.successful, 3);
    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].path, BATCH_PATH);
    assert_eq!(calls[0].body["sessions"].as_array().unwrap().len(), 3);
    assert!(unsynced_ids(&store).await.is_empty());
}

#[tokio::test]
async fn test_batches_are_chunked() {
    let (store, _clock) = memory_store();
    let mock = MockTransport::new();
    for (i, name) in ["a", "b", "c"].iter().enumerate() {
        seed(&store, name, i as i64).await;
    }

    let result = engine(&store, &mock).with_batch_size(2).sync_all().await.unwrap();

    assert_eq!(result.successful, 3);
    let sizes: Vec<_> = mock
        .calls()
        .iter()
        .map(|c| c.body["sessions"].as_array().unwrap().len())
        .collect();
    assert_eq!(sizes, [2, 1]);
}

#[tokio::test]
async fn test_failed_batch_falls_back_to_single_uploads() {
    let (store, _clock) = memory_store();
    let mock = MockTransport::new();
    for (i, name) in ["a", "b", "c"].iter().enumerate() {
        seed(&store, name, i as i64).await;
    }
    mock.fail_batches();
    mock.always_fail("b");

    let result = engine(&store, &mock).with_batch_size(3).sync_all().await.unwrap();

    assert_eq!(result.successful, 2);
    assert_eq!(result.failed, 1);
    assert_eq!(result.errors[0].session_id, "b");
    assert_eq!(mock.calls()[0].path, BATCH_PATH);
    assert_eq!(unsynced_ids(&store).await, ["b"]);
}

#[tokio::test]
async fn test_upload_batch_empty_is_noop() {
    let (store, _clock) = memory_store();
    let mock = MockTransport::new();

    let result = engine(&store, &mock).upload_batch(&[]).await;

    assert_eq!(result, SyncResult::default());
    assert!(mock.calls().is_empty());
}

#[test]
fn test_sync_result_serializes_camel_case() {
    let result = SyncResult {
        successful: 1,
        failed: 1,
        errors: vec![SyncFailure { session_id: "s".into(), error_message: "boom".into() }],
    };
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["errors"][0]["sessionId"], "s");
    assert_eq!(json["errors"][0]["errorMessage"], "boom");
}
