// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the complete Parley pipeline.
//!
//! Each test builds an isolated TestHarness. Tests are independent and
//! order-insensitive.

use std::sync::Arc;
use std::time::Duration;

use parley_config::model::{StorageBackend, StorageConfig};
use parley_core::types::Direction;
use parley_core::MessageStore;
use parley_engine::{ChatEngine, EngineEvent, EngineSettings, ShuffleScrambler, TimelineRules, TokioClock};
use parley_storage::SqliteStore;
use parley_test_utils::TestHarness;

// ---- Conversation flow ----

#[tokio::test(start_paused = true)]
async fn test_conversation_alternates_sides() {
    let harness = TestHarness::new().await.unwrap();

    harness.send("how are you").await.unwrap();
    harness.wait_ms(5_500).await;
    harness.send("still there?").await.unwrap();
    harness.wait_ms(5_500).await;

    let timeline = harness.timeline();
    let directions: Vec<Direction> = timeline.iter().map(|e| e.message.direction).collect();
    assert_eq!(
        directions,
        vec![
            Direction::Sent,
            Direction::Received,
            Direction::Sent,
            Direction::Received
        ]
    );
    assert!(timeline.iter().all(|e| !e.tighten_spacing));
    assert!(timeline[0].timestamp_label.is_some());
    assert!(timeline[1..].iter().all(|e| e.timestamp_label.is_none()));
}

#[tokio::test(start_paused = true)]
async fn test_rapid_burst_is_tightened_and_answered_once() {
    let harness = TestHarness::new().await.unwrap();
    for word in ["one", "two", "three", "four"] {
        harness.send(word).await.unwrap();
        harness.wait_ms(1_000).await;
    }
    harness.wait_ms(5_000).await;

    let replies = harness.replies().await;
    assert_eq!(replies.len(), 1);
    let mut got: Vec<char> = replies[0].content.chars().collect();
    got.sort_unstable();
    let mut want: Vec<char> = "four".chars().collect();
    want.sort_unstable();
    assert_eq!(got, want);

    let timeline = harness.timeline();
    assert!(timeline[1..4].iter().all(|e| e.tighten_spacing));
}

#[tokio::test(start_paused = true)]
async fn test_blank_input_is_rejected_end_to_end() {
    let harness = TestHarness::new().await.unwrap();
    assert!(harness.send("   ").await.is_err());
    harness.wait_ms(10_000).await;
    assert!(harness.messages().await.is_empty());
}

// ---- Persistence ----

#[tokio::test]
async fn test_history_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig {
        backend: StorageBackend::Sqlite,
        database_path: dir.path().join("parley.db").to_string_lossy().to_string(),
        wal_mode: true,
    };

    {
        let store = Arc::new(SqliteStore::new(config.clone()));
        store.initialize().await.unwrap();
        let engine = ChatEngine::new(
            store.clone(),
            Arc::new(TokioClock::new()),
            Arc::new(ShuffleScrambler::seeded(9)),
            TimelineRules::default(),
            EngineSettings {
                quiet_period: Duration::from_millis(30),
                auto_reply: true,
            },
        );
        let mut events = engine.events();
        engine.send("remember me").await.unwrap();

        tokio::time::timeout(Duration::from_secs(5), async {
            while !matches!(events.recv().await, Ok(EngineEvent::ReplyDelivered { .. })) {}
        })
        .await
        .expect("reply should land");
        store.close().await.unwrap();
    }

    let store = SqliteStore::new(config);
    store.initialize().await.unwrap();
    let messages = store.messages().await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, "remember me");
    assert_eq!(messages[1].direction, Direction::Received);

    let timeline = TimelineRules::default().transform(&messages);
    assert_eq!(timeline.len(), 2);
    assert_eq!(store.subscribe().borrow().as_slice(), messages.as_slice());
}
