//! Integration tests for the capture -> store -> replay flow
//!
//! Capture is driven through an in-process event channel and replay through
//! `MemoryBroker`, so no broker is needed.

use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use mqtt_recorder::{replay_store, BrokerEvent, CapturePipeline, MemoryBroker, ReplayScheduler};

use super::common::determinism::test_at;
use super::common::store_fixtures::TestStore;

fn inbound(topic: &str, payload: &str) -> BrokerEvent {
    BrokerEvent::Message {
        topic: topic.to_string(),
        payload: Bytes::from(payload.to_string()),
    }
}

/// Test that captured messages replay with the same topics, payloads and spacing
#[tokio::test]
async fn test_capture_then_replay_round_trip() {
    let store = TestStore::new();
    let (tx, rx) = mpsc::channel(16);

    let pipeline = CapturePipeline::new(store.store());
    let capture = tokio::spawn(async move { pipeline.run(rx, CancellationToken::new()).await });

    tx.send(BrokerEvent::Connected).await.unwrap();
    tx.send(inbound("sensors/room1/temp", "21.5")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    tx.send(inbound("sensors/room2/temp", "19.0")).await.unwrap();
    drop(tx);

    let summary = capture.await.unwrap().expect("Capture should succeed");
    assert_eq!(summary.saved, 2);
    assert_eq!(summary.failed, 0);

    let mut stored = store.store().load_all().await.unwrap();
    stored.sort_by_key(|r| r.timestamp);
    let stored_gap = (stored[1].timestamp - stored[0].timestamp)
        .to_std()
        .unwrap();

    let broker = MemoryBroker::new();
    let replayed = replay_store(&store.store(), &broker, &CancellationToken::new())
        .await
        .expect("Replay should succeed");
    assert_eq!(replayed.published, 2);

    let published = broker.published();
    assert_eq!(published[0].topic, "sensors/room1/temp");
    assert_eq!(published[0].payload, Bytes::from_static(b"21.5"));
    assert_eq!(published[1].topic, "sensors/room2/temp");
    assert_eq!(published[1].payload, Bytes::from_static(b"19.0"));

    let replay_gap = published[1].at - published[0].at;
    let drift = if replay_gap > stored_gap {
        replay_gap - stored_gap
    } else {
        stored_gap - replay_gap
    };
    assert!(
        drift <= Duration::from_millis(50),
        "stored gap {stored_gap:?}, replayed gap {replay_gap:?}"
    );
}

/// Test that a stored sequence replays starting now with its original offsets
#[tokio::test(start_paused = true)]
async fn test_replay_starts_now_and_keeps_offsets() {
    let store = TestStore::new();
    store.write("line/a", test_at(0), 1111, b"first");
    store.write("line/b", test_at(3_000), 2222, b"second");
    store.write("line/a", test_at(4_500), 3333, b"third");

    let broker = MemoryBroker::new();
    let start = Instant::now();
    let summary = replay_store(&store.store(), &broker, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.published, 3);
    let offsets: Vec<_> = broker
        .published()
        .iter()
        .map(|m| (m.at - start).as_millis())
        .collect();
    assert_eq!(offsets, vec![0, 3_000, 4_500]);
}

/// Test that cancelling mid-replay keeps what was already published
#[tokio::test(start_paused = true)]
async fn test_cancelled_replay_is_partial() {
    let store = TestStore::new();
    store.write("t", test_at(0), 1000, b"1");
    store.write("t", test_at(10_000), 1001, b"2");
    // Load before arming the timer so the paused clock cannot jump during file I/O.
    let scheduler = ReplayScheduler::new(store.store().load_all().await.unwrap());
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });

    let broker = MemoryBroker::new();
    let summary = scheduler.run(&broker, &cancel).await.unwrap();

    assert!(summary.cancelled);
    assert_eq!(summary.published, 1);
    assert_eq!(broker.published().len(), 1);
}
