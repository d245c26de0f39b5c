//! Integration tests for the on-disk store layout
//!
//! Stores are written file by file so these tests pin the naming contract
//! independently of `MessageStore::save`.

use mqtt_recorder::{ReplayScheduler, StoreError};

use super::common::determinism::test_at;
use super::common::store_fixtures::TestStore;

/// Test that files written in the documented layout load with topic and time intact
#[tokio::test]
async fn test_hand_written_store_loads() {
    let store = TestStore::new();
    store.write_raw(
        "zigbee2mqtt/living_room/sensor/2024-01-01T00:00:00.250Z_4242.json",
        b"{\"temperature\":21.5}",
    );

    let records = store.store().load_all().await.expect("Store should load");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].topic, "zigbee2mqtt/living_room/sensor");
    assert_eq!(records[0].timestamp, test_at(250));
    assert_eq!(records[0].payload.as_ref(), b"{\"temperature\":21.5}");
}

/// Test that out-of-order files come back in timestamp order once scheduled
#[tokio::test]
async fn test_loaded_records_schedule_in_timestamp_order() {
    let store = TestStore::new();
    store.write("plant/line1", test_at(0), 1001, b"t0");
    store.write("plant/line2", test_at(5_000), 1002, b"t0+5s");
    store.write("plant/line1/motor", test_at(2_000), 1003, b"t0+2s");

    let records = store.store().load_all().await.expect("Store should load");
    let scheduler = ReplayScheduler::new(records);

    let payloads: Vec<_> = scheduler
        .records()
        .iter()
        .map(|r| String::from_utf8(r.payload.to_vec()).unwrap())
        .collect();
    assert_eq!(payloads, vec!["t0", "t0+2s", "t0+5s"]);
}

/// Test that a stray file inside a topic directory fails the whole load
#[tokio::test]
async fn test_stray_file_fails_load() {
    let store = TestStore::new();
    store.write("a/b", test_at(0), 1234, b"ok");
    store.write_raw("a/b/.DS_Store", b"junk");

    let err = store.store().load_all().await.unwrap_err();

    assert!(matches!(err, StoreError::MalformedPath { .. }));
}

/// Test that very deep topic hierarchies are enumerated
#[tokio::test]
async fn test_deep_topic_hierarchy_is_enumerated() {
    let store = TestStore::new();
    let topic = (0..64).map(|i| format!("l{i}")).collect::<Vec<_>>().join("/");
    store.write(&topic, test_at(0), 9999, b"deep");

    let records = store.store().load_all().await.expect("Store should load");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].topic, topic);
}
