// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Memorizer Contributors

use super::*;
use memo_core::test_support::{analysis_failed_event, path_changed_event, path_deleted_event, path_remembered_event};

fn bus(dir: &std::path::Path) -> EventBus {
    EventBus::new(BusConfig {
        channel_capacity: 4,
        critical_queue_capacity: 16,
        overflow_path: dir.join("overflow.jsonl"),
    })
}

#[tokio::test]
async fn publish_delivers_to_matching_kind_subscriber() {
    let dir = tempfile::tempdir().unwrap();
    let bus = bus(dir.path());
    let (_handle, mut rx) = bus.subscribe("path_changed", "planner");
    bus.publish(path_changed_event("/a/x.md", "/a")).unwrap();
    let received = rx.recv().await.unwrap();
    assert_eq!(received.kind(), "path_changed");
}

#[tokio::test]
async fn publish_ignores_subscribers_of_other_kinds() {
    let dir = tempfile::tempdir().unwrap();
    let bus = bus(dir.path());
    let (_handle, mut rx) = bus.subscribe("path_remembered", "walker");
    bus.publish(path_changed_event("/a/x.md", "/a")).unwrap();
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn unsubscribe_is_idempotent_and_stops_delivery() {
    let dir = tempfile::tempdir().unwrap();
    let bus = bus(dir.path());
    let (handle, mut rx) = bus.subscribe("path_changed", "planner");
    bus.unsubscribe(&handle);
    bus.unsubscribe(&handle);
    bus.publish(path_changed_event("/a/x.md", "/a")).unwrap();
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn full_channel_drops_non_critical_event_and_counts_it() {
    let dir = tempfile::tempdir().unwrap();
    let bus = EventBus::new(BusConfig {
        channel_capacity: 1,
        critical_queue_capacity: 16,
        overflow_path: dir.path().join("overflow.jsonl"),
    });
    let (_handle, _rx) = bus.subscribe("path_remembered", "walker");
    bus.publish(path_remembered_event("/a")).unwrap();
    bus.publish(path_remembered_event("/b")).unwrap();
    assert_eq!(bus.dropped_count("path_remembered", "walker"), 1);
}

#[tokio::test]
async fn full_channel_spills_critical_event_to_overflow() {
    let dir = tempfile::tempdir().unwrap();
    let bus = EventBus::new(BusConfig {
        channel_capacity: 1,
        critical_queue_capacity: 16,
        overflow_path: dir.path().join("overflow.jsonl"),
    });
    let (_handle, _rx) = bus.subscribe("path_deleted", "cleaner");
    bus.publish(path_deleted_event("/a/1.md", "/a")).unwrap();
    bus.publish(path_deleted_event("/a/2.md", "/a")).unwrap();
    assert_eq!(bus.overflow_len(), 1);
    assert_eq!(bus.dropped_count("path_deleted", "cleaner"), 0);
}

#[tokio::test]
async fn publish_after_close_fails() {
    let dir = tempfile::tempdir().unwrap();
    let bus = bus(dir.path());
    bus.close();
    let err = bus.publish(path_changed_event("/a/x.md", "/a")).unwrap_err();
    assert!(matches!(err, BusError::Closed));
}

#[tokio::test]
async fn delivery_order_matches_publish_order() {
    let dir = tempfile::tempdir().unwrap();
    let bus = EventBus::new(BusConfig {
        channel_capacity: 8,
        critical_queue_capacity: 16,
        overflow_path: dir.path().join("overflow.jsonl"),
    });
    let (_handle, mut rx) = bus.subscribe("path_remembered", "walker");
    for i in 0..5 {
        bus.publish(path_remembered_event(&format!("/{i}"))).unwrap();
    }
    for i in 0..5 {
        let event = rx.recv().await.unwrap();
        let memo_core::Event::PathRemembered { path, .. } = event else { panic!("wrong kind") };
        assert_eq!(path, std::path::PathBuf::from(format!("/{i}")));
    }
}

#[tokio::test]
async fn redeliver_overflow_does_not_lose_interleaved_kinds() {
    let dir = tempfile::tempdir().unwrap();
    let bus = EventBus::new(BusConfig {
        channel_capacity: 1,
        critical_queue_capacity: 16,
        overflow_path: dir.path().join("overflow.jsonl"),
    });
    let (_deleted_handle, mut deleted_rx) = bus.subscribe("path_deleted", "cleaner");
    let (_failed_handle, mut failed_rx) = bus.subscribe("analysis_failed", "worker");

    // First publish of each kind fills its subscriber's one-slot channel;
    // the second of each kind spills, interleaving the two kinds in the
    // shared overflow journal.
    bus.publish(path_deleted_event("/a/1.md", "/a")).unwrap();
    bus.publish(analysis_failed_event("/a/1.md")).unwrap();
    bus.publish(path_deleted_event("/a/2.md", "/a")).unwrap();
    bus.publish(analysis_failed_event("/a/2.md")).unwrap();
    assert_eq!(bus.overflow_len(), 2);

    // Draining the subscriber's channel makes room for redelivery.
    deleted_rx.recv().await.unwrap();
    failed_rx.recv().await.unwrap();

    let redelivered = bus.redeliver_overflow("analysis_failed").unwrap();
    assert_eq!(redelivered, 1);
    assert_eq!(bus.overflow_len(), 1, "the spilled path_deleted record must survive");

    let redelivered = bus.redeliver_overflow("path_deleted").unwrap();
    assert_eq!(redelivered, 1);
    assert_eq!(bus.overflow_len(), 0);
}

#[tokio::test]
async fn redeliver_overflow_stops_when_the_subscriber_channel_is_still_full() {
    let dir = tempfile::tempdir().unwrap();
    let bus = EventBus::new(BusConfig {
        channel_capacity: 1,
        critical_queue_capacity: 16,
        overflow_path: dir.path().join("overflow.jsonl"),
    });
    let (_handle, _rx) = bus.subscribe("path_deleted", "cleaner");
    bus.publish(path_deleted_event("/a/1.md", "/a")).unwrap();
    bus.publish(path_deleted_event("/a/2.md", "/a")).unwrap();
    assert_eq!(bus.overflow_len(), 1);

    // The channel is still full (nobody drained it), so nothing delivers.
    let redelivered = bus.redeliver_overflow("path_deleted").unwrap();
    assert_eq!(redelivered, 0);
    assert_eq!(bus.overflow_len(), 1);
}
