use super::*;
use crate::config::StoreConfig;
use serde_json::json;

fn make_event(kind: &str, id: &str, ts: i64) -> Event {
    Event {
        id: id.to_string(),
        kind: kind.to_string(),
        timestamp: ts,
        payload: json!({}),
        meta: None,
    }
}

fn small_store() -> EventStore {
    EventStore::new(StoreConfig {
        max_events: 5,
        max_telemetry: 3,
        max_detections: 3,
        default_window: 4,
        snapshot_window: 4,
    })
}

#[test]
fn bounded_log_never_exceeds_capacity() {
    let mut log = BoundedLog::new(3);
    for i in 0..10 {
        log.push(make_event("x", &format!("e{i}"), i));
        assert!(log.len() <= 3);
    }

    // survivors are exactly the most recent 3, in original relative order
    let ids: Vec<&str> = log.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["e7", "e8", "e9"]);
}

#[test]
fn bounded_log_window_is_oldest_first() {
    let mut log = BoundedLog::new(10);
    for i in 0..6 {
        log.push(make_event("x", &format!("e{i}"), i));
    }

    let window = log.window(3, None);
    let ids: Vec<&str> = window.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["e3", "e4", "e5"]);
}

#[test]
fn bounded_log_window_since_is_strict() {
    let mut log = BoundedLog::new(10);
    for i in 0..5 {
        log.push(make_event("x", &format!("e{i}"), i * 10));
    }

    let window = log.window(10, Some(20));
    let ids: Vec<&str> = window.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["e3", "e4"]); // ts 30 and 40, strictly newer than 20
}

#[test]
fn ingest_routes_by_kind_prefix() {
    let store = small_store();
    store.ingest(make_event("telemetry:update", "t1", 1));
    store.ingest(make_event("detection:new", "d1", 2));
    store.ingest(make_event("status:ping", "s1", 3));

    let summary = store.summary();
    assert_eq!(summary.totals.events, 3);
    assert_eq!(summary.totals.telemetry, 1);
    assert_eq!(summary.totals.detections, 1);
}

#[test]
fn collections_are_independently_capped() {
    let store = small_store();
    for i in 0..10 {
        store.ingest(make_event("telemetry:update", &format!("t{i}"), i));
    }

    let summary = store.summary();
    assert_eq!(summary.totals.events, 5); // max_events
    assert_eq!(summary.totals.telemetry, 3); // max_telemetry
}

#[test]
fn ingest_many_counts_accepted() {
    let store = small_store();
    let raw = json!([
        {"payload": {"drone_id": "BLUE-1", "lat": 13.7563, "lon": 100.5018}},
        "garbage",
    ]);

    let accepted = store.ingest_many(&raw, Some("telemetry:update"));
    assert_eq!(accepted, 1);

    let telemetry = store.list_telemetry(None);
    assert_eq!(telemetry.len(), 1);
    assert_eq!(telemetry[0].payload_str("drone_id"), Some("BLUE-1"));
}

#[test]
fn ingest_many_null_body_accepts_nothing() {
    let store = small_store();
    store.ingest(make_event("telemetry:update", "t1", 1));

    let accepted = store.ingest_many(&json!(null), Some("telemetry:update"));
    assert_eq!(accepted, 0);
    // collection state unchanged
    assert_eq!(store.summary().totals.telemetry, 1);
}

#[test]
fn list_limit_clamped_to_capacity() {
    let store = small_store();
    for i in 0..10 {
        store.ingest(make_event("detection:new", &format!("d{i}"), i));
    }

    // caller asks for more than max_detections; gets at most the cap
    assert_eq!(store.list_detections(Some(1000)).len(), 3);
    // zero is bumped to one
    assert_eq!(store.list_detections(Some(0)).len(), 1);
}

#[test]
fn summary_latest_entries() {
    let store = small_store();
    assert!(store.summary().latest_telemetry.is_none());
    assert!(store.summary().latest_detection.is_none());

    store.ingest(make_event("telemetry:update", "t1", 1));
    store.ingest(make_event("telemetry:update", "t2", 2));
    store.ingest(make_event("detection:new", "d1", 3));

    let summary = store.summary();
    assert_eq!(summary.latest_telemetry.unwrap().id, "t2");
    assert_eq!(summary.latest_detection.unwrap().id, "d1");
    assert_eq!(summary.metrics.total_events, 3);
}

#[test]
fn summary_totals_track_k_plus_m() {
    let store = EventStore::new(StoreConfig::default());
    for i in 0..4 {
        store.ingest(make_event("telemetry:update", &format!("t{i}"), i));
    }
    for i in 0..3 {
        store.ingest(make_event("detection:new", &format!("d{i}"), i));
    }

    let totals = store.summary().totals;
    assert_eq!(totals.events, 7);
    assert_eq!(totals.telemetry, 4);
    assert_eq!(totals.detections, 3);
}

#[test]
fn subscribers_receive_ingested_events() {
    let store = small_store();
    let mut rx = store.subscribe();

    store.ingest(make_event("detection:new", "d1", 1));

    let received = rx.try_recv().unwrap();
    assert_eq!(received.id, "d1");
}

#[test]
fn ingest_without_subscribers_is_fine() {
    let store = small_store();
    store.ingest(make_event("detection:new", "d1", 1));
    assert_eq!(store.summary().totals.events, 1);
}

#[test]
fn catch_up_returns_snapshot_window() {
    let store = small_store();
    for i in 0..5 {
        store.ingest(make_event("status:ping", &format!("s{i}"), i));
    }

    // snapshot_window = 4: the four most recent, oldest first
    let snapshot = store.catch_up();
    let ids: Vec<&str> = snapshot.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["s1", "s2", "s3", "s4"]);
}
