use super::{DeliveredMessage, QueueStore};
use crate::utils::error::BrokerError;

fn delivered(id: &str, payload: &str) -> DeliveredMessage {
    DeliveredMessage {
        message_id: id.to_string(),
        topic_id: "local:topic:test".to_string(),
        payload: payload.to_string(),
        timestamp: 0,
    }
}

#[test]
fn test_ensure_creates_empty_queue() {
    let store = QueueStore::new(10);
    assert_eq!(store.depth("q1"), None);
    store.ensure("q1");
    assert_eq!(store.depth("q1"), Some(0));
    store.ensure("q1");
    assert_eq!(store.depth("q1"), Some(0));
}

#[test]
fn test_push_and_receive_in_order() {
    let store = QueueStore::new(10);
    store.push("q1", delivered("m1", "first"));
    store.push("q1", delivered("m2", "second"));

    let got = store.receive("q1", 10).unwrap();
    assert_eq!(got.len(), 2);
    assert_eq!(got[0].payload, "first");
    assert_eq!(got[1].payload, "second");
    assert_eq!(store.depth("q1"), Some(0));
}

#[test]
fn test_receive_respects_max() {
    let store = QueueStore::new(10);
    for i in 0..5 {
        store.push("q1", delivered(&format!("m{i}"), "x"));
    }
    assert_eq!(store.receive("q1", 2).unwrap().len(), 2);
    assert_eq!(store.depth("q1"), Some(3));
}

#[test]
fn test_receive_unknown_queue_is_not_found() {
    let store = QueueStore::new(10);
    let err = store.receive("nope", 1).unwrap_err();
    assert!(matches!(err, BrokerError::QueueNotFound(_)));
}

#[test]
fn test_full_queue_drops_oldest() {
    let store = QueueStore::new(2);
    store.push("q1", delivered("m1", "first"));
    store.push("q1", delivered("m2", "second"));
    store.push("q1", delivered("m3", "third"));

    let got = store.receive("q1", 10).unwrap();
    assert_eq!(got.len(), 2);
    assert_eq!(got[0].payload, "second");
    assert_eq!(got[1].payload, "third");
}
