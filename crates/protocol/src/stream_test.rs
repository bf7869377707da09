//! Tests for StreamId type

use crate::stream::StreamId;
use std::collections::HashMap;

#[test]
fn test_stream_id_new() {
    let id = StreamId::new("access_log");
    assert_eq!(id.as_str(), "access_log");
}

#[test]
fn test_stream_id_from_string() {
    let id: StreamId = String::from("errors").into();
    assert_eq!(id.as_str(), "errors");
}

#[test]
fn test_stream_id_default() {
    assert_eq!(StreamId::default().as_str(), "default");
}

#[test]
fn test_stream_id_display() {
    let id = StreamId::new("audit");
    assert_eq!(format!("stream={}", id), "stream=audit");
}

#[test]
fn test_stream_id_clone_shares_storage() {
    let id = StreamId::new("shared");
    let copy = id.clone();
    assert_eq!(id, copy);
    assert!(std::ptr::eq(id.as_str(), copy.as_str()));
}

#[test]
fn test_stream_id_as_map_key() {
    let mut counts: HashMap<StreamId, u32> = HashMap::new();
    *counts.entry("a".into()).or_default() += 1;
    *counts.entry("a".into()).or_default() += 1;
    *counts.entry("b".into()).or_default() += 1;

    assert_eq!(counts[&StreamId::new("a")], 2);
    assert_eq!(counts[&StreamId::new("b")], 1);
}
