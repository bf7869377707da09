//! Tests for Message

use crate::message::Message;
use crate::stream::StreamId;

#[test]
fn test_message_new() {
    let msg = Message::new("hello", "logs");
    assert_eq!(msg.payload(), b"hello");
    assert_eq!(msg.stream().as_str(), "logs");
    assert_eq!(msg.origin().as_str(), "logs");
    assert_eq!(msg.len(), 5);
    assert!(!msg.is_empty());
}

#[test]
fn test_message_from_owned_string() {
    let line = String::from("GET /index.html");
    let msg = Message::new(line, StreamId::new("access"));
    assert_eq!(msg.payload(), b"GET /index.html");
}

#[test]
fn test_set_stream_keeps_origin() {
    let mut msg = Message::new("x", "ingest");
    msg.set_stream("fallback");

    assert_eq!(msg.stream().as_str(), "fallback");
    assert_eq!(msg.origin().as_str(), "ingest");
}

#[test]
fn test_with_stream() {
    let msg = Message::new("x", "a").with_stream("b");
    assert_eq!(msg.stream().as_str(), "b");
    assert_eq!(msg.origin().as_str(), "a");
}

#[test]
fn test_set_and_clear_payload() {
    let mut msg = Message::new("before", "s");
    msg.set_payload(b"after".to_vec());
    assert_eq!(msg.payload(), b"after");

    msg.clear_payload();
    assert!(msg.is_empty());
    assert_eq!(msg.len(), 0);
}

#[test]
fn test_into_payload() {
    let msg = Message::new("data", "s");
    let payload = msg.into_payload();
    assert_eq!(&payload[..], b"data");
}

#[test]
fn test_clone_shares_payload() {
    let msg = Message::new(vec![1u8; 1024], "s");
    let copy = msg.clone();
    assert_eq!(msg.payload().as_ptr(), copy.payload().as_ptr());
}
