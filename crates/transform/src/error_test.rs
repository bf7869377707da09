//! Tests for transform errors

use super::*;

#[test]
fn test_format_failed_display() {
    let err = TransformError::format_failed("envelope", "payload too large");
    let text = err.to_string();
    assert!(text.contains("envelope"));
    assert!(text.contains("payload too large"));
    assert!(err.is_per_message());
}

#[test]
fn test_config_display() {
    let err = TransformError::config("invalid regex");
    assert_eq!(err.to_string(), "invalid configuration: invalid regex");
    assert!(!err.is_per_message());
}
