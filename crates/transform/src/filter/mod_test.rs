//! Tests for the regex filter

use super::*;
use crate::Verdict;

fn msg(payload: &'static str) -> Message {
    Message::new(payload, "test")
}

#[test]
fn test_no_expressions_pass_everything() {
    let filter = RegexFilter::new(RegexFilterConfig::new());
    assert!(filter.accepts(&msg("anything")));
    assert!(filter.accepts(&msg("")));
}

#[test]
fn test_expression_must_match() {
    let filter = RegexFilter::new(RegexFilterConfig::new().with_expression("^ERROR").unwrap());
    assert!(filter.accepts(&msg("ERROR disk full")));
    assert!(!filter.accepts(&msg("INFO started")));
}

#[test]
fn test_expression_not_rejects_matches() {
    let filter = RegexFilter::new(RegexFilterConfig::new().with_expression_not("^DEBUG").unwrap());
    assert!(!filter.accepts(&msg("DEBUG noisy")));
    assert!(filter.accepts(&msg("WARN careful")));
}

#[test]
fn test_expression_takes_precedence() {
    let config = RegexFilterConfig::new()
        .with_expression("GET")
        .unwrap()
        .with_expression_not("GET")
        .unwrap();
    let filter = RegexFilter::new(config);

    assert!(filter.accepts(&msg("GET /")));
    assert!(!filter.accepts(&msg("POST /")));
}

#[test]
fn test_matches_non_utf8_payload() {
    let filter = RegexFilter::new(RegexFilterConfig::new().with_expression("abc").unwrap());
    let message = Message::new(vec![0xff, b'a', b'b', b'c', 0xfe], "test");
    assert!(filter.accepts(&message));
}

#[test]
fn test_factory_applies_on_reject() {
    let instance = ModulatorInstanceConfig::new("regex")
        .with_option("expression", "^keep")
        .with_option("on_reject", "drop");
    let modulator = RegexFilterFactory.create(&instance).unwrap();

    let mut rejected = msg("other");
    assert_eq!(modulator.modulate(&mut rejected).unwrap(), Verdict::Drop);

    let mut kept = msg("keep");
    assert_eq!(modulator.modulate(&mut kept).unwrap(), Verdict::Continue);
}

#[test]
fn test_factory_invalid_regex() {
    let instance = ModulatorInstanceConfig::new("regex").with_option("expression_not", "(");
    let err = RegexFilterFactory.create(&instance).unwrap_err();
    assert!(err.to_string().contains("invalid regex"));
}
