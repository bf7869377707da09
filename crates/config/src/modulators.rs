//! Modulator configuration
//!
//! Modulators are applied in the order they are listed. Each entry names a
//! type and carries type-specific options.
//!
//! # Example
//!
//! ```toml
//! [[modulators]]
//! type = "regex"
//! expression_not = "^DEBUG"
//!
//! [[modulators]]
//! type = "envelope"
//! postfix = "\n"
//! ```

use serde::Deserialize;
use std::collections::HashMap;

/// Configuration for a single modulator instance
#[derive(Debug, Clone, Deserialize)]
pub struct ModulatorInstanceConfig {
    /// Modulator type (e.g., "regex", "clear")
    #[serde(rename = "type")]
    pub modulator_type: String,

    /// Whether this modulator is enabled (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Type-specific options passed to the modulator factory
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

fn default_true() -> bool {
    true
}

impl ModulatorInstanceConfig {
    /// Create an enabled config of the given type with no options
    pub fn new(modulator_type: impl Into<String>) -> Self {
        Self {
            modulator_type: modulator_type.into(),
            enabled: true,
            options: HashMap::new(),
        }
    }

    /// Add an option
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<toml::Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Disable this instance
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Get an option as string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(|v| v.as_str())
    }

    /// Get an option as bool
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.options.get(key).and_then(|v| v.as_bool())
    }

    /// Get an option as i64
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.options.get(key).and_then(|v| v.as_integer())
    }
}

/// Modulator types built into spool
pub const KNOWN_MODULATOR_TYPES: &[&str] = &["noop", "regex", "clear", "envelope"];

/// Check if a modulator type is known
pub fn is_known_modulator_type(modulator_type: &str) -> bool {
    KNOWN_MODULATOR_TYPES.contains(&modulator_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal() {
        let config: ModulatorInstanceConfig = toml::from_str("type = \"clear\"").unwrap();
        assert_eq!(config.modulator_type, "clear");
        assert!(config.enabled);
        assert!(config.options.is_empty());
    }

    #[test]
    fn test_deserialize_with_options() {
        let toml = r#"
type = "regex"
expression = "^ERROR"
on_reject = "drop"
"#;
        let config: ModulatorInstanceConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.get_str("expression"), Some("^ERROR"));
        assert_eq!(config.get_str("on_reject"), Some("drop"));
        assert_eq!(config.get_str("missing"), None);
    }

    #[test]
    fn test_deserialize_disabled() {
        let toml = r#"
type = "envelope"
enabled = false
"#;
        let config: ModulatorInstanceConfig = toml::from_str(toml).unwrap();
        assert!(!config.enabled);
    }

    #[test]
    fn test_builder() {
        let config = ModulatorInstanceConfig::new("envelope")
            .with_option("prefix", "> ")
            .with_option("limit", 3i64);
        assert_eq!(config.get_str("prefix"), Some("> "));
        assert_eq!(config.get_int("limit"), Some(3));
        assert!(!config.clone().disabled().enabled);
    }

    #[test]
    fn test_known_types() {
        for t in ["noop", "regex", "clear", "envelope"] {
            assert!(is_known_modulator_type(t));
        }
        assert!(!is_known_modulator_type("pattern_matcher"));
    }
}
