//! Input configuration for the spool binary

use serde::Deserialize;

/// Where incoming lines are attributed
///
/// ```toml
/// [input]
/// stream = "access"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InputConfig {
    /// Stream assigned to every line read from stdin
    /// Default: "default"
    pub stream: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            stream: "default".to_string(),
        }
    }
}
