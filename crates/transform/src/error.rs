//! Transform error types
//!
//! Errors raised while building or running modulators.

use thiserror::Error;

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

/// Errors that can occur in the modulator chain
#[derive(Debug, Error)]
pub enum TransformError {
    /// A formatter could not produce output for one message
    #[error("formatter '{formatter}' failed: {reason}")]
    FormatFailed {
        /// Formatter name
        formatter: &'static str,
        /// What went wrong
        reason: String,
    },

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl TransformError {
    /// Create a format failure
    pub fn format_failed(formatter: &'static str, reason: impl Into<String>) -> Self {
        Self::FormatFailed {
            formatter,
            reason: reason.into(),
        }
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error concerns a single message rather than setup
    pub fn is_per_message(&self) -> bool {
        matches!(self, Self::FormatFailed { .. })
    }
}
