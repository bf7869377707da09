//! Regex Filter - Pass or reject messages by payload pattern
//!
//! # Configuration
//!
//! | Option | Type | Default | Description |
//! |--------|------|---------|-------------|
//! | `expression` | string | unset | Messages matching this pattern pass |
//! | `expression_not` | string | unset | Messages matching this pattern are rejected |
//! | `on_reject` | string | `"discard"` | Verdict for rejected messages: `discard` or `drop` |
//!
//! When both expressions are set only `expression` is consulted. With
//! neither set every message passes.
//!
//! # TOML Example
//!
//! ```toml
//! # Keep only errors, hand everything else to the fallback route
//! [[modulators]]
//! type = "regex"
//! expression = "^(ERROR|FATAL)"
//! on_reject = "drop"
//! ```

mod config;

pub use config::RegexFilterConfig;

use crate::registry::ModulatorFactory;
use crate::{Filter, Modulator, TransformError, TransformResult};
use spool_config::ModulatorInstanceConfig;
use spool_protocol::Message;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

/// Filter matching the raw payload bytes against regular expressions
#[derive(Debug, Clone)]
pub struct RegexFilter {
    config: RegexFilterConfig,
}

impl RegexFilter {
    /// Create a filter from validated config
    pub fn new(config: RegexFilterConfig) -> Self {
        Self { config }
    }

    /// The filter's configuration
    pub fn config(&self) -> &RegexFilterConfig {
        &self.config
    }
}

impl Filter for RegexFilter {
    fn accepts(&self, message: &Message) -> bool {
        if let Some(ref expression) = self.config.expression {
            return expression.is_match(message.payload());
        }
        if let Some(ref expression_not) = self.config.expression_not {
            return !expression_not.is_match(message.payload());
        }
        true
    }

    fn name(&self) -> &'static str {
        "regex"
    }
}

/// Factory for [`RegexFilter`]
pub struct RegexFilterFactory;

impl ModulatorFactory for RegexFilterFactory {
    fn create(&self, config: &ModulatorInstanceConfig) -> TransformResult<Modulator> {
        let filter_config = RegexFilterConfig::try_from(config).map_err(TransformError::config)?;
        let on_reject = filter_config.on_reject;
        Ok(Modulator::filter_with(RegexFilter::new(filter_config), on_reject))
    }

    fn name(&self) -> &'static str {
        "regex"
    }
}
