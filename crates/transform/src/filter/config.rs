//! Regex filter configuration

use crate::Verdict;
use regex::bytes::Regex;
use spool_config::ModulatorInstanceConfig;

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

/// Configuration for the regex filter
#[derive(Debug, Clone)]
pub struct RegexFilterConfig {
    /// Messages matching this pass
    pub expression: Option<Regex>,
    /// Messages matching this are rejected
    pub expression_not: Option<Regex>,
    /// Verdict for rejected messages
    pub on_reject: Verdict,
}

impl Default for RegexFilterConfig {
    fn default() -> Self {
        Self {
            expression: None,
            expression_not: None,
            on_reject: Verdict::Discard,
        }
    }
}

impl RegexFilterConfig {
    /// Create a config that passes everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Only pass messages matching `pattern`
    pub fn with_expression(mut self, pattern: &str) -> Result<Self, String> {
        self.expression = Some(compile(pattern)?);
        Ok(self)
    }

    /// Reject messages matching `pattern`
    pub fn with_expression_not(mut self, pattern: &str) -> Result<Self, String> {
        self.expression_not = Some(compile(pattern)?);
        Ok(self)
    }

    /// Set the verdict for rejected messages
    #[must_use]
    pub fn with_on_reject(mut self, verdict: Verdict) -> Self {
        self.on_reject = verdict;
        self
    }
}

impl TryFrom<&ModulatorInstanceConfig> for RegexFilterConfig {
    type Error = String;

    fn try_from(config: &ModulatorInstanceConfig) -> Result<Self, Self::Error> {
        let mut filter_config = RegexFilterConfig::new();

        if let Some(pattern) = config.get_str("expression")
            && !pattern.is_empty()
        {
            filter_config = filter_config.with_expression(pattern)?;
        }

        if let Some(pattern) = config.get_str("expression_not")
            && !pattern.is_empty()
        {
            filter_config = filter_config.with_expression_not(pattern)?;
        }

        if let Some(on_reject) = config.get_str("on_reject") {
            filter_config.on_reject = match Verdict::parse(on_reject) {
                Some(Verdict::Continue) | None => {
                    return Err(format!(
                        "unknown on_reject '{}', expected 'drop' or 'discard'",
                        on_reject
                    ));
                }
                Some(verdict) => verdict,
            };
        }

        Ok(filter_config)
    }
}

fn compile(pattern: &str) -> Result<Regex, String> {
    Regex::new(pattern).map_err(|e| format!("invalid regex '{}': {}", pattern, e))
}
