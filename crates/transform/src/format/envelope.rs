//! Envelope formatter
//!
//! Surrounds each payload with a prefix and a postfix. The default postfix
//! is a newline so that records written to a file end up one per line.
//!
//! ```toml
//! [[modulators]]
//! type = "envelope"
//! prefix = "> "
//! postfix = "\n"
//! ```

use bytes::{BufMut, BytesMut};

use crate::registry::ModulatorFactory;
use crate::{Formatter, Modulator, TransformError, TransformResult};
use spool_config::ModulatorInstanceConfig;
use spool_protocol::Message;

/// Envelope configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeConfig {
    /// Bytes written before the payload
    pub prefix: String,
    /// Bytes written after the payload
    pub postfix: String,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            postfix: "\n".to_string(),
        }
    }
}

impl EnvelopeConfig {
    /// Create config with defaults (newline postfix)
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_postfix(mut self, postfix: impl Into<String>) -> Self {
        self.postfix = postfix.into();
        self
    }
}

impl TryFrom<&ModulatorInstanceConfig> for EnvelopeConfig {
    type Error = String;

    fn try_from(config: &ModulatorInstanceConfig) -> Result<Self, Self::Error> {
        let mut envelope = EnvelopeConfig::default();
        for (key, value) in &config.options {
            let text = value
                .as_str()
                .ok_or_else(|| format!("option '{}' must be a string", key))?;
            match key.as_str() {
                "prefix" => envelope.prefix = text.to_string(),
                "postfix" => envelope.postfix = text.to_string(),
                other => return Err(format!("unknown envelope option '{}'", other)),
            }
        }
        Ok(envelope)
    }
}

/// Formatter adding a prefix and postfix around the payload
#[derive(Debug, Clone)]
pub struct EnvelopeFormatter {
    config: EnvelopeConfig,
}

impl EnvelopeFormatter {
    pub fn new(config: EnvelopeConfig) -> Self {
        Self { config }
    }
}

impl Formatter for EnvelopeFormatter {
    fn format(&self, message: &mut Message) -> TransformResult<()> {
        let prefix = self.config.prefix.as_bytes();
        let postfix = self.config.postfix.as_bytes();
        if prefix.is_empty() && postfix.is_empty() {
            return Ok(());
        }

        let mut buf = BytesMut::with_capacity(prefix.len() + message.len() + postfix.len());
        buf.put_slice(prefix);
        buf.put_slice(message.payload());
        buf.put_slice(postfix);
        message.set_payload(buf.freeze());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "envelope"
    }
}

/// Factory for [`EnvelopeFormatter`]
pub struct EnvelopeFactory;

impl ModulatorFactory for EnvelopeFactory {
    fn create(&self, config: &ModulatorInstanceConfig) -> TransformResult<Modulator> {
        let envelope = EnvelopeConfig::try_from(config).map_err(TransformError::config)?;
        Ok(Modulator::formatter(EnvelopeFormatter::new(envelope)))
    }

    fn name(&self) -> &'static str {
        "envelope"
    }
}
