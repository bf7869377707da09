//! Clear formatter
//!
//! Empties the payload and always continues. Useful for keeping only the
//! fact that a message arrived, or as the first stage before formatters
//! that build a fresh payload.

use crate::registry::ModulatorFactory;
use crate::{Formatter, Modulator, TransformResult};
use spool_config::ModulatorInstanceConfig;
use spool_protocol::Message;

/// Formatter that replaces the payload with an empty one
#[derive(Debug, Clone, Copy, Default)]
pub struct ClearFormatter;

impl Formatter for ClearFormatter {
    fn format(&self, message: &mut Message) -> TransformResult<()> {
        message.clear_payload();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "clear"
    }
}

/// Factory for [`ClearFormatter`]
pub struct ClearFactory;

impl ModulatorFactory for ClearFactory {
    fn create(&self, _config: &ModulatorInstanceConfig) -> TransformResult<Modulator> {
        Ok(Modulator::formatter(ClearFormatter))
    }

    fn name(&self) -> &'static str {
        "clear"
    }
}
