//! Noop Filter - Pass-through modulator
//!
//! Accepts every message. Handy as a placeholder in configuration and for
//! exercising the chain without changing data.

use crate::registry::ModulatorFactory;
use crate::{Filter, Modulator, TransformResult};
use spool_config::ModulatorInstanceConfig;
use spool_protocol::Message;


/// A filter that accepts everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFilter;

impl Filter for NoopFilter {
    #[inline]
    fn accepts(&self, _message: &Message) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}

/// Factory for [`NoopFilter`]
///
/// This is built-in and always available.
pub struct NoopFactory;

impl ModulatorFactory for NoopFactory {
    fn create(&self, _config: &ModulatorInstanceConfig) -> TransformResult<Modulator> {
        Ok(Modulator::filter(NoopFilter))
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
