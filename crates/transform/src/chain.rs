//! Modulator Chain - Sequential per-message modulation
//!
//! # Design
//!
//! - **Zero-cost when empty**: An empty chain answers `Continue` immediately
//! - **Sequential execution**: Stages run in order on the same message
//! - **Short-circuit**: The first non-`Continue` verdict or error stops the chain

use crate::{Modulator, TransformResult, Verdict};
use spool_protocol::Message;

#[cfg(test)]
#[path = "chain_test.rs"]
mod tests;

/// Ordered modulators applied to one message at a time
#[derive(Debug, Default)]
pub struct ModulatorChain {
    modulators: Vec<Modulator>,
}

impl ModulatorChain {
    /// Create a chain from stages in application order
    pub fn new(modulators: Vec<Modulator>) -> Self {
        Self { modulators }
    }

    /// Create an empty chain (every message continues unchanged)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of stages
    #[inline]
    pub fn len(&self) -> usize {
        self.modulators.len()
    }

    /// Whether the chain has no stages
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.modulators.is_empty()
    }

    /// Names of all stages in order
    pub fn names(&self) -> Vec<&'static str> {
        self.modulators.iter().map(|m| m.name()).collect()
    }

    /// Run the message through every stage
    ///
    /// # Errors
    ///
    /// Returns the first formatter error. The message may already have been
    /// rewritten by earlier stages.
    pub fn modulate(&self, message: &mut Message) -> TransformResult<Verdict> {
        for modulator in &self.modulators {
            match modulator.modulate(message)? {
                Verdict::Continue => {}
                verdict => return Ok(verdict),
            }
        }
        Ok(Verdict::Continue)
    }
}
