//! Formatters - Payload rewriting modulators
//!
//! - `clear` - Replace the payload with nothing
//! - `envelope` - Surround the payload with a prefix and postfix

mod clear;
mod envelope;

pub use clear::{ClearFactory, ClearFormatter};
pub use envelope::{EnvelopeConfig, EnvelopeFactory, EnvelopeFormatter};
