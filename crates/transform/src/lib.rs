//! Spool - Transform
//!
//! Modulators applied to each message before it is written.
//!
//! # Overview
//!
//! A modulator is either a **filter** (decides whether a message continues)
//! or a **formatter** (rewrites the payload). Modulators are chained and
//! applied in order; the first stage that does not answer
//! [`Verdict::Continue`] ends the chain for that message.
//!
//! ```text
//! [Message] → [Filter] → [Formatter] → ... → Verdict + rewritten Message
//! ```
//!
//! # Verdicts
//!
//! - `Continue` - keep processing, write the message
//! - `Drop` - the message was filtered out and may be routed elsewhere
//! - `Discard` - the message is thrown away
//!
//! # Adding a New Modulator
//!
//! 1. Implement [`Filter`] or [`Formatter`].
//! 2. Write a config struct with `TryFrom<&ModulatorInstanceConfig>`.
//! 3. Implement [`ModulatorFactory`] and register it in [`default_registry`].
//! 4. Add the type name to `spool_config::KNOWN_MODULATOR_TYPES`.
//!
//! # Example
//!
//! ```ignore
//! use spool_transform::{ClearFormatter, Modulator, ModulatorChain, RegexFilter};
//!
//! let chain = ModulatorChain::new(vec![
//!     Modulator::filter(RegexFilter::new(config)?),
//!     Modulator::formatter(ClearFormatter),
//! ]);
//!
//! let verdict = chain.modulate(&mut message)?;
//! ```

mod chain;
mod error;
pub mod filter;
pub mod format;
pub mod noop;
pub mod registry;

pub use chain::ModulatorChain;
pub use error::TransformError;
pub use filter::{RegexFilter, RegexFilterConfig, RegexFilterFactory};
pub use format::{ClearFactory, ClearFormatter, EnvelopeConfig, EnvelopeFactory, EnvelopeFormatter};
pub use noop::{NoopFactory, NoopFilter};
pub use registry::{ModulatorFactory, ModulatorRegistry};

use spool_protocol::Message;

/// Result type for modulator operations
pub type TransformResult<T> = Result<T, TransformError>;

/// Outcome of modulating one message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verdict {
    /// Write the message
    #[default]
    Continue,
    /// Filtered out; eligible for routing elsewhere
    Drop,
    /// Thrown away
    Discard,
}

impl Verdict {
    /// Parse the name used in configuration files
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "continue" => Some(Self::Continue),
            "drop" => Some(Self::Drop),
            "discard" => Some(Self::Discard),
            _ => None,
        }
    }
}

/// Decides whether a message may continue
pub trait Filter: Send + Sync {
    /// Whether the message passes
    fn accepts(&self, message: &Message) -> bool;

    /// Name for logging and metrics
    fn name(&self) -> &'static str;
}

/// Rewrites a message in place
pub trait Formatter: Send + Sync {
    /// Rewrite the message
    ///
    /// An error affects this message only; the caller decides where the
    /// message goes next.
    fn format(&self, message: &mut Message) -> TransformResult<()>;

    /// Name for logging and metrics
    fn name(&self) -> &'static str;
}

/// One stage of a modulator chain
pub enum Modulator {
    /// A filter and the verdict it produces for rejected messages
    Filter {
        filter: Box<dyn Filter>,
        on_reject: Verdict,
    },
    /// A formatter
    Formatter(Box<dyn Formatter>),
}

impl Modulator {
    /// Wrap a filter that discards rejected messages
    pub fn filter(filter: impl Filter + 'static) -> Self {
        Self::filter_with(filter, Verdict::Discard)
    }

    /// Wrap a filter with an explicit verdict for rejected messages
    pub fn filter_with(filter: impl Filter + 'static, on_reject: Verdict) -> Self {
        Self::Filter {
            filter: Box::new(filter),
            on_reject,
        }
    }

    /// Wrap a formatter
    pub fn formatter(formatter: impl Formatter + 'static) -> Self {
        Self::Formatter(Box::new(formatter))
    }

    /// Name of the wrapped filter or formatter
    pub fn name(&self) -> &'static str {
        match self {
            Self::Filter { filter, .. } => filter.name(),
            Self::Formatter(formatter) => formatter.name(),
        }
    }

    /// Apply this stage to one message
    #[inline]
    pub fn modulate(&self, message: &mut Message) -> TransformResult<Verdict> {
        match self {
            Self::Filter { filter, on_reject } => {
                if filter.accepts(message) {
                    Ok(Verdict::Continue)
                } else {
                    Ok(*on_reject)
                }
            }
            Self::Formatter(formatter) => {
                formatter.format(message)?;
                Ok(Verdict::Continue)
            }
        }
    }
}

impl std::fmt::Debug for Modulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Filter { filter, on_reject } => f
                .debug_struct("Filter")
                .field("name", &filter.name())
                .field("on_reject", on_reject)
                .finish(),
            Self::Formatter(formatter) => f
                .debug_struct("Formatter")
                .field("name", &formatter.name())
                .finish(),
        }
    }
}

/// Create a registry with all built-in modulators
///
/// Includes:
/// - `noop` - Pass-through filter
/// - `regex` - Pass or reject by regular expression
/// - `clear` - Empty the payload
/// - `envelope` - Add a prefix and postfix to the payload
pub fn default_registry() -> ModulatorRegistry {
    let mut registry = ModulatorRegistry::new();
    registry.register("noop", NoopFactory);
    registry.register("regex", RegexFilterFactory);
    registry.register("clear", ClearFactory);
    registry.register("envelope", EnvelopeFactory);
    registry
}
