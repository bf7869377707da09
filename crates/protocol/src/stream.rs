//! Stream identification types
//!
//! `StreamId` names the stream a message travels on. File sinks use it to
//! pick the output file when the configured path contains a `*`.

use std::fmt;
use std::sync::Arc;

/// Stream identifier
///
/// Cloning is cheap (reference counted), so every message can carry its own
/// copy without allocating.
///
/// # Example
///
/// ```
/// use spool_protocol::StreamId;
///
/// let stream = StreamId::new("access_log");
/// assert_eq!(stream.as_str(), "access_log");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamId(Arc<str>);

impl StreamId {
    /// Create a new stream ID
    #[inline]
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// Get the stream ID as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StreamId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for StreamId {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl From<&StreamId> for StreamId {
    fn from(s: &StreamId) -> Self {
        s.clone()
    }
}

impl AsRef<str> for StreamId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Default for StreamId {
    fn default() -> Self {
        Self::new("default")
    }
}
