//! Writer capability bound to a file state

use std::io::{self, Write};

/// A byte sink a [`FileState`](super::FileState) writes into
///
/// Besides plain writes the capability reports what rotation needs to know:
/// a stable name for logs, the current size and whether the underlying
/// resource is still reachable. A short write counts as a failed write, so
/// callers go through [`Write::write_all`].
pub trait FileStateWriter: Write + Send {
    /// Identifier used in logs and rotation errors
    fn name(&self) -> &str;

    /// Current size in bytes, including data not yet flushed
    fn size(&self) -> u64;

    /// Whether the underlying resource can still be written
    fn is_accessible(&self) -> bool;

    /// Flush and release the resource
    fn close(self: Box<Self>) -> io::Result<()>;
}
