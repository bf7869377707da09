//! Spool - Sinks
//!
//! Batched, rotating file output. Messages are collected per destination in
//! a [`FileState`], modulated on their way out and written through a
//! [`FileStateWriter`]. Anything that cannot be written goes to the fallback
//! route instead of being lost.
//!
//! # Architecture
//!
//! ```text
//! [Input] --Message--> [FileSink] --append--> [FileState batch]
//!                          |                        | flush
//!                     rotation check                v
//!                          |               [WriterAssembly] --modulate--> [DiskWriter]
//!                          v                        |
//!                   close + compress                +--failed--> [Fallback]
//! ```
//!
//! # Example
//!
//! ```ignore
//! use spool_sinks::{FileConfig, FileSink};
//! use tokio::sync::mpsc;
//!
//! let (tx, rx) = mpsc::channel(1000);
//! let sink = FileSink::new(FileConfig::default(), chain, fallback, rx);
//! let handle = sink.handle();
//!
//! let task = tokio::spawn(sink.run());
//! handle.rotate();
//! ```

// =============================================================================
// File state (batch + writer + rotation)
// =============================================================================

/// Per-destination batching, write assembly and rotation policy
pub mod file_state;

/// Rotating file sink driving one file state per destination
pub mod file;

// =============================================================================
// Shared utilities
// =============================================================================

/// Disk writer, compression and rate-limited logging
pub mod util;

/// Errors and metrics shared by the sink
mod common;

// =============================================================================
// Public re-exports
// =============================================================================

pub use common::{FileSinkMetrics, MetricsSnapshot, Result, SinkError};
pub use file::{FileConfig, FileSink, FileSinkHandle};
pub use file_state::{
    Fallback, FileState, FileStateWriter, RotateAt, RotationPolicy, WriterAssembly, needs_rotate,
};
pub use util::DiskWriter;
