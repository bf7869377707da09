//! Common types for the file sink
//!
//! Errors and the atomic metrics shared between the sink task, its file
//! states and any handle reporting on them.

use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Counters for a file sink
///
/// Shared through an `Arc` so the file states, the sink loop and the handle
/// all record into the same instance.
#[derive(Debug, Default)]
pub struct FileSinkMetrics {
    /// Messages handed to the sink
    pub messages_received: AtomicU64,

    /// Messages accepted by a writer
    pub messages_written: AtomicU64,

    /// Payload bytes accepted by a writer
    pub bytes_written: AtomicU64,

    /// Messages removed by a `drop` verdict
    pub messages_dropped: AtomicU64,

    /// Messages removed by a `discard` verdict
    pub messages_discarded: AtomicU64,

    /// Messages routed to the fallback
    pub messages_fallback: AtomicU64,

    /// Failed writes, buffer flushes and closes
    pub write_errors: AtomicU64,

    /// Non-empty batch flushes
    pub flush_count: AtomicU64,

    /// Files rotated away
    pub rotations: AtomicU64,

    /// Messages still queued when a close timed out
    pub messages_lost: AtomicU64,
}

impl FileSinkMetrics {
    /// Create new metrics instance
    pub const fn new() -> Self {
        Self {
            messages_received: AtomicU64::new(0),
            messages_written: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            messages_dropped: AtomicU64::new(0),
            messages_discarded: AtomicU64::new(0),
            messages_fallback: AtomicU64::new(0),
            write_errors: AtomicU64::new(0),
            flush_count: AtomicU64::new(0),
            rotations: AtomicU64::new(0),
            messages_lost: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one message accepted by the writer
    #[inline]
    pub fn record_written(&self, bytes: u64) {
        self.messages_written.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_dropped(&self) {
        self.messages_dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_discarded(&self) {
        self.messages_discarded.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_fallback(&self) {
        self.messages_fallback.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_write_error(&self) {
        self.write_errors.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_flush(&self) {
        self.flush_count.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_rotation(&self) {
        self.rotations.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_lost(&self, count: u64) {
        self.messages_lost.fetch_add(count, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_written: self.messages_written.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
            messages_discarded: self.messages_discarded.load(Ordering::Relaxed),
            messages_fallback: self.messages_fallback.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
            flush_count: self.flush_count.load(Ordering::Relaxed),
            rotations: self.rotations.load(Ordering::Relaxed),
            messages_lost: self.messages_lost.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of file sink metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub messages_received: u64,
    pub messages_written: u64,
    pub bytes_written: u64,
    pub messages_dropped: u64,
    pub messages_discarded: u64,
    pub messages_fallback: u64,
    pub write_errors: u64,
    pub flush_count: u64,
    pub rotations: u64,
    pub messages_lost: u64,
}

/// File sink errors
#[derive(Debug, Error)]
pub enum SinkError {
    /// The bound writer reports its resource as unreachable
    #[error("cannot access resource to rotate: {name}")]
    Inaccessible { name: String },

    /// Sink initialization failed
    #[error("failed to initialize sink: {0}")]
    Init(String),

    /// Failed to write data
    #[error("write failed: {0}")]
    Write(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Channel closed unexpectedly
    #[error("channel closed")]
    ChannelClosed,
}

impl SinkError {
    /// Create an inaccessible-resource error
    pub fn inaccessible(name: impl Into<String>) -> Self {
        Self::Inaccessible { name: name.into() }
    }

    /// Create an initialization error
    pub fn init(msg: impl Into<String>) -> Self {
        Self::Init(msg.into())
    }

    /// Create a write error
    pub fn write(msg: impl Into<String>) -> Self {
        Self::Write(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this is a rotation check against an unreachable resource
    pub fn is_inaccessible(&self) -> bool {
        matches!(self, Self::Inaccessible { .. })
    }
}

/// Result type for sink operations
pub type Result<T> = std::result::Result<T, SinkError>;

#[cfg(test)]
#[path = "common_test.rs"]
mod common_test;
