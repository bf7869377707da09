//! Rate-limited logging
//!
//! A failing disk produces one error per message. This keeps the log to at
//! most one line per interval and reports how many were suppressed.
//!
//! # Example
//!
//! ```ignore
//! use spool_sinks::util::RateLimitedLogger;
//! use std::time::Duration;
//!
//! let logger = RateLimitedLogger::new(Duration::from_secs(10));
//!
//! for _ in 0..1000 {
//!     logger.error("write failed", &io_error);
//! }
//! ```

use std::fmt::Display;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Default interval for rate-limited logging
pub const DEFAULT_LOG_INTERVAL: Duration = Duration::from_secs(10);

/// Maximum payload length included in a log line
pub const MAX_DATA_LOG_LENGTH: usize = 256;

/// Logger emitting at most one line per interval
///
/// Counters are atomic, the last emission time sits behind a mutex.
pub struct RateLimitedLogger {
    min_interval: Duration,
    last_log_time: Mutex<Option<Instant>>,

    /// Events since the last emitted line
    pending: AtomicU64,

    total: AtomicU64,
}

impl RateLimitedLogger {
    /// Create a new rate-limited logger with the specified interval
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_log_time: Mutex::new(None),
            pending: AtomicU64::new(0),
            total: AtomicU64::new(0),
        }
    }

    /// Record an error; returns true if a line was emitted
    pub fn error(&self, message: &str, error: &dyn Display) -> bool {
        let Some((suppressed, total)) = self.admit() else {
            return false;
        };
        tracing::error!(
            message = %message,
            error = %error,
            suppressed_count = suppressed,
            total_errors = total,
            "error"
        );
        true
    }

    /// Record an error together with the offending payload
    ///
    /// The payload is truncated to [`MAX_DATA_LOG_LENGTH`] bytes.
    pub fn error_with_data(&self, message: &str, error: &dyn Display, data: &[u8]) -> bool {
        let Some((suppressed, total)) = self.admit() else {
            return false;
        };
        tracing::error!(
            message = %message,
            error = %error,
            data = %truncate(data),
            suppressed_count = suppressed,
            total_errors = total,
            "error with data"
        );
        true
    }

    /// Record a recoverable problem; returns true if a line was emitted
    pub fn warn(&self, message: &str, error: &dyn Display) -> bool {
        let Some((suppressed, total)) = self.admit() else {
            return false;
        };
        tracing::warn!(
            message = %message,
            error = %error,
            suppressed_count = suppressed,
            total_errors = total,
            "warning"
        );
        true
    }

    /// Events recorded since the last emitted line
    pub fn pending_error_count(&self) -> u64 {
        self.pending.load(Ordering::Relaxed)
    }

    /// Events recorded overall
    pub fn total_error_count(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Reset all counters
    pub fn reset(&self) {
        self.pending.store(0, Ordering::Relaxed);
        self.total.store(0, Ordering::Relaxed);
        *self.last_log_time.lock() = None;
    }

    /// Count one event, returning `(suppressed, total)` when a line is due
    fn admit(&self) -> Option<(u64, u64)> {
        self.pending.fetch_add(1, Ordering::Relaxed);
        let total = self.total.fetch_add(1, Ordering::Relaxed) + 1;

        {
            let mut last_time = self.last_log_time.lock();
            let now = Instant::now();
            match *last_time {
                Some(last) if now.duration_since(last) < self.min_interval => return None,
                _ => *last_time = Some(now),
            }
        }

        let count = self.pending.swap(0, Ordering::Relaxed);
        Some((count.saturating_sub(1), total))
    }
}

impl Default for RateLimitedLogger {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_INTERVAL)
    }
}

fn truncate(data: &[u8]) -> String {
    if data.len() > MAX_DATA_LOG_LENGTH {
        format!(
            "{}... (truncated from {} bytes)",
            String::from_utf8_lossy(&data[..MAX_DATA_LOG_LENGTH]),
            data.len()
        )
    } else {
        String::from_utf8_lossy(data).into_owned()
    }
}
