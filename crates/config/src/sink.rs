//! File sink configuration
//!
//! # Example
//!
//! ```toml
//! [sink]
//! path = "logs/*.log"
//!
//! [sink.batch]
//! max_count = 8192
//! flush_count = 4096
//! timeout = "5s"
//!
//! [sink.rotation]
//! enable = true
//! size_mb = 512
//! timeout_min = 1440
//! at = "00:00"
//! zero_padding = 3
//! timestamp = "%Y-%m-%d_%H"
//! compress = true
//! ```

use serde::Deserialize;
use std::time::Duration;

/// File sink configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FileSinkConfig {
    /// Sink name used in logs
    /// Default: "file"
    pub name: String,

    /// Output path. A `*` is replaced with the stream name.
    /// Required
    pub path: String,

    /// Writer buffer size in bytes
    /// Default: 64KB
    pub buffer_size: usize,

    /// Capacity of the channel feeding the sink
    /// Default: 10000
    pub channel_size: usize,

    /// Interval for logging sink metrics
    /// Default: 10s
    #[serde(with = "humantime_serde")]
    pub metrics_interval: Duration,

    /// Batching behaviour
    pub batch: BatchConfig,

    /// Rotation behaviour
    pub rotation: RotationConfig,
}

impl Default for FileSinkConfig {
    fn default() -> Self {
        Self {
            name: "file".to_string(),
            path: String::new(),
            buffer_size: 64 * 1024,
            channel_size: 10_000,
            metrics_interval: Duration::from_secs(10),
            batch: BatchConfig::default(),
            rotation: RotationConfig::default(),
        }
    }
}

/// Batch settings for a file sink
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum number of messages held before producers see backpressure
    /// Default: 8192
    pub max_count: usize,

    /// Number of queued messages that triggers a flush
    /// Default: 4096
    pub flush_count: usize,

    /// Flush cadence, also used as the close timeout
    /// Default: 5s
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_count: 8192,
            flush_count: 4096,
            timeout: Duration::from_secs(5),
        }
    }
}

/// Rotation settings for a file sink
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RotationConfig {
    /// Default: false
    pub enable: bool,

    /// Rotate once the file reaches this size in MB
    /// Default: 1024
    pub size_mb: u64,

    /// Rotate once the file is this many minutes old
    /// Default: 1440
    pub timeout_min: u64,

    /// Daily rotation time of day as `HH:MM`
    /// Default: unset
    pub at: Option<String>,

    /// Width of the numeric suffix used to keep rotated names unique
    /// Default: 0
    pub zero_padding: usize,

    /// strftime pattern appended to rotated file names
    /// Default: "%Y-%m-%d_%H"
    pub timestamp: String,

    /// Compress files after they are rotated away
    /// Default: false
    pub compress: bool,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            enable: false,
            size_mb: 1024,
            timeout_min: 1440,
            at: None,
            zero_padding: 0,
            timestamp: "%Y-%m-%d_%H".to_string(),
            compress: false,
        }
    }
}

impl RotationConfig {
    /// Parsed daily rotation time as `(hour, minute)`
    pub fn rotate_at(&self) -> Result<Option<(u32, u32)>, String> {
        self.at.as_deref().map(parse_time_of_day).transpose()
    }
}

/// Parse an `HH:MM` time of day
pub fn parse_time_of_day(value: &str) -> Result<(u32, u32), String> {
    let (hour, minute) = value
        .trim()
        .split_once(':')
        .ok_or_else(|| format!("expected HH:MM, got '{}'", value))?;

    let hour: u32 = hour
        .parse()
        .map_err(|_| format!("invalid hour in '{}'", value))?;
    let minute: u32 = minute
        .parse()
        .map_err(|_| format!("invalid minute in '{}'", value))?;

    if hour > 23 {
        return Err(format!("hour must be 0-23, got {}", hour));
    }
    if minute > 59 {
        return Err(format!("minute must be 0-59, got {}", minute));
    }
    Ok((hour, minute))
}

#[cfg(test)]
#[path = "sink_test.rs"]
mod tests;
