//! Runtime configuration for the file sink

use std::path::PathBuf;
use std::time::Duration;

use spool_config::FileSinkConfig;

use crate::common::SinkError;
use crate::file_state::RotationPolicy;
use crate::util::DEFAULT_BUFFER_SIZE;

/// Configuration for [`FileSink`](super::FileSink)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileConfig {
    /// Output path; `*` is replaced by the stream name
    pub path: PathBuf,

    /// Write buffer size per open file
    pub buffer_size: usize,

    /// Messages a file state holds before producers must flush
    pub batch_max_count: usize,

    /// Queue length that triggers a flush
    pub batch_flush_count: usize,

    /// Flush and rotation check cadence, also the close timeout
    pub batch_timeout: Duration,

    /// Interval for logging sink metrics
    pub metrics_interval: Duration,

    pub rotation: RotationPolicy,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("logs/*.log"),
            buffer_size: DEFAULT_BUFFER_SIZE,
            batch_max_count: 8192,
            batch_flush_count: 4096,
            batch_timeout: Duration::from_secs(5),
            metrics_interval: Duration::from_secs(10),
            rotation: RotationPolicy::default(),
        }
    }
}

impl FileConfig {
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Set batch capacity and flush threshold
    ///
    /// The flush threshold is clamped to `1..=max_count`.
    #[must_use]
    pub fn with_batch(mut self, max_count: usize, flush_count: usize) -> Self {
        self.batch_max_count = max_count.max(1);
        self.batch_flush_count = flush_count.clamp(1, self.batch_max_count);
        self
    }

    #[must_use]
    pub fn with_batch_timeout(mut self, timeout: Duration) -> Self {
        self.batch_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_metrics_interval(mut self, interval: Duration) -> Self {
        self.metrics_interval = interval;
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: RotationPolicy) -> Self {
        self.rotation = rotation;
        self
    }
}

impl TryFrom<&FileSinkConfig> for FileConfig {
    type Error = SinkError;

    fn try_from(config: &FileSinkConfig) -> Result<Self, Self::Error> {
        if config.path.is_empty() {
            return Err(SinkError::config("sink path must not be empty"));
        }
        if config.batch.timeout.is_zero() || config.metrics_interval.is_zero() {
            return Err(SinkError::config("sink intervals must be non-zero"));
        }

        Ok(Self {
            path: PathBuf::from(&config.path),
            buffer_size: config.buffer_size.max(1),
            batch_max_count: config.batch.max_count.max(1),
            batch_flush_count: config.batch.flush_count.clamp(1, config.batch.max_count.max(1)),
            batch_timeout: config.batch.timeout,
            metrics_interval: config.metrics_interval,
            rotation: RotationPolicy::try_from(&config.rotation)?,
        })
    }
}
