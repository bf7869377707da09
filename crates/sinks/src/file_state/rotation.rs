//! Rotation policy and decision
//!
//! [`needs_rotate`] is a pure function of the bound writer, the policy, the
//! file's creation time and the current time. Rules are checked in order and
//! the first match decides:
//!
//! 1. no writer bound: rotate (bootstrap)
//! 2. writer inaccessible: error
//! 3. policy disabled: keep
//! 4. forced: rotate
//! 5. size reached: rotate
//! 6. age reached: rotate
//! 7. daily boundary set and the file was created before today's boundary:
//!    rotate
//! 8. otherwise keep
//!
//! Rule 7 compares against today's boundary even when that boundary is
//! still ahead, so between midnight and the boundary every check rotates.

use std::time::Duration;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, TimeDelta, TimeZone};
use spool_config::{RotationConfig, parse_time_of_day};

use super::FileStateWriter;
use crate::common::{Result, SinkError};

/// Daily rotation time of day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotateAt {
    pub hour: u32,
    pub minute: u32,
}

impl RotateAt {
    /// Create a time of day, rejecting out-of-range values
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(SinkError::config(format!(
                "rotation time {:02}:{:02} is out of range",
                hour, minute
            )));
        }
        Ok(Self { hour, minute })
    }

    /// Parse an `HH:MM` string
    pub fn parse(value: &str) -> Result<Self> {
        let (hour, minute) = parse_time_of_day(value).map_err(SinkError::config)?;
        Self::new(hour, minute)
    }

    /// Today's boundary in the time zone of `now`
    ///
    /// `None` when the local time does not exist (DST gap).
    fn on_day_of<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let local = now.date_naive().and_hms_opt(self.hour, self.minute, 0)?;
        now.timezone().from_local_datetime(&local).earliest()
    }
}

/// When a file should be rotated and how rotated files are named
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    pub enabled: bool,

    /// Rotate at or above this many bytes
    pub size_bytes: u64,

    /// Rotate once the file is at least this old
    pub timeout: Duration,

    /// Daily boundary
    pub at: Option<RotateAt>,

    /// Width of the numeric suffix on colliding names
    pub zero_pad: usize,

    /// strftime pattern for rotated file names
    pub timestamp: String,

    /// Compress files once they are rotated away
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            size_bytes: 1024 * 1024 * 1024,
            timeout: Duration::from_secs(1440 * 60),
            at: None,
            zero_pad: 0,
            timestamp: "%Y-%m-%d_%H".to_string(),
            compress: false,
        }
    }
}

impl RotationPolicy {
    /// Default thresholds with rotation switched on
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_size_bytes(mut self, size_bytes: u64) -> Self {
        self.size_bytes = size_bytes;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_rotate_at(mut self, at: RotateAt) -> Self {
        self.at = Some(at);
        self
    }

    #[must_use]
    pub fn with_zero_pad(mut self, zero_pad: usize) -> Self {
        self.zero_pad = zero_pad;
        self
    }

    /// Set the file name timestamp pattern, rejecting invalid specifiers
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Result<Self> {
        let timestamp = timestamp.into();
        validate_timestamp(&timestamp)?;
        self.timestamp = timestamp;
        Ok(self)
    }

    #[must_use]
    pub fn with_compression(mut self) -> Self {
        self.compress = true;
        self
    }
}

impl TryFrom<&RotationConfig> for RotationPolicy {
    type Error = SinkError;

    fn try_from(config: &RotationConfig) -> Result<Self> {
        let at = config.at.as_deref().map(RotateAt::parse).transpose()?;

        let policy = Self {
            enabled: config.enable,
            size_bytes: config.size_mb.saturating_mul(1024 * 1024),
            timeout: Duration::from_secs(config.timeout_min.saturating_mul(60)),
            at,
            zero_pad: config.zero_padding,
            timestamp: String::new(),
            compress: config.compress,
        };
        policy.with_timestamp(config.timestamp.clone())
    }
}

fn validate_timestamp(pattern: &str) -> Result<()> {
    if pattern.is_empty() {
        return Err(SinkError::config("rotation timestamp must not be empty"));
    }
    if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(SinkError::config(format!(
            "invalid rotation timestamp '{}'",
            pattern
        )));
    }
    Ok(())
}

/// Decide whether the file behind `writer` must be rotated
///
/// `file_created` is only consulted when a writer is bound. Returns
/// [`SinkError::Inaccessible`] when the writer cannot be reached.
pub fn needs_rotate<Tz: TimeZone>(
    writer: Option<&dyn FileStateWriter>,
    policy: &RotationPolicy,
    file_created: &DateTime<Tz>,
    force: bool,
    now: &DateTime<Tz>,
) -> Result<bool> {
    let Some(writer) = writer else {
        return Ok(true);
    };

    if !writer.is_accessible() {
        return Err(SinkError::inaccessible(writer.name()));
    }

    if !policy.enabled {
        return Ok(false);
    }

    if force {
        return Ok(true);
    }

    if writer.size() >= policy.size_bytes {
        return Ok(true);
    }

    let age = now.clone().signed_duration_since(file_created.clone());
    if let Ok(timeout) = TimeDelta::from_std(policy.timeout)
        && age >= timeout
    {
        return Ok(true);
    }

    if let Some(boundary) = policy.at.as_ref().and_then(|at| at.on_day_of(now))
        && *file_created < boundary
    {
        return Ok(true);
    }

    Ok(false)
}

#[cfg(test)]
#[path = "rotation_test.rs"]
mod tests;
