//! Output file naming
//!
//! ```text
//! logs/*.log  --stream "api"-->  logs/api.log
//!             --rotation------>  logs/api_2025-01-15_10.log
//!             --collision----->  logs/api_2025-01-15_10_1.log
//! ```

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use spool_protocol::StreamId;

use crate::file_state::RotationPolicy;

/// Placeholder replaced by the stream name
pub const STREAM_PLACEHOLDER: char = '*';

/// Substitute the stream name for every `*` in `template`
///
/// Path separators and relative components in the stream name are replaced
/// so a stream cannot escape the configured directory.
pub fn resolve_path(template: &Path, stream: &StreamId) -> PathBuf {
    let template = template.to_string_lossy();
    if !template.contains(STREAM_PLACEHOLDER) {
        return PathBuf::from(template.into_owned());
    }
    PathBuf::from(template.replace(STREAM_PLACEHOLDER, &sanitize(stream.as_str())))
}

fn sanitize(stream: &str) -> String {
    let cleaned: String = stream
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}

/// Path of the next file to open for `base`
///
/// With rotation disabled this is `base` itself. Otherwise the file stem
/// gets the formatted timestamp and, when a file with that prefix already
/// exists (compressed or not), a numeric suffix one past the highest found.
pub fn next_file_path<Tz>(
    base: &Path,
    policy: &RotationPolicy,
    now: &DateTime<Tz>,
) -> io::Result<PathBuf>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    if !policy.enabled {
        return Ok(base.to_path_buf());
    }

    let dir = match base.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = base
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut prefix = format!("{stem}_");
    write!(prefix, "{}", now.format(&policy.timestamp)).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid rotation timestamp '{}'", policy.timestamp),
        )
    })?;

    let file_name = match highest_suffix(dir, &prefix)? {
        None => format!("{prefix}{ext}"),
        Some(n) => format!("{prefix}_{:0width$}{ext}", n + 1, width = policy.zero_pad),
    };
    Ok(dir.join(file_name))
}

/// Highest suffix among files starting with `prefix`; the unsuffixed name counts as 0
fn highest_suffix(dir: &Path, prefix: &str) -> io::Result<Option<u64>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    let mut highest = None;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(rest) = name.to_str().and_then(|n| n.strip_prefix(prefix)) else {
            continue;
        };
        let suffix = suffix_number(rest);
        highest = Some(highest.map_or(suffix, |h: u64| h.max(suffix)));
    }
    Ok(highest)
}

fn suffix_number(rest: &str) -> u64 {
    rest.strip_prefix('_')
        .map(|r| r.split(|c: char| !c.is_ascii_digit()).next().unwrap_or(""))
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0)
}
