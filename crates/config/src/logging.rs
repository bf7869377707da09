//! Logging configuration
//!
//! Controls how the spool binary reports its own activity. Data never goes
//! through this path, only diagnostics.

use serde::Deserialize;

/// Log level
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

/// Targets that follow the configured level; dependencies stay quieter
const SPOOL_TARGETS: &[&str] = &[
    "spool",
    "spool_protocol",
    "spool_config",
    "spool_transform",
    "spool_sinks",
];

impl LogLevel {
    /// Parse a bare level name, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable console output (default)
    #[default]
    Console,
    /// One JSON object per line
    Json,
}

/// Where diagnostics go
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    /// Any other value is a path, opened for append
    #[serde(untagged)]
    File(String),
}

impl LogOutput {
    /// Colour codes only make sense on a terminal stream
    pub fn ansi(&self) -> bool {
        !matches!(self, Self::File(_))
    }
}

/// Logging configuration
///
/// # Example
///
/// ```toml
/// [log]
/// level = "debug"
/// format = "json"
/// output = "/var/log/spool/spool.log"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default: info
    pub level: LogLevel,

    /// Default: console
    pub format: LogFormat,

    /// Default: stdout
    pub output: LogOutput,
}

impl LogConfig {
    /// Resolve the `EnvFilter` directive
    ///
    /// `cli` wins over `env` (the `RUST_LOG` value), which wins over
    /// `level`. A bare level is applied to the spool crates only, with
    /// dependencies held at `warn`. Anything else is taken as a complete
    /// directive and passed through untouched.
    pub fn directive(&self, cli: Option<&str>, env: Option<&str>) -> String {
        let requested = cli.or(env).map(str::trim).filter(|s| !s.is_empty());
        match requested {
            None => scoped(self.level),
            Some(raw) => match LogLevel::parse(raw) {
                Some(level) => scoped(level),
                None => raw.to_string(),
            },
        }
    }
}

fn scoped(level: LogLevel) -> String {
    let dependencies = if level == LogLevel::Error { "error" } else { "warn" };
    let mut directive = dependencies.to_string();
    for target in SPOOL_TARGETS {
        directive.push(',');
        directive.push_str(target);
        directive.push('=');
        directive.push_str(level.as_str());
    }
    directive
}
