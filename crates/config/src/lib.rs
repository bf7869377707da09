//! Spool Configuration
//!
//! TOML-based configuration loading with sensible defaults. A minimal
//! config only needs an output path.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use spool_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[sink]\npath = \"logs/app.log\"").unwrap();
//! assert_eq!(config.sink.path, "logs/app.log");
//! ```
//!
//! # Example Full Config
//!
//! ```toml
//! [log]
//! level = "info"
//!
//! [input]
//! stream = "access"
//!
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
//! size_mb = 1024
//! at = "00:00"
//! compress = true
//!
//! [[modulators]]
//! type = "regex"
//! expression_not = "^DEBUG"
//!
//! [[modulators]]
//! type = "envelope"
//! ```

mod error;
mod input;
mod logging;
mod modulators;
mod sink;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use error::{ConfigError, Result};
pub use input::InputConfig;
pub use logging::{LogConfig, LogFormat, LogLevel, LogOutput};
pub use modulators::{KNOWN_MODULATOR_TYPES, ModulatorInstanceConfig, is_known_modulator_type};
pub use sink::{BatchConfig, FileSinkConfig, RotationConfig, parse_time_of_day};
pub use validation::validate_sink;

use serde::Deserialize;

/// Main configuration structure
///
/// All sections except `sink.path` are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub log: LogConfig,

    /// Input attribution
    pub input: InputConfig,

    /// The rotating file sink
    pub sink: FileSinkConfig,

    /// Ordered modulator chain applied before writing
    pub modulators: Vec<ModulatorInstanceConfig>,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, contains invalid TOML or
    /// fails validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    /// Enabled modulator instances in chain order
    pub fn enabled_modulators(&self) -> impl Iterator<Item = &ModulatorInstanceConfig> {
        self.modulators.iter().filter(|m| m.enabled)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
