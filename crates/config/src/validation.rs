//! Configuration validation
//!
//! Validates config consistency:
//! - The sink has a path
//! - Batch sizes and durations are usable
//! - Rotation thresholds and the daily time of day are well formed
//! - Modulator types are known

use crate::Config;
use crate::error::{ConfigError, Result};
use crate::modulators::is_known_modulator_type;
use crate::sink::FileSinkConfig;

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_input(config)?;
    validate_sink(&config.sink)?;
    validate_modulators(config)?;
    Ok(())
}

fn validate_input(config: &Config) -> Result<()> {
    if config.input.stream.trim().is_empty() {
        return Err(ConfigError::missing_field("input", "stdin", "stream"));
    }
    Ok(())
}

/// Validate a file sink configuration
pub fn validate_sink(sink: &FileSinkConfig) -> Result<()> {
    let name = sink.name.as_str();

    if sink.path.trim().is_empty() {
        return Err(ConfigError::missing_field("sink", name, "path"));
    }
    if sink.buffer_size == 0 {
        return Err(ConfigError::invalid_value(
            "sink",
            name,
            "buffer_size",
            "must be greater than 0",
        ));
    }
    if sink.channel_size == 0 {
        return Err(ConfigError::invalid_value(
            "sink",
            name,
            "channel_size",
            "must be greater than 0",
        ));
    }

    let batch = &sink.batch;
    if batch.max_count == 0 {
        return Err(ConfigError::invalid_value(
            "sink",
            name,
            "batch.max_count",
            "must be at least 1",
        ));
    }
    if batch.flush_count == 0 || batch.flush_count > batch.max_count {
        return Err(ConfigError::invalid_value(
            "sink",
            name,
            "batch.flush_count",
            format!("must be between 1 and max_count ({})", batch.max_count),
        ));
    }
    if batch.timeout.is_zero() {
        return Err(ConfigError::invalid_value(
            "sink",
            name,
            "batch.timeout",
            "must be greater than 0",
        ));
    }

    let rotation = &sink.rotation;
    if let Err(message) = rotation.rotate_at() {
        return Err(ConfigError::invalid_value("sink", name, "rotation.at", message));
    }
    if rotation.timestamp.trim().is_empty() {
        return Err(ConfigError::invalid_value(
            "sink",
            name,
            "rotation.timestamp",
            "must not be empty",
        ));
    }
    if rotation.enable {
        if rotation.size_mb == 0 {
            return Err(ConfigError::invalid_value(
                "sink",
                name,
                "rotation.size_mb",
                "must be at least 1",
            ));
        }
        if rotation.timeout_min == 0 {
            return Err(ConfigError::invalid_value(
                "sink",
                name,
                "rotation.timeout_min",
                "must be at least 1",
            ));
        }
    }

    Ok(())
}

fn validate_modulators(config: &Config) -> Result<()> {
    for (idx, modulator) in config.modulators.iter().enumerate() {
        if !modulator.enabled {
            continue;
        }
        if !is_known_modulator_type(&modulator.modulator_type) {
            return Err(ConfigError::unknown_modulator(
                format!("modulators[{}]", idx),
                &modulator.modulator_type,
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn parse(toml: &str) -> Result<Config> {
        Config::from_str(toml)
    }

    #[test]
    fn test_valid_minimal_config() {
        assert!(parse("[sink]\npath = \"out.log\"").is_ok());
    }

    #[test]
    fn test_missing_path() {
        let err = parse("[sink]\nname = \"main\"").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { field: "path", .. }));
    }

    #[test]
    fn test_flush_count_above_max() {
        let toml = r#"
[sink]
path = "out.log"

[sink.batch]
max_count = 10
flush_count = 20
"#;
        let err = parse(toml).unwrap_err();
        assert!(err.to_string().contains("batch.flush_count"));
    }

    #[test]
    fn test_zero_timeout() {
        let toml = r#"
[sink]
path = "out.log"

[sink.batch]
timeout = "0s"
"#;
        let err = parse(toml).unwrap_err();
        assert!(err.to_string().contains("batch.timeout"));
    }

    #[test]
    fn test_bad_rotate_at() {
        let toml = r#"
[sink]
path = "out.log"

[sink.rotation]
at = "25:00"
"#;
        let err = parse(toml).unwrap_err();
        assert!(err.to_string().contains("rotation.at"));
    }

    #[test]
    fn test_zero_size_only_checked_when_enabled() {
        let disabled = r#"
[sink]
path = "out.log"

[sink.rotation]
size_mb = 0
"#;
        assert!(parse(disabled).is_ok());

        let enabled = r#"
[sink]
path = "out.log"

[sink.rotation]
enable = true
size_mb = 0
"#;
        let err = parse(enabled).unwrap_err();
        assert!(err.to_string().contains("rotation.size_mb"));
    }

    #[test]
    fn test_unknown_modulator_type() {
        let toml = r#"
[sink]
path = "out.log"

[[modulators]]
type = "grok"
"#;
        let err = parse(toml).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownModulator { .. }));
    }

    #[test]
    fn test_disabled_modulator_skips_validation() {
        let toml = r#"
[sink]
path = "out.log"

[[modulators]]
type = "grok"
enabled = false
"#;
        assert!(parse(toml).is_ok());
    }

    #[test]
    fn test_empty_input_stream() {
        let toml = r#"
[input]
stream = ""

[sink]
path = "out.log"
"#;
        let err = parse(toml).unwrap_err();
        assert!(err.to_string().contains("stream"));
    }
}
