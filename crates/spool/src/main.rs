//! Spool - Batch stdin lines into rotating files
//!
//! # Usage
//!
//! ```bash
//! spool --config configs/spool.toml < access.log
//! tail -F app.log | spool --stream app --log-level debug
//!
//! # Force a rotation of every open file
//! kill -HUP $(pidof spool)
//! ```

mod serve;

use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use spool_config::{Config, LogConfig, LogFormat, LogOutput};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Spool - Batch stdin lines into rotating files
#[derive(Parser, Debug)]
#[command(name = "spool")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "configs/spool.toml")]
    config: PathBuf,

    /// Log level or filter directive, overrides `RUST_LOG` and `[log] level`
    #[arg(short, long)]
    log_level: Option<String>,

    /// Stream assigned to input lines, overrides `[input] stream`
    #[arg(short, long)]
    stream: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::from_file(&cli.config)
        .with_context(|| format!("failed to load config {}", cli.config.display()))?;
    init_logging(&config.log, cli.log_level.as_deref())?;

    serve::run(config, cli.stream).await
}

/// Initialize the tracing subscriber for logging
fn init_logging(log: &LogConfig, level_override: Option<&str>) -> Result<()> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = log.directive(level_override, env.as_deref());
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("invalid log filter '{}'", directive))?;

    let ansi = log.output.ansi();
    let writer = match &log.output {
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogOutput::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path))?;
            BoxMakeWriter::new(std::sync::Mutex::new(file))
        }
    };

    let registry = tracing_subscriber::registry().with(filter);
    match log.format {
        LogFormat::Console => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_ansi(ansi)
                    .with_writer(writer),
            )
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(writer))
            .init(),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["spool"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("configs/spool.toml"));
        assert!(cli.log_level.is_none());
        assert!(cli.stream.is_none());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "spool",
            "--config",
            "/etc/spool.toml",
            "--log-level",
            "debug",
            "--stream",
            "access",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/spool.toml"));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        assert_eq!(cli.stream.as_deref(), Some("access"));
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::try_parse_from(["spool", "-c", "x.toml", "-l", "warn", "-s", "s"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("x.toml"));
        assert_eq!(cli.log_level.as_deref(), Some("warn"));
        assert_eq!(cli.stream.as_deref(), Some("s"));
    }
}
