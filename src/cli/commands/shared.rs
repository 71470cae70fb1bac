//! Shared components for CLI commands
//!
//! This module contains logging setup, configuration loading, progress bars
//! and output helpers used across the command implementations.

use crate::app::models::FlightCategory;
use crate::cli::args::{BatchArgs, CommonArgs};
use crate::config::{Config, LoggingConfig};
use crate::{Error, Result};
use anyhow::Context;
use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Set up structured logging on stderr
///
/// `RUST_LOG` takes precedence. Otherwise the level comes from `-v`/`-q` when
/// given, else from the logging configuration.
pub fn setup_logging(args: &CommonArgs, logging: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = if args.has_explicit_log_level() {
        args.get_log_level()
    } else {
        logging.level.as_str()
    };

    // Create filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("avwx_decoder={}", log_level)));

    let result = if args.quiet || !logging.timestamps {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    result.map_err(|e| Error::configuration(format!("Failed to initialize logging: {}", e)))?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Locate the config file: the explicit path, else the default location when present
pub fn resolve_config_path(explicit: Option<&Path>) -> anyhow::Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        let path = path
            .canonicalize()
            .with_context(|| format!("Config file {} is not accessible", path.display()))?;
        return Ok(Some(path));
    }

    let default_path =
        Config::default_config_path().context("Could not determine default config location")?;
    Ok(default_path.exists().then_some(default_path))
}

/// Load configuration using layered approach (file -> env -> args)
pub fn load_configuration(args: &BatchArgs) -> Result<Config> {
    let config_file = resolve_config_path(args.config_file.as_deref())
        .map_err(|e| Error::configuration(format!("{:#}", e)))?;

    match &config_file {
        Some(path) => info!("Using config file: {}", path.display()),
        None => info!("No config file found, using defaults and environment variables"),
    }

    let mut config = Config::load_layered(config_file.as_deref())?;

    apply_cli_overrides(&mut config, args);

    config.validate()?;
    Ok(config)
}

/// Apply CLI argument overrides to configuration
pub fn apply_cli_overrides(config: &mut Config, args: &BatchArgs) {
    if let Some(workers) = args.workers {
        config.batch.workers = workers;
    }
    if let Some(batch_size) = args.batch_size {
        config.batch.batch_size = batch_size;
    }
    if args.common.has_explicit_log_level() {
        config.logging.level = args.common.get_log_level().to_string();
    }
}

/// Create a progress bar with appropriate styling
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} [{per_sec}] ETA: {eta}")
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}

/// Colour a flight category the way aviation weather charts do
pub fn category_label(category: FlightCategory) -> ColoredString {
    let label = category.to_string();
    match category {
        FlightCategory::Vfr => label.green().bold(),
        FlightCategory::Mvfr => label.blue().bold(),
        FlightCategory::Ifr => label.red().bold(),
        FlightCategory::Lifr => label.magenta().bold(),
        FlightCategory::Unknown => label.dimmed(),
    }
}

/// Write rendered output to a file, or stdout when no file is given
pub fn write_output(output_file: Option<&Path>, content: &str) -> Result<()> {
    match output_file {
        Some(path) => {
            std::fs::write(path, content)
                .map_err(|e| Error::io(format!("Failed to write {}", path.display()), e))?;
            info!("Output written to: {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::args::{Args, Commands};
    use clap::Parser;
    use tempfile::TempDir;

    fn batch_args(extra: &[&str]) -> BatchArgs {
        let mut argv = vec!["avwx-decoder", "batch"];
        argv.extend_from_slice(extra);
        match Args::try_parse_from(argv).unwrap().get_command() {
            Some(Commands::Batch(batch)) => batch,
            _ => panic!("expected batch command"),
        }
    }

    #[test]
    fn test_cli_overrides_win() {
        let mut config = Config::default().with_workers(8).with_batch_size(100);
        apply_cli_overrides(&mut config, &batch_args(&["-j", "2", "--batch-size", "7", "-v"]));

        assert_eq!(config.batch.workers, 2);
        assert_eq!(config.batch.batch_size, 7);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_cli_overrides_leave_unset_values() {
        let mut config = Config::default().with_workers(8);
        apply_cli_overrides(&mut config, &batch_args(&[]));
        assert_eq!(config.batch.workers, 8);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_explicit_config_file_is_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"batch": {"batch_size": 9}}"#).unwrap();

        let resolved = resolve_config_path(Some(&path)).unwrap();
        assert!(resolved.is_some());

        let path_arg = path.display().to_string();
        let config = load_configuration(&batch_args(&["--config", &path_arg])).unwrap();
        assert_eq!(config.batch.batch_size, 9);
    }

    #[test]
    fn test_missing_explicit_config_file() {
        let result = resolve_config_path(Some(Path::new("/no/such/config.json")));
        assert!(result.is_err());
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        write_output(Some(&path), "[]").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_progress_bar_message() {
        let pb = create_progress_bar(10, "Decoding");
        assert_eq!(pb.length(), Some(10));
        assert_eq!(pb.message(), "Decoding");
    }
}
