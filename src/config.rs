//! Configuration management and validation.
//!
//! Provides configuration structures for decoding options, batch
//! processing parameters and logging, with layered loading from
//! defaults, a JSON config file and environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_BATCH_SIZE, DEFAULT_INTER_BATCH_DELAY_MS,
    MAX_WORKERS, default_workers, env_vars,
};
use crate::{Error, Result};

/// Options that change how individual reports are decoded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Keep everything after `RMK` as remarks without scanning it for fields
    pub stop_at_remarks: bool,

    /// Skip leading `METAR`/`SPECI`/`TAF`/`AMD`/`COR` tokens before the station
    pub skip_report_prefixes: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            stop_at_remarks: true,
            skip_report_prefixes: true,
        }
    }
}

/// Batch decoding parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of blocking decode tasks in flight at once
    pub workers: usize,

    /// Reports per batch
    pub batch_size: usize,

    /// Pause between batches in milliseconds
    pub inter_batch_delay_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            batch_size: DEFAULT_BATCH_SIZE,
            inter_batch_delay_ms: DEFAULT_INTER_BATCH_DELAY_MS,
        }
    }
}

/// Logging preferences used when the CLI gives no verbosity flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level directive (`error`, `warn`, `info`, `debug`, `trace`)
    pub level: String,

    /// Prefix log lines with elapsed time
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            timestamps: true,
        }
    }
}

/// Top level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub decoder: DecoderConfig,
    pub batch: BatchConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Set worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.batch.workers = workers;
        self
    }

    /// Set batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch.batch_size = batch_size;
        self
    }

    /// Set delay between batches
    pub fn with_inter_batch_delay_ms(mut self, delay_ms: u64) -> Self {
        self.batch.inter_batch_delay_ms = delay_ms;
        self
    }

    /// Default config file location: `<config_dir>/avwx-decoder/config.json`
    pub fn default_config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or_else(|| Error::configuration("Could not determine user config directory"))
    }

    /// Read a JSON config file; absent sections and keys keep their defaults
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::file_not_found(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("Failed to read config {}", path.display()), e))?;

        serde_json::from_str(&content).map_err(|e| {
            Error::configuration(format!("Invalid config file {}: {}", path.display(), e))
        })
    }

    /// Defaults, then the config file when given, then environment overrides
    pub fn load_layered(config_file: Option<&Path>) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                Self::load_from_file(path)?
            }
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `AVWX_*` overrides obtained through `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(env_vars::WORKERS) {
            self.batch.workers = parse_env(env_vars::WORKERS, &value)?;
        }
        if let Some(value) = lookup(env_vars::BATCH_SIZE) {
            self.batch.batch_size = parse_env(env_vars::BATCH_SIZE, &value)?;
        }
        if let Some(value) = lookup(env_vars::INTER_BATCH_DELAY_MS) {
            self.batch.inter_batch_delay_ms = parse_env(env_vars::INTER_BATCH_DELAY_MS, &value)?;
        }
        Ok(())
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        if self.batch.workers == 0 || self.batch.workers > MAX_WORKERS {
            return Err(Error::configuration(format!(
                "Worker count must be between 1 and {}, got {}",
                MAX_WORKERS, self.batch.workers
            )));
        }

        if self.batch.batch_size == 0 {
            return Err(Error::configuration("Batch size must be greater than 0"));
        }

        const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
        if !LEVELS.contains(&self.logging.level.as_str()) {
            return Err(Error::configuration(format!(
                "Unknown log level '{}'",
                self.logging.level
            )));
        }

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        Error::configuration(format!("Environment variable {} has invalid value '{}'", key, value))
    })
}
