//! Command-line argument definitions for the report decoder
//!
//! This module defines the complete CLI interface using clap derive API.

use crate::app::services::report_source::SourceKind;
use crate::constants::MAX_WORKERS;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

/// CLI arguments for the METAR/TAF decoder
///
/// Decodes aviation routine weather reports and terminal aerodrome forecasts
/// into structured records with flight categories.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "avwx-decoder",
    version,
    about = "Decode METAR observations and TAF forecasts",
    long_about = "Decodes aviation weather reports (METAR) and terminal aerodrome forecasts (TAF) \
                  into structured records: wind, visibility, cloud layers, temperature, altimeter \
                  and the derived VFR/MVFR/IFR/LIFR flight category. Malformed reports are never \
                  rejected; whatever could be decoded is shown together with the issues found."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Decode one or more METAR reports given on the command line
    Metar(DecodeArgs),
    /// Decode one or more TAF reports given on the command line
    Taf(DecodeArgs),
    /// Decode reports from files, directories, glob patterns or stdin
    Batch(BatchArgs),
}

/// Options shared by every command
#[derive(Debug, Clone, ClapArgs)]
pub struct CommonArgs {
    /// Reference time used to complete day/hour report times
    ///
    /// Reports carry only day-of-month and time. The month and year come from
    /// this instant (RFC 3339, e.g. 2024-03-05T23:00:00Z). Defaults to now.
    #[arg(
        long = "now",
        value_name = "RFC3339",
        help = "Reference time for resolving report times (default: now)"
    )]
    pub now: Option<ReferenceTime>,

    /// Output format for results
    #[arg(
        long = "format",
        value_enum,
        default_value = "human",
        help = "Output format for results"
    )]
    pub output_format: OutputFormat,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only show errors. Overrides verbose settings and hides progress bars.
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Arguments for the `metar` and `taf` commands
#[derive(Debug, Clone, Parser)]
pub struct DecodeArgs {
    /// Raw report text, one argument per report (quote each report)
    #[arg(value_name = "RAW", required = true, num_args = 1..)]
    pub reports: Vec<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Arguments for the batch command
#[derive(Debug, Clone, Parser)]
pub struct BatchArgs {
    /// Input files, directories, glob patterns, or `-` for stdin
    ///
    /// Directories are searched recursively for *.txt files. With no inputs,
    /// reports are read from stdin.
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<String>,

    /// How to interpret input text
    #[arg(
        long = "kind",
        value_enum,
        default_value = "auto",
        help = "Report kind: metar (one per line), taf (multi-line), or auto"
    )]
    pub kind: KindArg,

    /// Number of parallel workers
    ///
    /// Overrides the configuration file and AVWX_WORKERS.
    #[arg(
        short = 'j',
        long = "workers",
        value_name = "COUNT",
        help = "Number of parallel decode workers"
    )]
    pub workers: Option<usize>,

    /// Reports per batch
    #[arg(
        long = "batch-size",
        value_name = "COUNT",
        help = "Number of reports decoded per batch"
    )]
    pub batch_size: Option<usize>,

    /// Path to configuration file
    ///
    /// JSON configuration file. If not specified, looks for
    /// <config dir>/avwx-decoder/config.json
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (JSON format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Output file for decoded reports
    ///
    /// If not specified, outputs to stdout
    #[arg(
        short = 'o',
        long = "output-file",
        value_name = "FILE",
        help = "Write decoded reports to a file instead of stdout"
    )]
    pub output_file: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

/// Report kind selection for batch input
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Metar,
    Taf,
    Auto,
}

impl From<KindArg> for SourceKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Metar => SourceKind::Metar,
            KindArg::Taf => SourceKind::Taf,
            KindArg::Auto => SourceKind::Auto,
        }
    }
}

/// Wrapper for parsing the `--now` reference time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceTime(pub DateTime<Utc>);

impl FromStr for ReferenceTime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        DateTime::parse_from_rfc3339(s.trim())
            .map(|time| ReferenceTime(time.with_timezone(&Utc)))
            .map_err(|e| {
                Error::datetime_parsing(format!("Invalid reference time '{}'", s), e)
            })
    }
}

impl Args {
    /// Get the command if one was specified
    pub fn get_command(&self) -> Option<Commands> {
        self.command.clone()
    }
}

impl CommonArgs {
    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Whether verbosity was chosen explicitly on the command line
    pub fn has_explicit_log_level(&self) -> bool {
        self.quiet || self.verbose > 0
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }

    /// Reference time for this run, captured once
    pub fn reference_now(&self) -> DateTime<Utc> {
        self.now.map(|time| time.0).unwrap_or_else(Utc::now)
    }
}

impl BatchArgs {
    /// Validate the batch command arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if let Some(workers) = self.workers {
            if workers == 0 || workers > MAX_WORKERS {
                return Err(Error::data_validation(format!(
                    "Number of workers must be between 1 and {}",
                    MAX_WORKERS
                )));
            }
        }

        if self.batch_size == Some(0) {
            return Err(Error::data_validation(
                "Batch size must be greater than 0",
            ));
        }

        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        if let Some(output_file) = &self.output_file {
            if let Some(parent) = output_file.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    return Err(Error::configuration(format!(
                        "Output file directory does not exist: {}",
                        parent.display()
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_metar_command() {
        let args = Args::try_parse_from([
            "avwx-decoder",
            "metar",
            "KATL 052253Z 12008KT 10SM",
            "--now",
            "2024-03-05T23:00:00Z",
            "--format",
            "json",
        ])
        .unwrap();

        match args.get_command() {
            Some(Commands::Metar(decode)) => {
                assert_eq!(decode.reports, vec!["KATL 052253Z 12008KT 10SM"]);
                assert_eq!(decode.common.output_format, OutputFormat::Json);
                assert_eq!(
                    decode.common.reference_now(),
                    Utc.with_ymd_and_hms(2024, 3, 5, 23, 0, 0).unwrap()
                );
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_metar_requires_a_report() {
        assert!(Args::try_parse_from(["avwx-decoder", "metar"]).is_err());
    }

    #[test]
    fn test_parse_batch_command() {
        let args = Args::try_parse_from([
            "avwx-decoder",
            "batch",
            "reports/",
            "-",
            "--kind",
            "taf",
            "-j",
            "3",
            "-vv",
        ])
        .unwrap();

        let Some(Commands::Batch(batch)) = args.get_command() else {
            panic!("expected batch command");
        };
        assert_eq!(batch.inputs, vec!["reports/", "-"]);
        assert_eq!(batch.kind, KindArg::Taf);
        assert_eq!(batch.workers, Some(3));
        assert_eq!(batch.common.get_log_level(), "debug");
        assert!(batch.validate().is_ok());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Args::try_parse_from(["avwx-decoder", "taf", "x", "-q", "-v"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_reference_time() {
        assert!("yesterday".parse::<ReferenceTime>().is_err());
        let parsed: ReferenceTime = "2024-03-05T18:00:00-05:00".parse().unwrap();
        assert_eq!(parsed.0, Utc.with_ymd_and_hms(2024, 3, 5, 23, 0, 0).unwrap());
    }

    #[test]
    fn test_batch_validation() {
        let args = Args::try_parse_from(["avwx-decoder", "batch", "-j", "0"]).unwrap();
        let Some(Commands::Batch(batch)) = args.get_command() else {
            panic!("expected batch command");
        };
        assert!(matches!(
            batch.validate(),
            Err(Error::DataValidation { .. })
        ));

        let args = Args::try_parse_from(["avwx-decoder", "batch", "--batch-size", "0"]).unwrap();
        let Some(Commands::Batch(batch)) = args.get_command() else {
            panic!("expected batch command");
        };
        assert!(matches!(
            batch.validate(),
            Err(Error::DataValidation { .. })
        ));
    }
}
