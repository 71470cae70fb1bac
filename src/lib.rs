//! AVWX Decoder Library
//!
//! A Rust library for decoding aviation routine weather reports (METAR) and
//! terminal aerodrome forecasts (TAF) into typed records with a derived
//! flight category.
//!
//! This library provides tools for:
//! - Decoding METAR observations: station, time, wind, visibility, clouds,
//!   temperature/dewpoint and altimeter
//! - Decoding TAF forecasts into chained forecast periods
//! - Resolving partial day/hour report times against a caller-supplied clock
//! - Classifying conditions as VFR, MVFR, IFR or LIFR
//! - Splitting report files and decoding large batches concurrently
//!
//! Decoding never fails: malformed input yields records with absent fields
//! and a list of [`DecodeIssue`]s.

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod batch_decoder;
        pub mod report_decoder;
        pub mod report_source;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{
    DecodeIssue, DecodedReport, FlightCategory, ForecastPeriod, MetarRecord, RawReport,
    ReportKind, TafRecord,
};
pub use app::services::report_decoder::{decode_metar, decode_taf};
pub use config::Config;

/// Result type alias for the decoder
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for operations around the decoder: input, configuration and
/// task orchestration
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Data validation error
    #[error("Data validation error: {message}")]
    DataValidation { message: String },

    /// Date/time parsing error
    #[error("Date/time parsing error: {message}")]
    DateTimeParsing {
        message: String,
        #[source]
        source: chrono::ParseError,
    },

    /// JSON serialization error
    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// Directory traversal error
    #[error("Directory traversal error: {message}")]
    DirectoryTraversal {
        message: String,
        #[source]
        source: walkdir::Error,
    },

    /// Invalid glob pattern
    #[error("Invalid glob pattern '{pattern}'")]
    GlobPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// Blocking decode task failed to complete
    #[error("Task error: {message}")]
    TaskJoin {
        message: String,
        #[source]
        source: tokio::task::JoinError,
    },

    /// Processing interrupted
    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a data validation error
    pub fn data_validation(message: impl Into<String>) -> Self {
        Self::DataValidation {
            message: message.into(),
        }
    }

    /// Create a date/time parsing error
    pub fn datetime_parsing(message: impl Into<String>, source: chrono::ParseError) -> Self {
        Self::DateTimeParsing {
            message: message.into(),
            source,
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            message: message.into(),
            source,
        }
    }

    /// Create a file not found error
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a directory traversal error
    pub fn directory_traversal(message: impl Into<String>, source: walkdir::Error) -> Self {
        Self::DirectoryTraversal {
            message: message.into(),
            source,
        }
    }

    /// Create a glob pattern error
    pub fn glob_pattern(pattern: impl Into<String>, source: glob::PatternError) -> Self {
        Self::GlobPattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Create a task join error
    pub fn task_join(message: impl Into<String>, source: tokio::task::JoinError) -> Self {
        Self::TaskJoin {
            message: message.into(),
            source,
        }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<chrono::ParseError> for Error {
    fn from(error: chrono::ParseError) -> Self {
        Self::DateTimeParsing {
            message: "Date/time parsing failed".to_string(),
            source: error,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization {
            message: "JSON serialization failed".to_string(),
            source: error,
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(error: walkdir::Error) -> Self {
        Self::DirectoryTraversal {
            message: "Directory traversal failed".to_string(),
            source: error,
        }
    }
}
