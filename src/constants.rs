//! Application constants for the aviation weather decoder
//!
//! This module contains the report grammar vocabulary, flight category
//! thresholds, and default values used throughout the decoder and CLI.

// =============================================================================
// Report Grammar Vocabulary
// =============================================================================

/// Tokens that may precede the station identifier and carry no decoded meaning
pub const REPORT_PREFIXES: &[&str] = &[
    "METAR",
    "SPECI",
    "TAF",
    modifiers::AMENDED,
    modifiers::CORRECTED,
];

/// Marker separating the coded body of a METAR from free-form remarks
pub const REMARKS_MARKER: &str = "RMK";

/// METAR report modifiers that may follow the observation time
pub mod modifiers {
    /// Fully automated observation with no human intervention
    pub const AUTO: &str = "AUTO";

    /// Corrected report
    pub const CORRECTED: &str = "COR";

    /// Amended forecast
    pub const AMENDED: &str = "AMD";
}

/// Sky condition groups that mean "no cloud layers" and produce no layer entry
pub const CLEAR_SKY_TOKENS: &[&str] = &["CLR", "SKC", "NSC", "NCD"];

/// TAF change indicator keywords
pub mod change_indicators {
    /// Prefix of the `FMddhhmm` group
    pub const FROM: &str = "FM";

    /// Gradual change over the stated window
    pub const BECOMING: &str = "BECMG";

    /// Temporary fluctuations within the stated window
    pub const TEMPORARY: &str = "TEMPO";

    /// Probability group prefix (`PROB30`, `PROB40`)
    pub const PROBABILITY: &str = "PROB";
}

/// TAF bodies that carry no forecast conditions
pub const EMPTY_FORECAST_TOKENS: &[&str] = &["NIL", "CNL"];

// =============================================================================
// Unit Conversions
// =============================================================================

/// Cloud bases and vertical visibility are reported in hundreds of feet
pub const CLOUD_HEIGHT_UNIT_FEET: u32 = 100;

/// Altimeter `Annnn` groups carry hundredths of an inch of mercury
pub const ALTIMETER_DIVISOR: f64 = 100.0;

/// Conversion factor from hectopascals to inches of mercury
pub const HPA_TO_INHG: f64 = 0.02953;

// =============================================================================
// Flight Category Thresholds
// =============================================================================

/// Flight category thresholds (visibility in statute miles, ceiling in feet AGL)
///
/// A category applies when the value is at or above its threshold; anything
/// below the IFR thresholds is LIFR.
pub mod category_thresholds {
    pub const VFR_VISIBILITY_SM: f64 = 5.0;
    pub const VFR_CEILING_FT: u32 = 3000;

    pub const MVFR_VISIBILITY_SM: f64 = 3.0;
    pub const MVFR_CEILING_FT: u32 = 1000;

    pub const IFR_VISIBILITY_SM: f64 = 1.0;
    pub const IFR_CEILING_FT: u32 = 500;
}

// =============================================================================
// Batch Processing Defaults
// =============================================================================

/// Upper bound on decode workers
pub const MAX_WORKERS: usize = 64;

/// Default number of reports decoded per batch
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Default delay between batches in milliseconds
pub const DEFAULT_INTER_BATCH_DELAY_MS: u64 = 0;

/// Extension of report files picked up when walking a directory
pub const REPORT_FILE_EXTENSION: &str = "txt";

// =============================================================================
// Configuration
// =============================================================================

/// Directory name under the platform config dir
pub const CONFIG_DIR_NAME: &str = "avwx-decoder";

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Environment variable overrides
pub mod env_vars {
    pub const WORKERS: &str = "AVWX_WORKERS";
    pub const BATCH_SIZE: &str = "AVWX_BATCH_SIZE";
    pub const INTER_BATCH_DELAY_MS: &str = "AVWX_INTER_BATCH_DELAY_MS";
}

/// Default worker count derived from the available CPUs
pub fn default_workers() -> usize {
    num_cpus::get().clamp(1, MAX_WORKERS)
}
