//! METAR and TAF report decoder
//!
//! This module turns raw aviation weather report text into typed records.
//! Decoding is total: malformed, truncated or unexpected input never fails a
//! call, it produces a record with absent fields and a list of issues.
//!
//! ## Architecture
//!
//! The decoder is organized into logical components:
//! - [`tokenizer`] - Whitespace tokenization and terminator stripping
//! - [`time_resolver`] - Day/hour/minute groups to full UTC timestamps
//! - [`field_recognizers`] - Recognition of individual report groups
//! - [`conditions`] - Accumulation of groups into weather conditions
//! - [`flight_category`] - VFR/MVFR/IFR/LIFR classification
//! - [`metar`] - METAR observation decoding
//! - [`taf`] - TAF forecast segmentation, decoding and period chaining
//! - [`stats`] - Decoding statistics
//!
//! ## Usage
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use avwx_decoder::app::services::report_decoder::{decode_metar, decode_taf};
//!
//! let now = Utc.with_ymd_and_hms(2024, 3, 5, 23, 0, 0).unwrap();
//! let metar = decode_metar("KATL 052253Z 12008KT 10SM FEW250 24/12 A3002", now);
//! println!("{:?} is {}", metar.station, metar.category);
//!
//! let taf = decode_taf("KJFK 051730Z 0518/0624 18010KT P6SM SCT040", now);
//! println!("{} periods", taf.periods.len());
//! ```

pub mod conditions;
pub mod field_recognizers;
pub mod flight_category;
pub mod metar;
pub mod stats;
pub mod taf;
pub mod time_resolver;
pub mod tokenizer;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use conditions::{Conditions, ConditionsBuilder};
pub use flight_category::classify;
pub use metar::{MetarDecoder, decode_metar};
pub use stats::DecodeStats;
pub use taf::{TafDecoder, decode_taf};

use chrono::{DateTime, Utc};

use crate::app::models::{DecodedReport, RawReport, ReportKind};
use crate::config::DecoderConfig;

/// Both decoders sharing one set of options
#[derive(Debug, Clone, Default)]
pub struct ReportDecoder {
    metar: MetarDecoder,
    taf: TafDecoder,
}

impl ReportDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            metar: MetarDecoder::new(config.clone()),
            taf: TafDecoder::new(config),
        }
    }

    /// Decode a raw report with the decoder matching its kind
    pub fn decode(&self, report: &RawReport, reference_now: DateTime<Utc>) -> DecodedReport {
        match report.kind() {
            ReportKind::Metar => {
                DecodedReport::Metar(self.metar.decode(report.text(), reference_now))
            }
            ReportKind::Taf => DecodedReport::Taf(self.taf.decode(report.text(), reference_now)),
        }
    }
}
