//! METAR observation decoding
//!
//! Layout handled: optional `METAR`/`SPECI` prefix, station, `ddhhmmZ` time,
//! then body groups in any order up to an optional `RMK` remarks section.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::conditions::ConditionsBuilder;
use super::field_recognizers::{is_station_identifier, is_time_group_shape};
use super::time_resolver::resolve_zulu;
use super::tokenizer::tokenize_report;
use crate::app::models::{DecodeIssue, MetarRecord, ReportField};
use crate::config::DecoderConfig;
use crate::constants::{REMARKS_MARKER, REPORT_PREFIXES, modifiers};

/// METAR decoder
///
/// Holds only immutable options, so one instance can be shared freely across
/// threads.
#[derive(Debug, Clone, Default)]
pub struct MetarDecoder {
    config: DecoderConfig,
}

impl MetarDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Decode one METAR; never fails
    pub fn decode(&self, raw: &str, reference_now: DateTime<Utc>) -> MetarRecord {
        let tokens = tokenize_report(raw);
        let mut record = MetarRecord::empty(raw);
        let mut pos = 0;

        if self.config.skip_report_prefixes {
            while pos < tokens.len() && REPORT_PREFIXES.contains(&tokens[pos]) {
                if tokens[pos] == modifiers::CORRECTED {
                    record.is_corrected = true;
                }
                pos += 1;
            }
        }

        // Station. A malformed identifier directly ahead of the time group is
        // kept as a remark; otherwise decoding resumes at the same token.
        let mut malformed_station = None;
        match tokens.get(pos) {
            Some(token) if is_station_identifier(token) => {
                record.station = Some(token.to_string());
                pos += 1;
            }
            first => {
                debug!("No station identifier found in METAR '{}'", raw);
                record.issues.push(DecodeIssue::MissingField {
                    field: ReportField::Station,
                });
                let precedes_time = tokens.get(pos + 1).is_some_and(|t| is_time_group_shape(t));
                if let Some(token) = first.filter(|t| !is_time_group_shape(t) && precedes_time) {
                    malformed_station = Some(token.to_string());
                    pos += 1;
                }
            }
        }

        // Observation time
        let mut saw_time_group = false;
        match tokens.get(pos) {
            Some(token) if is_time_group_shape(token) => {
                saw_time_group = true;
                record.observed_at = resolve_zulu(token, reference_now);
                if record.observed_at.is_none() {
                    record.issues.push(DecodeIssue::InvalidTimeField {
                        token: token.to_string(),
                    });
                }
                pos += 1;
            }
            _ => record.issues.push(DecodeIssue::MissingField {
                field: ReportField::Time,
            }),
        }

        // Body and remarks
        let mut builder = ConditionsBuilder::new();
        let mut remarks = Vec::new();
        for (offset, token) in tokens[pos..].iter().enumerate() {
            if self.config.stop_at_remarks && *token == REMARKS_MARKER {
                remarks.extend(tokens[pos + offset..].iter().map(|t| t.to_string()));
                break;
            }
            match *token {
                modifiers::AUTO => record.is_automated = true,
                modifiers::CORRECTED => record.is_corrected = true,
                _ => builder.accept(token),
            }
        }

        let conditions = builder.build();

        if record.station.is_none() && !saw_time_group && conditions.is_empty() {
            debug!("Nothing decodable in METAR '{}'", raw);
            let mut unparseable = MetarRecord::empty(raw);
            unparseable.remarks = tokens.iter().map(|t| t.to_string()).collect();
            unparseable.issues.push(DecodeIssue::UnparseableReport);
            return unparseable;
        }

        record.category = conditions.category();
        record.wind = conditions.wind;
        record.visibility = conditions.visibility;
        record.clouds = conditions.clouds;
        record.temperature = conditions.temperature;
        record.dewpoint = conditions.dewpoint;
        record.altimeter_inhg = conditions.altimeter_inhg;
        record.remarks = malformed_station.into_iter().collect();
        record.remarks.extend(conditions.residue);
        record.remarks.extend(remarks);

        for (field, present) in [
            (ReportField::Wind, record.wind.is_some()),
            (ReportField::Visibility, record.visibility.is_some()),
            (ReportField::Temperature, record.temperature.is_some()),
            (ReportField::Altimeter, record.altimeter_inhg.is_some()),
        ] {
            if !present {
                record.issues.push(DecodeIssue::MissingField { field });
            }
        }

        debug!(
            "Decoded METAR for {:?}: category={}, {} issues",
            record.station,
            record.category,
            record.issues.len()
        );

        record
    }
}

/// Decode one METAR with default options
pub fn decode_metar(raw: &str, reference_now: DateTime<Utc>) -> MetarRecord {
    MetarDecoder::default().decode(raw, reference_now)
}
