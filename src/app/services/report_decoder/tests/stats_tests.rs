//! Tests for decoding statistics

use super::super::metar::decode_metar;
use super::super::stats::DecodeStats;
use super::super::taf::decode_taf;
use super::{SAMPLE_METAR, SAMPLE_TAF, reference_now};
use crate::app::models::{DecodedReport, FlightCategory};

#[test]
fn test_stats_record_reports() {
    let now = reference_now();
    let reports = vec![
        DecodedReport::Metar(decode_metar(SAMPLE_METAR, now)),
        DecodedReport::Metar(decode_metar("KATL 052253Z 12008KT", now)),
        DecodedReport::Metar(decode_metar("", now)),
        DecodedReport::Taf(decode_taf(SAMPLE_TAF, now)),
    ];

    let mut stats = DecodeStats::new();
    for report in &reports {
        stats.record(report);
    }

    assert_eq!(stats.total_reports, 4);
    assert_eq!(stats.reports_decoded, 3);
    assert_eq!(stats.reports_unparseable, 1);
    assert_eq!(stats.reports_with_missing_fields, 1);
    assert_eq!(stats.reports_with_invalid_times, 0);
    assert_eq!(stats.category_count(FlightCategory::Vfr), 1);
    assert_eq!(stats.category_count(FlightCategory::Unknown), 1);
    assert_eq!(stats.category_count(FlightCategory::Lifr), 1);
    assert_eq!(stats.success_rate(), 75.0);
    assert!(!stats.is_successful());
}

#[test]
fn test_stats_empty() {
    let stats = DecodeStats::new();
    assert_eq!(stats.total_reports, 0);
    assert_eq!(stats.success_rate(), 0.0);
    assert!(!stats.is_successful());
    assert_eq!(stats.category_count(FlightCategory::Vfr), 0);
}

#[test]
fn test_stats_merge() {
    let now = reference_now();
    let mut first = DecodeStats::new();
    first.record(&DecodedReport::Metar(decode_metar(SAMPLE_METAR, now)));

    let mut second = DecodeStats::new();
    second.record(&DecodedReport::Metar(decode_metar(SAMPLE_METAR, now)));
    second.record(&DecodedReport::Taf(decode_taf(SAMPLE_TAF, now)));

    first.merge(&second);
    assert_eq!(first.total_reports, 3);
    assert_eq!(first.reports_decoded, 3);
    assert_eq!(first.category_count(FlightCategory::Vfr), 2);
    assert_eq!(first.success_rate(), 100.0);
    assert!(first.is_successful());
}
