//! Tests for TAF segmentation, decoding and period chaining

use super::super::taf::{decode_taf, segment_body};
use super::{SAMPLE_TAF, reference_now, utc};
use crate::app::models::{ChangeIndicator, DecodeIssue, FlightCategory, ReportField, TafRecord};

/// Every chained period ends where the next chained one begins, and the last
/// ends with the forecast
fn assert_chained(record: &TafRecord) {
    let chained: Vec<_> = record.prevailing_periods().collect();
    for pair in chained.windows(2) {
        assert_eq!(pair[0].valid_to, pair[1].valid_from);
    }
    if let Some(last) = chained.last() {
        assert_eq!(last.valid_to, record.valid_to);
    }
}

#[test]
fn test_segment_body() {
    let body = [
        "33015KT", "P6SM", "FM052000", "34010KT", "PROB30", "TEMPO", "0522/0602", "3SM",
        "BECMG", "0606/0608", "OVC006",
    ];
    let segments = segment_body(&body);

    let kinds: Vec<_> = segments.iter().map(|s| s.change_type).collect();
    assert_eq!(
        kinds,
        vec![
            ChangeIndicator::Initial,
            ChangeIndicator::From,
            ChangeIndicator::Probability,
            ChangeIndicator::Becoming,
        ]
    );
    assert_eq!(segments[0].condition_tokens(), ["33015KT", "P6SM"]);
    assert_eq!(segments[1].from_time, Some("052000"));
    assert_eq!(segments[2].probability, Some(30));
    assert_eq!(segments[2].window, Some("0522/0602"));
    assert_eq!(segments[2].condition_tokens(), ["3SM"]);
    assert_eq!(segments[3].window, Some("0606/0608"));
}

#[test]
fn test_segment_body_separate_probability() {
    let segments = segment_body(&["PROB", "40", "0520/0524", "TSRA"]);
    assert_eq!(segments.len(), 2);
    assert!(segments[0].tokens.is_empty());
    assert_eq!(segments[1].probability, Some(40));
    assert_eq!(segments[1].window, Some("0520/0524"));
    assert_eq!(segments[1].condition_tokens(), ["TSRA"]);
}

#[test]
fn test_initial_and_from_periods() {
    let record = decode_taf(
        "KJFK 051730Z 0518/0624 33015KT P6SM FM052000 34010KT P6SM",
        utc(2024, 3, 5, 18, 0),
    );

    assert_eq!(record.station.as_deref(), Some("KJFK"));
    assert_eq!(record.issued_at, Some(utc(2024, 3, 5, 17, 30)));
    assert_eq!(record.valid_from, Some(utc(2024, 3, 5, 18, 0)));
    assert_eq!(record.valid_to, Some(utc(2024, 3, 7, 0, 0)));

    assert_eq!(record.periods.len(), 2);
    let initial = &record.periods[0];
    assert_eq!(initial.change_type, ChangeIndicator::Initial);
    assert_eq!(initial.valid_from, Some(utc(2024, 3, 5, 18, 0)));
    assert_eq!(initial.valid_to, Some(utc(2024, 3, 5, 20, 0)));

    let from = &record.periods[1];
    assert_eq!(from.change_type, ChangeIndicator::From);
    assert_eq!(from.valid_from, Some(utc(2024, 3, 5, 20, 0)));
    assert_eq!(from.valid_to, Some(utc(2024, 3, 7, 0, 0)));

    assert!(!record.has_issues());
    assert_chained(&record);
}

#[test]
fn test_full_forecast() {
    let record = decode_taf(SAMPLE_TAF, reference_now());

    assert_eq!(record.periods.len(), 5);
    assert_chained(&record);

    let tempo = &record.periods[2];
    assert_eq!(tempo.change_type, ChangeIndicator::Temporary);
    assert_eq!(tempo.valid_from, Some(utc(2024, 3, 5, 22, 0)));
    assert_eq!(tempo.valid_to, Some(utc(2024, 3, 6, 2, 0)));
    assert_eq!(tempo.category, FlightCategory::Mvfr);
    assert_eq!(tempo.residue, vec!["-RA"]);

    let becoming = &record.periods[3];
    assert_eq!(becoming.change_type, ChangeIndicator::Becoming);
    assert_eq!(becoming.valid_from, Some(utc(2024, 3, 6, 6, 0)));
    assert_eq!(becoming.valid_to, record.valid_to);
    assert_eq!(becoming.category, FlightCategory::Ifr);

    let from = &record.periods[1];
    assert_eq!(from.valid_to, Some(utc(2024, 3, 6, 6, 0)));

    let prob = &record.periods[4];
    assert_eq!(prob.change_type, ChangeIndicator::Probability);
    assert_eq!(prob.probability, Some(30));
    assert_eq!(prob.valid_to, Some(utc(2024, 3, 6, 16, 0)));
    assert_eq!(prob.ceiling_feet(), Some(200));
    assert_eq!(prob.category, FlightCategory::Lifr);

    assert_eq!(record.worst_category(), FlightCategory::Lifr);
    let at_ten = record.prevailing_at(utc(2024, 3, 6, 10, 0)).unwrap();
    assert_eq!(at_ten.change_type, ChangeIndicator::Becoming);
}

#[test]
fn test_periods_ordered_by_start() {
    let record = decode_taf(SAMPLE_TAF, reference_now());
    let starts: Vec<_> = record.periods.iter().map(|p| p.valid_from.unwrap()).collect();
    let mut sorted = starts.clone();
    sorted.sort();
    assert_eq!(starts, sorted);
}

#[test]
fn test_tempo_without_window_starts_with_its_host() {
    let record = decode_taf(
        "KJFK 051730Z 0518/0624 33015KT P6SM FM052000 34010KT P6SM TEMPO 3SM BR",
        reference_now(),
    );

    let tempo = &record.periods[2];
    assert_eq!(tempo.change_type, ChangeIndicator::Temporary);
    assert_eq!(tempo.valid_from, record.periods[1].valid_from);
    assert_eq!(tempo.valid_to, None);
    assert_chained(&record);
}

#[test]
fn test_probability_with_tempo_is_one_period() {
    let record = decode_taf(
        "KXYZ 051730Z 0518/0624 18010KT P6SM PROB40 TEMPO 0520/0524 2SM TSRA",
        reference_now(),
    );

    assert_eq!(record.periods.len(), 2);
    let prob = &record.periods[1];
    assert_eq!(prob.change_type, ChangeIndicator::Probability);
    assert_eq!(prob.probability, Some(40));
    assert_eq!(prob.valid_from, Some(utc(2024, 3, 5, 20, 0)));
    assert_eq!(prob.valid_to, Some(utc(2024, 3, 6, 0, 0)));
    assert_eq!(record.periods[0].valid_to, record.valid_to);
}

#[test]
fn test_body_starting_with_change_group() {
    let record = decode_taf(
        "KJFK 051730Z 0518/0624 FM051800 18010KT P6SM FM052200 20012KT 4SM",
        reference_now(),
    );

    assert_eq!(record.periods.len(), 2);
    assert_eq!(record.periods[0].change_type, ChangeIndicator::From);
    assert_eq!(record.periods[0].valid_to, Some(utc(2024, 3, 5, 22, 0)));
    assert_chained(&record);
}

#[test]
fn test_change_groups_cross_month_end() {
    let record = decode_taf(
        "KJFK 301730Z 3018/0124 18010KT P6SM FM010600 20012KT 4SM",
        utc(2024, 4, 30, 18, 0),
    );

    assert_eq!(record.valid_to, Some(utc(2024, 5, 2, 0, 0)));
    assert_eq!(record.periods[1].valid_from, Some(utc(2024, 5, 1, 6, 0)));
    assert_chained(&record);
}

#[test]
fn test_becoming_without_window() {
    let record = decode_taf(
        "KJFK 051730Z 0518/0624 18010KT P6SM BECMG 20012KT",
        reference_now(),
    );
    assert!(record.issues.contains(&DecodeIssue::MissingField {
        field: ReportField::Time
    }));
}

#[test]
fn test_amended_with_remarks() {
    let record = decode_taf(
        "TAF AMD KJFK 051730Z 0518/0624 18010KT P6SM SKC RMK NXT FCST BY 00Z",
        reference_now(),
    );

    assert!(record.is_amended);
    assert_eq!(record.periods.len(), 1);
    assert_eq!(record.periods[0].category, FlightCategory::Vfr);
    assert_eq!(record.periods[0].residue, vec!["RMK", "NXT", "FCST", "BY", "00Z"]);
}

#[test]
fn test_nil_forecast() {
    let record = decode_taf("TAF KXYZ 051730Z 0518/0624 NIL=", reference_now());

    assert!(record.has_no_forecast);
    assert_eq!(record.periods.len(), 1);
    let period = &record.periods[0];
    assert_eq!(period.change_type, ChangeIndicator::Initial);
    assert_eq!(period.residue, vec!["NIL"]);
    assert_eq!(period.category, FlightCategory::Unknown);
}

#[test]
fn test_cancelled_forecast() {
    let record = decode_taf("TAF AMD KXYZ 051830Z 0518/0624 CNL", reference_now());

    assert!(record.is_amended);
    assert!(record.has_no_forecast);
    assert_eq!(record.periods[0].residue, vec!["CNL"]);

    let routine = decode_taf(SAMPLE_TAF, reference_now());
    assert!(!routine.is_amended);
    assert!(!routine.has_no_forecast);
}

#[test]
fn test_missing_header() {
    let record = decode_taf("garbage text here", reference_now());

    assert_eq!(record.station, None);
    assert_eq!(record.issues, vec![DecodeIssue::UnparseableReport]);
    assert_eq!(record.periods.len(), 1);
    assert_eq!(record.periods[0].change_type, ChangeIndicator::Initial);
    assert_eq!(record.periods[0].residue, vec!["garbage", "text", "here"]);
    assert_eq!(record.periods[0].category, FlightCategory::Unknown);
}

#[test]
fn test_empty_input() {
    let record = decode_taf("", reference_now());
    assert_eq!(record.station, None);
    assert_eq!(record.periods.len(), 1);
    assert!(record.periods[0].residue.is_empty());
}

#[test]
fn test_invalid_issue_time() {
    let record = decode_taf("KJFK 991730Z 0518/0624 18010KT P6SM", reference_now());

    assert_eq!(record.issued_at, None);
    assert_eq!(
        record.issues,
        vec![DecodeIssue::InvalidTimeField {
            token: "991730Z".to_string()
        }]
    );
    assert_eq!(record.valid_from, Some(utc(2024, 3, 5, 18, 0)));
    assert_eq!(record.periods[0].category, FlightCategory::Vfr);
}
