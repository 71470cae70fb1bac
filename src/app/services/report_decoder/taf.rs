//! TAF forecast decoding
//!
//! A TAF is a header (`STATION ddhhmmZ ddhh/ddhh`) followed by initial
//! conditions and zero or more change groups. Decoding proceeds in three
//! passes over the body tokens:
//!
//! 1. segmentation at change indicators (`FMddhhmm`, `BECMG`, `TEMPO`, `PROBnn`)
//! 2. per-segment condition decoding and time resolution
//! 3. chaining of prevailing periods so each ends where the next begins

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::conditions::decode_conditions;
use super::field_recognizers::{is_station_identifier, is_window_group};
use super::time_resolver::{
    parse_ddhhmm, resolve_after, resolve_window_after, resolve_window_group, resolve_zulu,
};
use super::tokenizer::tokenize_report;
use crate::app::models::{
    ChangeIndicator, DecodeIssue, FlightCategory, ForecastPeriod, ReportField, TafRecord,
};
use crate::config::DecoderConfig;
use crate::constants::{
    EMPTY_FORECAST_TOKENS, REMARKS_MARKER, REPORT_PREFIXES, change_indicators, modifiers,
};

static ISSUE_TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{6}Z$").expect("issue time pattern is valid"));

static FROM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^FM(\d{6})$").expect("FM pattern is valid"));

static PROB_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^PROB(\d{2})?$").expect("PROB pattern is valid"));

/// A contiguous run of body tokens opened by one change indicator
#[derive(Debug, Clone, PartialEq)]
pub struct Segment<'a> {
    pub change_type: ChangeIndicator,

    /// `ddhhmm` of an `FM` group
    pub from_time: Option<&'a str>,

    /// `ddhh/ddhh` following `BECMG`/`TEMPO`/`PROB`
    pub window: Option<&'a str>,

    pub probability: Option<u8>,

    /// Every token of the segment, indicator groups included
    pub tokens: Vec<&'a str>,

    /// Index into `tokens` where condition groups begin
    pub conditions_start: usize,
}

impl<'a> Segment<'a> {
    fn initial() -> Self {
        Self {
            change_type: ChangeIndicator::Initial,
            from_time: None,
            window: None,
            probability: None,
            tokens: Vec::new(),
            conditions_start: 0,
        }
    }

    pub fn condition_tokens(&self) -> &[&'a str] {
        &self.tokens[self.conditions_start..]
    }
}

/// Split TAF body tokens into segments at change indicators
///
/// The first segment is always `Initial` and may be empty when the body
/// starts with a change indicator.
pub fn segment_body<'a>(body: &[&'a str]) -> Vec<Segment<'a>> {
    let mut segments = vec![Segment::initial()];
    let mut pos = 0;

    while pos < body.len() {
        match open_segment(body, pos) {
            Some((segment, consumed)) => {
                segments.push(segment);
                pos += consumed;
            }
            None => {
                if let Some(current) = segments.last_mut() {
                    current.tokens.push(body[pos]);
                }
                pos += 1;
            }
        }
    }

    segments
}

/// Recognize a change indicator at `pos`, returning the new segment and how
/// many tokens its indicator groups used
fn open_segment<'a>(body: &[&'a str], pos: usize) -> Option<(Segment<'a>, usize)> {
    let token = body[pos];
    let mut segment = Segment::initial();
    let mut next = pos + 1;

    if let Some(caps) = FROM_RE.captures(token) {
        segment.change_type = ChangeIndicator::From;
        segment.from_time = caps.get(1).map(|m| m.as_str());
    } else if token == change_indicators::BECOMING {
        segment.change_type = ChangeIndicator::Becoming;
    } else if token == change_indicators::TEMPORARY {
        segment.change_type = ChangeIndicator::Temporary;
    } else if let Some(caps) = PROB_RE.captures(token) {
        segment.change_type = ChangeIndicator::Probability;
        segment.probability = caps.get(1).and_then(|m| m.as_str().parse().ok());

        if segment.probability.is_none() {
            if let Some(percent) = body.get(next).filter(|t| is_percentage(t)) {
                segment.probability = percent.parse().ok();
                next += 1;
            }
        }
        if body.get(next) == Some(&change_indicators::TEMPORARY) {
            next += 1;
        }
    } else {
        return None;
    }

    if segment.change_type != ChangeIndicator::From {
        if let Some(window) = body.get(next).filter(|t| is_window_group(t)) {
            segment.window = Some(*window);
            next += 1;
        }
    }

    segment.tokens = body[pos..next].to_vec();
    segment.conditions_start = segment.tokens.len();
    Some((segment, next - pos))
}

fn is_percentage(token: &str) -> bool {
    token.len() == 2 && token.bytes().all(|b| b.is_ascii_digit())
}

/// TAF decoder
#[derive(Debug, Clone, Default)]
pub struct TafDecoder {
    config: DecoderConfig,
}

impl TafDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Decode one TAF; never fails
    pub fn decode(&self, raw: &str, reference_now: DateTime<Utc>) -> TafRecord {
        let tokens = tokenize_report(raw);
        let mut pos = 0;
        let mut is_amended = false;

        if self.config.skip_report_prefixes {
            while pos < tokens.len() && REPORT_PREFIXES.contains(&tokens[pos]) {
                if tokens[pos] == modifiers::AMENDED {
                    is_amended = true;
                }
                pos += 1;
            }
        }

        let header = match tokens.get(pos..pos + 3) {
            Some([station, issued, window])
                if is_station_identifier(station)
                    && ISSUE_TIME_RE.is_match(issued)
                    && is_window_group(window) =>
            {
                (*station, *issued, *window)
            }
            _ => {
                debug!("No TAF header found in '{}'", raw);
                return unparseable(raw, &tokens);
            }
        };
        let (station, issued_token, window_token) = header;
        pos += 3;

        let mut issues = Vec::new();

        let issued_at = resolve_zulu(issued_token, reference_now);
        if issued_at.is_none() {
            issues.push(DecodeIssue::InvalidTimeField {
                token: issued_token.to_string(),
            });
        }

        let window = resolve_window_group(window_token, reference_now);
        if window.is_none() {
            issues.push(DecodeIssue::InvalidTimeField {
                token: window_token.to_string(),
            });
        }
        let valid_from = window.map(|(from, _)| from);
        let valid_to = window.map(|(_, to)| to);

        let (body, remarks) = self.split_remarks(&tokens[pos..]);
        let has_no_forecast = body.first().is_some_and(|t| EMPTY_FORECAST_TOKENS.contains(t));
        if has_no_forecast {
            debug!("TAF for {} carries no forecast ({})", station, body[0]);
        }
        let segments = segment_body(body);

        // Change groups are anchored on the validity start, falling back to
        // issuance when the window did not resolve.
        let anchor = valid_from.or(issued_at);
        let mut periods: Vec<ForecastPeriod> = Vec::with_capacity(segments.len());
        let has_change_groups = segments.len() > 1;

        for segment in &segments {
            let is_initial = segment.change_type == ChangeIndicator::Initial;
            if is_initial && segment.tokens.is_empty() && has_change_groups {
                continue;
            }

            let mut period = decode_segment(segment, anchor, &mut issues);
            if is_initial {
                period.valid_from = valid_from;
            }
            periods.push(period);
        }

        if let Some(last) = periods.last_mut() {
            last.residue.extend(remarks.iter().map(|t| t.to_string()));
        }

        chain_periods(&mut periods, valid_to);

        debug!(
            "Decoded TAF for {}: {} periods, {} issues",
            station,
            periods.len(),
            issues.len()
        );

        TafRecord {
            station: Some(station.to_string()),
            issued_at,
            valid_from,
            valid_to,
            is_amended,
            has_no_forecast,
            periods,
            raw: raw.to_string(),
            issues,
        }
    }

    fn split_remarks<'t, 'a>(&self, body: &'t [&'a str]) -> (&'t [&'a str], &'t [&'a str]) {
        if !self.config.stop_at_remarks {
            return (body, &[]);
        }
        match body.iter().position(|t| *t == REMARKS_MARKER) {
            Some(index) => body.split_at(index),
            None => (body, &[]),
        }
    }
}

/// Decode one segment's conditions and resolve its own times
fn decode_segment(
    segment: &Segment<'_>,
    anchor: Option<DateTime<Utc>>,
    issues: &mut Vec<DecodeIssue>,
) -> ForecastPeriod {
    let conditions = decode_conditions(segment.condition_tokens().iter().copied());
    let category = conditions.category();

    let mut valid_from = None;
    let mut valid_to = None;

    if let Some(from_time) = segment.from_time {
        valid_from = anchor.and_then(|anchor| resolve_after(parse_ddhhmm(from_time)?, anchor));
        if valid_from.is_none() {
            issues.push(DecodeIssue::InvalidTimeField {
                token: format!("{}{}", change_indicators::FROM, from_time),
            });
        }
    } else if let Some(window) = segment.window {
        match anchor.and_then(|anchor| resolve_window_after(window, anchor)) {
            Some((start, end)) => {
                valid_from = Some(start);
                if !segment.change_type.is_chained() {
                    valid_to = Some(end);
                }
            }
            None => issues.push(DecodeIssue::InvalidTimeField {
                token: window.to_string(),
            }),
        }
    } else if segment.change_type == ChangeIndicator::Becoming {
        issues.push(DecodeIssue::MissingField {
            field: ReportField::Time,
        });
    }

    ForecastPeriod {
        change_type: segment.change_type,
        valid_from,
        valid_to,
        probability: segment.probability,
        wind: conditions.wind,
        visibility: conditions.visibility,
        clouds: conditions.clouds,
        category,
        residue: conditions.residue,
        raw: segment.tokens.join(" "),
    }
}

/// Link prevailing periods end-to-start and close the last one at `taf_valid_to`
///
/// Temporary and probability periods are skipped by the chain. Those without
/// an explicit window start with the prevailing period they sit in and keep
/// an open end.
pub fn chain_periods(periods: &mut [ForecastPeriod], taf_valid_to: Option<DateTime<Utc>>) {
    let chained: Vec<usize> = periods
        .iter()
        .enumerate()
        .filter(|(_, period)| period.change_type.is_chained())
        .map(|(index, _)| index)
        .collect();

    for pair in chained.windows(2) {
        periods[pair[0]].valid_to = periods[pair[1]].valid_from;
    }
    if let Some(&last) = chained.last() {
        periods[last].valid_to = taf_valid_to;
    }

    let mut container: Option<usize> = None;
    for index in 0..periods.len() {
        if periods[index].change_type.is_chained() {
            container = Some(index);
            continue;
        }
        if periods[index].valid_from.is_none() {
            if let Some(host) = container {
                periods[index].valid_from = periods[host].valid_from;
            }
        }
    }
}

/// Minimal record for text without a recognizable header
fn unparseable(raw: &str, tokens: &[&str]) -> TafRecord {
    let period = ForecastPeriod {
        change_type: ChangeIndicator::Initial,
        valid_from: None,
        valid_to: None,
        probability: None,
        wind: None,
        visibility: None,
        clouds: Vec::new(),
        category: FlightCategory::Unknown,
        residue: tokens.iter().map(|t| t.to_string()).collect(),
        raw: raw.to_string(),
    };

    TafRecord {
        station: None,
        issued_at: None,
        valid_from: None,
        valid_to: None,
        is_amended: false,
        has_no_forecast: false,
        periods: vec![period],
        raw: raw.to_string(),
        issues: vec![DecodeIssue::UnparseableReport],
    }
}

/// Decode one TAF with default options
pub fn decode_taf(raw: &str, reference_now: DateTime<Utc>) -> TafRecord {
    TafDecoder::default().decode(raw, reference_now)
}
