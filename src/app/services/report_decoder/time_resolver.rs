//! Absolute-time resolution for partial report time groups
//!
//! Report time groups carry only day-of-month, hour and sometimes minute
//! (`ddhhmmZ`, `ddhh/ddhh`, `FMddhhmm`). The month and year come from a
//! reference instant supplied by the caller, never from the system clock.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use tracing::trace;

/// Day-of-month and time-of-day parsed from a report time group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayTime {
    pub day: u32,
    /// 0..=23, or 24 in `ddhh` groups meaning midnight at the end of `day`
    pub hour: u32,
    pub minute: u32,
}

/// Parse a `ddhhmm` group, with or without the trailing `Z`
pub fn parse_ddhhmm(group: &str) -> Option<DayTime> {
    let digits = group.strip_suffix('Z').unwrap_or(group);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let day = digits[0..2].parse::<u32>().ok()?;
    let hour = digits[2..4].parse::<u32>().ok()?;
    let minute = digits[4..6].parse::<u32>().ok()?;

    if !(1..=31).contains(&day) || hour > 23 || minute > 59 {
        return None;
    }

    Some(DayTime { day, hour, minute })
}

/// Parse a `ddhh` group; hour 24 is accepted as end-of-day
pub fn parse_ddhh(group: &str) -> Option<DayTime> {
    if group.len() != 4 || !group.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let day = group[0..2].parse::<u32>().ok()?;
    let hour = group[2..4].parse::<u32>().ok()?;

    if !(1..=31).contains(&day) || hour > 24 {
        return None;
    }

    Some(DayTime {
        day,
        hour,
        minute: 0,
    })
}

/// Split a `ddhh/ddhh` window group into its two halves
pub fn split_window(group: &str) -> Option<(&str, &str)> {
    let (from, to) = group.split_once('/')?;
    if from.len() == 4 && to.len() == 4 {
        Some((from, to))
    } else {
        None
    }
}

/// Resolve a `ddhhmm[Z]` group against the caller's reference time
///
/// A day later than the reference day belongs to the previous month; reports
/// are never dated in the future. Returns `None` for malformed groups and for
/// days that do not exist in the resolved month.
pub fn resolve_zulu(ddhhmm: &str, reference_now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let day_time = parse_ddhhmm(ddhhmm)?;
    let resolved = resolve_on_or_before(day_time, reference_now);

    if resolved.is_none() {
        trace!("Time group '{}' does not exist near {}", ddhhmm, reference_now);
    }
    resolved
}

/// Resolve a pair of `ddhh` groups into a validity window
///
/// Both ends use the same rollover rule as [`resolve_zulu`]. When the resolved
/// end is not after the start, the end moves forward one month.
pub fn resolve_validity_window(
    ddhh_from: &str,
    ddhh_to: &str,
    reference_now: DateTime<Utc>,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let from = parse_ddhh(ddhh_from)?;
    let to = parse_ddhh(ddhh_to)?;

    let start = resolve_on_or_before(from, reference_now)?;

    let (year, month) = month_for_day(to.day, reference_now);
    let mut end = at(year, month, to)?;
    if end <= start {
        let (next_year, next_month) = next_month(year, month);
        end = at(next_year, next_month, to)?;
    }

    Some((start, end))
}

/// Resolve a whole `ddhh/ddhh` group with [`resolve_validity_window`]
pub fn resolve_window_group(
    group: &str,
    reference_now: DateTime<Utc>,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let (from, to) = split_window(group)?;
    resolve_validity_window(from, to, reference_now)
}

/// Resolve a day/time relative to an anchor that precedes it
///
/// Used for change-indicator times inside a TAF, which are resolved in the
/// month of the TAF validity start and move to the next month when their day
/// is earlier than the anchor's day.
pub fn resolve_after(day_time: DayTime, anchor: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let (year, month) = if day_time.day < anchor.day() {
        next_month(anchor.year(), anchor.month())
    } else {
        (anchor.year(), anchor.month())
    };
    at(year, month, day_time)
}

/// Resolve a `ddhh/ddhh` window anchored on a preceding instant
pub fn resolve_window_after(
    group: &str,
    anchor: DateTime<Utc>,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let (from, to) = split_window(group)?;
    let start = resolve_after(parse_ddhh(from)?, anchor)?;
    let end = resolve_after(parse_ddhh(to)?, start)?;
    if end > start { Some((start, end)) } else { None }
}

fn resolve_on_or_before(day_time: DayTime, reference_now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let (year, month) = month_for_day(day_time.day, reference_now);
    at(year, month, day_time)
}

/// Month holding `day` under the rollover rule
fn month_for_day(day: u32, reference_now: DateTime<Utc>) -> (i32, u32) {
    if day > reference_now.day() {
        previous_month(reference_now.year(), reference_now.month())
    } else {
        (reference_now.year(), reference_now.month())
    }
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

/// Build a UTC instant; hour 24 rolls to midnight of the following day
fn at(year: i32, month: u32, day_time: DayTime) -> Option<DateTime<Utc>> {
    let date = NaiveDate::from_ymd_opt(year, month, day_time.day)?;
    let naive = if day_time.hour == 24 {
        if day_time.minute != 0 {
            return None;
        }
        date.and_hms_opt(0, 0, 0)? + Duration::days(1)
    } else {
        date.and_hms_opt(day_time.hour, day_time.minute, 0)?
    };
    Some(Utc.from_utc_datetime(&naive))
}
