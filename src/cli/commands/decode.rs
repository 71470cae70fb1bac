//! `metar` and `taf` command implementations
//!
//! Decodes reports given on the command line and renders them either as
//! coloured human-readable summaries or as JSON.

use chrono::{DateTime, Utc};
use colored::Colorize;
use std::fmt::Write as _;
use tracing::info;

use super::shared::{category_label, setup_logging, write_output};
use crate::app::models::{
    CloudLayer, DecodeIssue, ForecastPeriod, MetarRecord, TafRecord, Visibility, Wind,
    WindDirection,
};
use crate::app::services::report_decoder::{MetarDecoder, TafDecoder};
use crate::cli::args::{DecodeArgs, OutputFormat};
use crate::config::{DecoderConfig, LoggingConfig};
use crate::{Error, Result};

/// Decode METARs given as arguments
pub async fn run_metar(args: DecodeArgs) -> Result<()> {
    setup_logging(&args.common, &LoggingConfig::default())?;

    let now = args.common.reference_now();
    info!("Decoding {} METAR reports against {}", args.reports.len(), now);

    let decoder = MetarDecoder::new(DecoderConfig::default());
    let records: Vec<MetarRecord> = args
        .reports
        .iter()
        .map(|raw| decoder.decode(raw, now))
        .collect();

    let output = match args.common.output_format {
        OutputFormat::Human => records
            .iter()
            .map(format_metar)
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Json => to_json(&records)?,
    };
    write_output(None, &output)
}

/// Decode TAFs given as arguments
pub async fn run_taf(args: DecodeArgs) -> Result<()> {
    setup_logging(&args.common, &LoggingConfig::default())?;

    let now = args.common.reference_now();
    info!("Decoding {} TAF reports against {}", args.reports.len(), now);

    let decoder = TafDecoder::new(DecoderConfig::default());
    let records: Vec<TafRecord> = args
        .reports
        .iter()
        .map(|raw| decoder.decode(raw, now))
        .collect();

    let output = match args.common.output_format {
        OutputFormat::Human => records
            .iter()
            .map(format_taf)
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Json => to_json(&records)?,
    };
    write_output(None, &output)
}

pub fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| Error::serialization("Failed to serialize decoded reports", e))
}

/// Human-readable METAR summary
pub fn format_metar(record: &MetarRecord) -> String {
    let mut out = String::new();
    let station = record.station.as_deref().unwrap_or("????");

    let _ = writeln!(
        out,
        "{} {}  {}",
        "METAR".bold(),
        station.bold(),
        category_label(record.category)
    );
    let _ = writeln!(out, "  Observed:    {}", format_time(record.observed_at));

    let mut modifiers = Vec::new();
    if record.is_automated {
        modifiers.push("automated");
    }
    if record.is_corrected {
        modifiers.push("corrected");
    }
    if !modifiers.is_empty() {
        let _ = writeln!(out, "  Report:      {}", modifiers.join(", "));
    }

    let _ = writeln!(out, "  Wind:        {}", format_wind(record.wind.as_ref()));
    let _ = writeln!(
        out,
        "  Visibility:  {}",
        format_visibility(record.visibility.as_ref())
    );
    let _ = writeln!(out, "  Clouds:      {}", format_clouds(&record.clouds));

    let temperature = match (record.temperature, record.dewpoint) {
        (Some(temp), Some(dew)) => format!("{}°C / dewpoint {}°C", temp, dew),
        (Some(temp), None) => format!("{}°C", temp),
        _ => "-".to_string(),
    };
    let _ = writeln!(out, "  Temperature: {}", temperature);

    let altimeter = record
        .altimeter_inhg
        .map(|inhg| format!("{:.2} inHg", inhg))
        .unwrap_or_else(|| "-".to_string());
    let _ = writeln!(out, "  Altimeter:   {}", altimeter);

    if !record.remarks.is_empty() {
        let _ = writeln!(out, "  Remarks:     {}", record.remarks.join(" "));
    }
    write_issues(&mut out, &record.issues);
    out
}

/// Human-readable TAF summary
pub fn format_taf(record: &TafRecord) -> String {
    let mut out = String::new();
    let station = record.station.as_deref().unwrap_or("????");
    let amended = if record.is_amended { " AMD" } else { "" };

    let _ = writeln!(
        out,
        "{}{} {}  worst {}",
        "TAF".bold(),
        amended,
        station.bold(),
        category_label(record.worst_category())
    );
    let _ = writeln!(out, "  Issued:  {}", format_time(record.issued_at));
    let _ = writeln!(
        out,
        "  Valid:   {} to {}",
        format_time(record.valid_from),
        format_time(record.valid_to)
    );
    if record.has_no_forecast {
        let _ = writeln!(out, "  Forecast: none issued");
    }

    for period in &record.periods {
        write_period(&mut out, period);
    }
    write_issues(&mut out, &record.issues);
    out
}

fn write_period(out: &mut String, period: &ForecastPeriod) {
    let heading = match period.probability {
        Some(percent) => format!("{} {}%", period.change_type, percent),
        None => period.change_type.to_string(),
    };
    let _ = writeln!(
        out,
        "  {:<9} {} to {}  {}",
        heading.cyan(),
        format_time(period.valid_from),
        format_time(period.valid_to),
        category_label(period.category)
    );
    let _ = writeln!(
        out,
        "            wind {}, visibility {}, clouds {}",
        format_wind(period.wind.as_ref()),
        format_visibility(period.visibility.as_ref()),
        format_clouds(&period.clouds)
    );
    if !period.residue.is_empty() {
        let _ = writeln!(out, "            other: {}", period.residue.join(" "));
    }
}

fn write_issues(out: &mut String, issues: &[DecodeIssue]) {
    for issue in issues {
        let text = match issue {
            DecodeIssue::UnparseableReport => "report header not recognized".to_string(),
            DecodeIssue::MissingField { field } => format!("no {:?} group", field).to_lowercase(),
            DecodeIssue::InvalidTimeField { token } => format!("invalid time group '{}'", token),
        };
        let _ = writeln!(out, "  {} {}", "!".yellow().bold(), text.yellow());
    }
}

fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%MZ").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn format_wind(wind: Option<&Wind>) -> String {
    let Some(wind) = wind else {
        return "-".to_string();
    };

    let mut text = match wind.direction {
        WindDirection::Calm => return "calm".to_string(),
        WindDirection::Variable => format!("variable at {} kt", wind.speed_kts),
        WindDirection::Degrees(degrees) => format!("{:03}° at {} kt", degrees, wind.speed_kts),
    };
    if let Some(gust) = wind.gust_kts {
        let _ = write!(text, " gusting {} kt", gust);
    }
    if let Some((from, to)) = wind.variable_range {
        let _ = write!(text, " (varying {:03}°-{:03}°)", from, to);
    }
    text
}

fn format_visibility(visibility: Option<&Visibility>) -> String {
    match visibility {
        None => "-".to_string(),
        Some(v) if v.is_at_least => format!("{}+ SM", v.statute_miles),
        Some(v) if v.is_less_than => format!("<{} SM", v.statute_miles),
        Some(v) => format!("{} SM", v.statute_miles),
    }
}

fn format_clouds(clouds: &[CloudLayer]) -> String {
    if clouds.is_empty() {
        return "none reported".to_string();
    }
    clouds
        .iter()
        .map(|layer| {
            let base = layer
                .base_feet_agl
                .map(|feet| format!("{} ft", feet))
                .unwrap_or_else(|| "unknown base".to_string());
            match layer.convective {
                Some(convective) => {
                    let kind = format!("{:?}", convective).to_uppercase();
                    format!("{} {} {}", layer.coverage.code(), base, kind)
                }
                None => format!("{} {}", layer.coverage.code(), base),
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
