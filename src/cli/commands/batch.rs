//! Batch command implementation
//!
//! Reads reports from files, directories, glob patterns or stdin, decodes
//! them concurrently and renders every decoded report followed by a summary.

use super::decode::{format_metar, format_taf, to_json};
use super::shared::{
    category_label, create_progress_bar, load_configuration, setup_logging, write_output,
};
use crate::app::models::{DecodedReport, FlightCategory};
use crate::app::services::batch_decoder::{BatchDecoder, BatchResult};
use crate::app::services::report_decoder::DecodeStats;
use crate::app::services::report_source::{ReportSource, resolve_inputs};
use crate::cli::args::{BatchArgs, OutputFormat};
use crate::{Error, Result};
use indicatif::HumanDuration;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Batch command runner
///
/// 1. Validate arguments and load layered configuration
/// 2. Resolve inputs and split them into reports
/// 3. Decode with bounded concurrency and progress reporting
/// 4. Render reports and the summary
pub async fn run_batch(args: BatchArgs, cancellation_token: CancellationToken) -> Result<()> {
    let start_time = Instant::now();

    args.validate()?;
    let config = load_configuration(&args)?;
    setup_logging(&args.common, &config.logging)?;
    debug!("Loaded configuration: {:?}", config);

    let now = args.common.reference_now();
    let inputs = resolve_inputs(&args.inputs)?;
    info!("Reading reports from {} inputs", inputs.len());

    let source = ReportSource::new(args.kind.into());
    let reports = source.read_all(&inputs).await?;
    if reports.is_empty() {
        warn!("No reports found in the given inputs");
    }

    let mut decoder = BatchDecoder::new(config.decoder.clone(), config.batch.clone())
        .with_cancellation(cancellation_token);

    let progress = args
        .common
        .show_progress()
        .then(|| create_progress_bar(reports.len() as u64, "Decoding reports"));
    if let Some(pb) = &progress {
        decoder = decoder.with_progress(pb.clone());
    }

    let result = decoder.decode_all(reports, now).await?;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let elapsed = start_time.elapsed();
    let rendered = match args.common.output_format {
        OutputFormat::Human => render_reports(&result.reports),
        OutputFormat::Json => render_json(&result, elapsed)?,
    };
    write_output(args.output_file.as_deref(), &rendered)?;

    if args.common.output_format == OutputFormat::Human && !args.common.quiet {
        println!("{}", render_summary(&result.stats, elapsed));
    }

    if result.interrupted {
        return Err(Error::processing_interrupted(format!(
            "Decoded {} reports before cancellation",
            result.reports.len()
        )));
    }

    Ok(())
}

fn render_reports(reports: &[DecodedReport]) -> String {
    reports
        .iter()
        .map(|report| match report {
            DecodedReport::Metar(record) => format_metar(record),
            DecodedReport::Taf(record) => format_taf(record),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_json(result: &BatchResult, elapsed: Duration) -> Result<String> {
    let document = serde_json::json!({
        "reports": result.reports,
        "stats": result.stats,
        "interrupted": result.interrupted,
        "processing_time_seconds": elapsed.as_secs_f64(),
    });
    to_json(&document)
}

/// Human-readable batch summary
fn render_summary(stats: &DecodeStats, elapsed: Duration) -> String {
    let mut lines = vec![
        String::new(),
        "Decoding Summary".to_string(),
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━".to_string(),
        format!("   • Reports read: {}", stats.total_reports),
        format!(
            "   • Reports decoded: {} ({:.1}%)",
            stats.reports_decoded,
            stats.success_rate()
        ),
        format!("   • Missing fields: {}", stats.reports_with_missing_fields),
        format!("   • Invalid time groups: {}", stats.reports_with_invalid_times),
        format!("   • Processing time: {}", HumanDuration(elapsed)),
    ];

    if stats.reports_unparseable > 0 {
        lines.push(format!(
            "⚠️  Unparseable reports: {}",
            stats.reports_unparseable
        ));
    }

    lines.push("Flight categories:".to_string());
    for category in [
        FlightCategory::Vfr,
        FlightCategory::Mvfr,
        FlightCategory::Ifr,
        FlightCategory::Lifr,
        FlightCategory::Unknown,
    ] {
        lines.push(format!(
            "   • {}: {}",
            category_label(category),
            stats.category_count(category)
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::RawReport;
    use crate::cli::args::{Args, Commands};
    use crate::config::{BatchConfig, DecoderConfig};
    use chrono::{TimeZone, Utc};
    use clap::Parser;
    use tempfile::TempDir;

    async fn decode(reports: Vec<RawReport>) -> BatchResult {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 23, 0, 0).unwrap();
        BatchDecoder::new(DecoderConfig::default(), BatchConfig::default())
            .decode_all(reports, now)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_render_reports_and_summary() {
        colored::control::set_override(false);
        let result = decode(vec![
            RawReport::metar("KATL 052253Z 12008KT 10SM FEW250 24/12 A3008"),
            RawReport::taf("KJFK 051730Z 0518/0624 33015KT P6SM FM052000 34010KT 2SM OVC008"),
            RawReport::metar("not a report"),
        ])
        .await;

        let text = render_reports(&result.reports);
        assert!(text.contains("METAR KATL"));
        assert!(text.contains("TAF KJFK"));

        let summary = render_summary(&result.stats, Duration::from_millis(10));
        assert!(summary.contains("Reports read: 3"));
        assert!(summary.contains("Unparseable reports: 1"));
        assert!(summary.contains("VFR: 1"));
        assert!(summary.contains("IFR: 1"));
    }

    #[tokio::test]
    async fn test_render_json_document() {
        let result = decode(vec![RawReport::metar(
            "KATL 052253Z 12008KT 10SM FEW250 24/12 A3008",
        )])
        .await;

        let json = render_json(&result, Duration::from_secs(1)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["reports"][0]["type"], "METAR");
        assert_eq!(value["stats"]["total_reports"], 1);
        assert_eq!(value["interrupted"], false);
    }

    #[tokio::test]
    async fn test_run_batch_writes_output_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("reports.txt");
        std::fs::write(
            &input,
            "METAR KATL 052253Z 12008KT 10SM FEW250 24/12 A3008\n\
             METAR KORD 052251Z 27015KT 1/2SM FG OVC002 M02/M05 A2987\n",
        )
        .unwrap();
        let config = dir.path().join("config.json");
        std::fs::write(&config, "{}").unwrap();
        let output = dir.path().join("decoded.json");

        let args = Args::try_parse_from([
            "avwx-decoder",
            "batch",
            input.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "--format",
            "json",
            "--now",
            "2024-03-05T23:00:00Z",
            "-q",
            "-o",
            output.to_str().unwrap(),
        ])
        .unwrap();
        let Some(Commands::Batch(batch_args)) = args.get_command() else {
            panic!("expected batch command");
        };

        run_batch(batch_args, CancellationToken::new()).await.unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(value["reports"].as_array().unwrap().len(), 2);
        assert_eq!(value["reports"][1]["category"], "LIFR");
    }
}
