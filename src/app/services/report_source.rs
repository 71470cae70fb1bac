//! Raw report text sources
//!
//! Reads report text from files, directories, glob patterns or stdin and
//! splits it into individual [`RawReport`] values ready for decoding.
//!
//! METAR feeds carry one report per line. TAF feeds spread each forecast over
//! several lines: a new forecast starts at a blank line or at a line beginning
//! with `TAF`, and indented lines or lines opening with a change indicator
//! continue the current forecast.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::app::models::{RawReport, ReportKind};
use crate::app::services::report_decoder::field_recognizers::is_window_group;
use crate::constants::{REPORT_FILE_EXTENSION, REPORT_PREFIXES};
use crate::{Error, Result};

static CONTINUATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(FM\d{6}|BECMG|TEMPO|PROB\d{0,2})(\s|$)").expect("continuation pattern is valid")
});

/// How to interpret input text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Metar,
    Taf,
    /// Decide per report from its shape
    #[default]
    Auto,
}

/// One resolved input location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

impl Input {
    pub fn describe(&self) -> String {
        match self {
            Input::Stdin => "<stdin>".to_string(),
            Input::File(path) => path.display().to_string(),
        }
    }
}

/// Guess the kind of a single report from its shape
///
/// A `TAF` prefix or a `ddhh/ddhh` validity window in third position marks a
/// forecast; anything else is treated as an observation.
pub fn detect_kind(text: &str) -> ReportKind {
    let mut tokens = text.split_whitespace().peekable();
    let mut saw_taf_prefix = false;

    while let Some(token) = tokens.peek() {
        if !REPORT_PREFIXES.contains(token) {
            break;
        }
        saw_taf_prefix |= *token == "TAF";
        tokens.next();
    }

    if saw_taf_prefix || tokens.nth(2).is_some_and(is_window_group) {
        ReportKind::Taf
    } else {
        ReportKind::Metar
    }
}

/// Split text into reports according to `kind`
pub fn split_reports(text: &str, kind: SourceKind) -> Vec<RawReport> {
    match kind {
        SourceKind::Metar => text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(RawReport::metar)
            .collect(),
        SourceKind::Taf => split_forecasts(text)
            .into_iter()
            .map(RawReport::taf)
            .collect(),
        SourceKind::Auto => split_forecasts(text)
            .into_iter()
            .map(|report| RawReport::new(detect_kind(&report), report))
            .collect(),
    }
}

/// Group lines into multi-line forecasts
fn split_forecasts(text: &str) -> Vec<String> {
    let mut reports = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            flush(&mut reports, &mut current);
            continue;
        }

        let indented = line.starts_with(char::is_whitespace);
        let continues = !current.is_empty()
            && !trimmed.starts_with("TAF")
            && (indented || CONTINUATION_RE.is_match(trimmed));

        if !continues {
            flush(&mut reports, &mut current);
        }
        current.push(trimmed);
    }

    flush(&mut reports, &mut current);
    reports
}

fn flush(reports: &mut Vec<String>, current: &mut Vec<&str>) {
    if !current.is_empty() {
        reports.push(current.join(" "));
        current.clear();
    }
}

fn is_glob_pattern(value: &str) -> bool {
    value.contains(['*', '?', '['])
}

fn is_report_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(REPORT_FILE_EXTENSION))
}

/// Expand command line inputs into concrete files or stdin
///
/// `-` is stdin; directories are walked recursively for `*.txt` files; values
/// with glob metacharacters are expanded. Order follows the arguments, and
/// files found within one directory or pattern are sorted.
pub fn resolve_inputs(inputs: &[String]) -> Result<Vec<Input>> {
    if inputs.is_empty() {
        return Ok(vec![Input::Stdin]);
    }

    let mut resolved = Vec::new();
    for input in inputs {
        if input == "-" {
            resolved.push(Input::Stdin);
            continue;
        }

        let path = Path::new(input);
        if path.is_dir() {
            let mut files = Vec::new();
            for entry in WalkDir::new(path).follow_links(false) {
                let entry = entry.map_err(|e| {
                    Error::directory_traversal(format!("Failed to walk {}", path.display()), e)
                })?;
                if is_report_file(entry.path()) {
                    files.push(entry.into_path());
                }
            }
            files.sort();
            debug!("Found {} report files under {}", files.len(), path.display());
            resolved.extend(files.into_iter().map(Input::File));
        } else if path.is_file() {
            resolved.push(Input::File(path.to_path_buf()));
        } else if is_glob_pattern(input) {
            let mut files = Vec::new();
            let entries = glob::glob(input).map_err(|e| Error::glob_pattern(input.clone(), e))?;
            for entry in entries {
                match entry {
                    Ok(found) if found.is_file() => files.push(found),
                    Ok(_) => {}
                    Err(e) => warn!("Skipping unreadable glob match: {}", e),
                }
            }
            if files.is_empty() {
                warn!("Pattern '{}' matched no files", input);
            }
            files.sort();
            resolved.extend(files.into_iter().map(Input::File));
        } else {
            return Err(Error::file_not_found(input.clone()));
        }
    }

    Ok(resolved)
}

/// Source of raw reports for batch decoding
#[derive(Debug, Clone, Default)]
pub struct ReportSource {
    kind: SourceKind,
}

impl ReportSource {
    pub fn new(kind: SourceKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Split already loaded text
    pub fn reports_from_text(&self, text: &str) -> Vec<RawReport> {
        split_reports(text, self.kind)
    }

    /// Read one input and split it into reports
    pub async fn read_input(&self, input: &Input) -> Result<Vec<RawReport>> {
        let text = match input {
            Input::Stdin => {
                let mut text = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut text)
                    .await
                    .map_err(|e| Error::io("Failed to read stdin", e))?;
                text
            }
            Input::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| Error::io(format!("Failed to read {}", path.display()), e))?,
        };

        let reports = self.reports_from_text(&text);
        debug!("Read {} reports from {}", reports.len(), input.describe());
        Ok(reports)
    }

    /// Read every input in order
    pub async fn read_all(&self, inputs: &[Input]) -> Result<Vec<RawReport>> {
        let mut reports = Vec::new();
        for input in inputs {
            reports.extend(self.read_input(input).await?);
        }
        info!(
            "Loaded {} reports from {} inputs",
            reports.len(),
            inputs.len()
        );
        Ok(reports)
    }
}
