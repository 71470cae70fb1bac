//! Decoding statistics and result structures for report batches
//!
//! This module provides types for tracking how many reports decoded cleanly,
//! how many could not be located at all, and how the decoded reports spread
//! across flight categories.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::app::models::{DecodeIssue, DecodedReport, FlightCategory};

/// Simple decoding statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodeStats {
    /// Total number of reports offered to the decoder
    pub total_reports: usize,

    /// Reports with a recognizable header
    pub reports_decoded: usize,

    /// Reports whose header could not be located
    pub reports_unparseable: usize,

    /// Decoded reports with at least one absent expected field
    pub reports_with_missing_fields: usize,

    /// Decoded reports with a time group that failed to resolve
    pub reports_with_invalid_times: usize,

    /// Decoded reports per flight category (TAFs counted by worst period)
    pub categories: BTreeMap<String, usize>,
}

impl DecodeStats {
    /// Create new empty statistics
    pub fn new() -> Self {
        Self {
            total_reports: 0,
            reports_decoded: 0,
            reports_unparseable: 0,
            reports_with_missing_fields: 0,
            reports_with_invalid_times: 0,
            categories: BTreeMap::new(),
        }
    }

    /// Account for one decoded report
    pub fn record(&mut self, report: &DecodedReport) {
        self.total_reports += 1;

        let issues = report.issues();
        if issues.contains(&DecodeIssue::UnparseableReport) {
            self.reports_unparseable += 1;
            return;
        }

        self.reports_decoded += 1;
        if issues
            .iter()
            .any(|issue| matches!(issue, DecodeIssue::MissingField { .. }))
        {
            self.reports_with_missing_fields += 1;
        }
        if issues
            .iter()
            .any(|issue| matches!(issue, DecodeIssue::InvalidTimeField { .. }))
        {
            self.reports_with_invalid_times += 1;
        }

        *self
            .categories
            .entry(report.category().to_string())
            .or_insert(0) += 1;
    }

    /// Fold another set of statistics into this one
    pub fn merge(&mut self, other: &DecodeStats) {
        self.total_reports += other.total_reports;
        self.reports_decoded += other.reports_decoded;
        self.reports_unparseable += other.reports_unparseable;
        self.reports_with_missing_fields += other.reports_with_missing_fields;
        self.reports_with_invalid_times += other.reports_with_invalid_times;
        for (category, count) in &other.categories {
            *self.categories.entry(category.clone()).or_insert(0) += count;
        }
    }

    /// Number of decoded reports in a category
    pub fn category_count(&self, category: FlightCategory) -> usize {
        self.categories
            .get(&category.to_string())
            .copied()
            .unwrap_or(0)
    }

    /// Calculate success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_reports == 0 {
            0.0
        } else {
            (self.reports_decoded as f64 / self.total_reports as f64) * 100.0
        }
    }

    /// Check if decoding was mostly successful (>90% success rate)
    pub fn is_successful(&self) -> bool {
        self.success_rate() > 90.0
    }
}

impl Default for DecodeStats {
    fn default() -> Self {
        Self::new()
    }
}
