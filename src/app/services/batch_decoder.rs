//! Bounded-concurrency decoding of many reports
//!
//! Decoding itself is synchronous and CPU bound. Reports are processed in
//! batches; within a batch each report is decoded on the blocking thread pool
//! with at most `workers` decodes in flight. Results come back in input order
//! regardless of completion order.

use chrono::{DateTime, Utc};
use futures::{StreamExt, stream};
use indicatif::ProgressBar;
use std::sync::Arc;
use std::time::Duration;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::app::models::{DecodedReport, RawReport};
use crate::app::services::report_decoder::{DecodeStats, ReportDecoder};
use crate::config::{BatchConfig, DecoderConfig};
use crate::{Error, Result};

/// Outcome of a batch run
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// Decoded reports in input order
    pub reports: Vec<DecodedReport>,
    pub stats: DecodeStats,
    /// Cancellation stopped the run before every report was decoded
    pub interrupted: bool,
}

/// Batch decoder
pub struct BatchDecoder {
    decoder: Arc<ReportDecoder>,
    config: BatchConfig,
    cancellation_token: CancellationToken,
    progress: Option<ProgressBar>,
}

impl BatchDecoder {
    pub fn new(decoder_config: DecoderConfig, config: BatchConfig) -> Self {
        Self {
            decoder: Arc::new(ReportDecoder::new(decoder_config)),
            config,
            cancellation_token: CancellationToken::new(),
            progress: None,
        }
    }

    /// Stop between reports once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    /// Advance `progress` by one for every decoded report
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Decode every report against the same reference time
    pub async fn decode_all(
        &self,
        reports: Vec<RawReport>,
        reference_now: DateTime<Utc>,
    ) -> Result<BatchResult> {
        let total = reports.len();
        let batch_size = self.config.batch_size.max(1);
        let workers = self.config.workers.max(1);
        let total_batches = total.div_ceil(batch_size);

        info!(
            "Decoding {} reports in {} batches with {} workers",
            total, total_batches, workers
        );

        let mut slots: Vec<Option<DecodedReport>> = vec![None; total];
        let mut pending = reports.into_iter().enumerate().peekable();
        let mut interrupted = false;
        let mut batch_num = 0;

        while pending.peek().is_some() {
            if self.cancellation_token.is_cancelled() {
                interrupted = true;
                break;
            }

            let chunk: Vec<(usize, RawReport)> = pending.by_ref().take(batch_size).collect();
            batch_num += 1;
            debug!(
                "Decoding batch {}/{} ({} reports)",
                batch_num,
                total_batches,
                chunk.len()
            );

            let results = stream::iter(chunk)
                .map(|(index, report)| {
                    let decoder = Arc::clone(&self.decoder);
                    async move {
                        let decoded =
                            task::spawn_blocking(move || decoder.decode(&report, reference_now))
                                .await
                                .map_err(|e| {
                                    Error::task_join(format!("Decode task {} failed", index), e)
                                })?;
                        Ok::<_, Error>((index, decoded))
                    }
                })
                .buffer_unordered(workers)
                .take_until(self.cancellation_token.cancelled());
            tokio::pin!(results);

            while let Some(result) = results.next().await {
                let (index, decoded) = result?;
                slots[index] = Some(decoded);
                if let Some(progress) = &self.progress {
                    progress.inc(1);
                }
            }

            if self.cancellation_token.is_cancelled() {
                interrupted = true;
                break;
            }

            if self.config.inter_batch_delay_ms > 0 && pending.peek().is_some() {
                let delay = Duration::from_millis(self.config.inter_batch_delay_ms);
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = self.cancellation_token.cancelled() => {
                        interrupted = true;
                        break;
                    }
                }
            }
        }

        let reports: Vec<DecodedReport> = slots.into_iter().flatten().collect();
        let mut stats = DecodeStats::new();
        for report in &reports {
            stats.record(report);
        }

        if interrupted {
            warn!(
                "Decoding cancelled after {} of {} reports",
                reports.len(),
                total
            );
        } else {
            info!(
                "Decoded {} reports ({:.1}% with a recognizable header)",
                stats.total_reports,
                stats.success_rate()
            );
        }

        Ok(BatchResult {
            reports,
            stats,
            interrupted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::models::ReportKind;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 23, 0, 0).unwrap()
    }

    fn sample_reports(count: usize) -> Vec<RawReport> {
        (0..count)
            .map(|i| {
                if i % 5 == 4 {
                    RawReport::taf(format!(
                        "KT{:02} 051730Z 0518/0624 18010KT P6SM FM052000 20012KT 2SM OVC008",
                        i % 100
                    ))
                } else {
                    RawReport::metar(format!(
                        "KM{:02} 052253Z 12008KT 10SM FEW250 24/12 A3008",
                        i % 100
                    ))
                }
            })
            .collect()
    }

    fn batch_config(workers: usize, batch_size: usize) -> BatchConfig {
        BatchConfig {
            workers,
            batch_size,
            inter_batch_delay_ms: 0,
        }
    }

    #[tokio::test]
    async fn test_results_keep_input_order() {
        let reports = sample_reports(23);
        let expected: Vec<String> = reports.iter().map(|r| r.text().to_string()).collect();

        let decoder = BatchDecoder::new(DecoderConfig::default(), batch_config(4, 5));
        let result = decoder.decode_all(reports, now()).await.unwrap();

        assert!(!result.interrupted);
        let raw: Vec<&str> = result.reports.iter().map(|r| r.raw()).collect();
        assert_eq!(raw, expected);
        assert_eq!(result.reports[4].kind(), ReportKind::Taf);
    }

    #[tokio::test]
    async fn test_stats_cover_every_report() {
        let mut reports = sample_reports(10);
        reports.push(RawReport::metar("not a report"));

        let decoder = BatchDecoder::new(DecoderConfig::default(), batch_config(2, 3));
        let result = decoder.decode_all(reports, now()).await.unwrap();

        assert_eq!(result.stats.total_reports, 11);
        assert_eq!(result.stats.reports_unparseable, 1);
        assert_eq!(result.stats.reports_decoded, 10);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();

        let decoder = BatchDecoder::new(DecoderConfig::default(), batch_config(2, 3))
            .with_cancellation(token);
        let result = decoder.decode_all(sample_reports(9), now()).await.unwrap();

        assert!(result.interrupted);
        assert!(result.reports.is_empty());
    }

    #[tokio::test]
    async fn test_inter_batch_delay() {
        let config = BatchConfig {
            workers: 2,
            batch_size: 2,
            inter_batch_delay_ms: 5,
        };
        let decoder = BatchDecoder::new(DecoderConfig::default(), config);

        let started = std::time::Instant::now();
        let result = decoder.decode_all(sample_reports(6), now()).await.unwrap();

        assert_eq!(result.reports.len(), 6);
        assert!(started.elapsed() >= Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_empty_input() {
        let decoder = BatchDecoder::new(DecoderConfig::default(), BatchConfig::default());
        let result = decoder.decode_all(Vec::new(), now()).await.unwrap();
        assert!(result.reports.is_empty());
        assert_eq!(result.stats.total_reports, 0);
    }

    #[tokio::test]
    async fn test_progress_counts_reports() {
        let progress = ProgressBar::hidden();
        let decoder = BatchDecoder::new(DecoderConfig::default(), batch_config(3, 4))
            .with_progress(progress.clone());
        decoder.decode_all(sample_reports(7), now()).await.unwrap();
        assert_eq!(progress.position(), 7);
    }
}
