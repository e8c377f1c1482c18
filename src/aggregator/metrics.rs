//! Per-metric quantile reports and the session summary.
//!
//! Metrics are the update function labels seen in any engine-frame, sorted,
//! followed by the two reserved frame-timing keys.

use super::quantile::quantiles;
use super::segmenter::{Segmentation, EXECUTE_KEY, INTERVAL_KEY};
use crate::utils::error::QuantileError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Quantile summary of one metric across all engine-frames
///
/// **Public** - rendered into the per-file log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricReport {
    /// Function label or reserved key
    pub key: String,

    /// Number of frames sampled
    pub sample_count: usize,

    /// Configured quantile fractions
    pub fractions: Vec<f64>,

    /// Quantile values in milliseconds; empty when there were no frames
    pub values_ms: Vec<f64>,
}

/// Whole-session totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Capture file name
    pub file_name: String,

    /// Effective (post-trim) session length in seconds
    pub duration_seconds: f64,

    /// Time spent in engine-frames in seconds
    pub engine_seconds: f64,

    /// Number of engine-frames
    pub engine_call_count: u64,

    /// Engine time over effective time; `None` when the effective time is 0
    pub engine_ratio: Option<f64>,
}

/// Metric keys in report order
///
/// **Public** - sorted union of all frame labels, then `execute`, `interval`
pub fn metric_keys(segmentation: &Segmentation) -> Vec<String> {
    let labels: BTreeSet<&str> = segmentation
        .frames
        .iter()
        .flat_map(|frame| frame.info.keys().map(String::as_str))
        .filter(|label| *label != EXECUTE_KEY && *label != INTERVAL_KEY)
        .collect();

    labels
        .into_iter()
        .map(str::to_string)
        .chain([EXECUTE_KEY.to_string(), INTERVAL_KEY.to_string()])
        .collect()
}

/// Compute the quantile report of every metric
///
/// **Public** - main entry point of the statistics stage
///
/// # Errors
/// * `QuantileError::InvalidFraction` - a fraction outside `[0, 1)`
///
/// A session without engine-frames is not an error: every report comes back
/// with a zero sample count and no values.
pub fn build_metric_reports(
    segmentation: &Segmentation,
    fractions: &[f64],
) -> Result<Vec<MetricReport>, QuantileError> {
    let keys = metric_keys(segmentation);
    debug!(
        "Computing {} metric(s) over {} frame(s)",
        keys.len(),
        segmentation.frames.len()
    );

    keys.into_iter()
        .map(|key| {
            let samples: Vec<u64> = segmentation
                .frames
                .iter()
                .map(|frame| frame.metric(&key))
                .collect();

            let values_ms = match quantiles(&samples, fractions) {
                Ok(values) => values.into_iter().map(us_to_ms).collect(),
                Err(QuantileError::EmptyInput) => Vec::new(),
                Err(err) => return Err(err),
            };

            Ok(MetricReport {
                key,
                sample_count: samples.len(),
                fractions: fractions.to_vec(),
                values_ms,
            })
        })
        .collect()
}

/// Summarize a segmented session
///
/// **Public** - one summary per analyzed file
pub fn summarize_session(file_name: &str, segmentation: &Segmentation) -> SessionSummary {
    let effective = segmentation.effective_total_weight;
    let engine = segmentation.engine_total_weight;

    SessionSummary {
        file_name: file_name.to_string(),
        duration_seconds: us_to_seconds(effective),
        engine_seconds: us_to_seconds(engine),
        engine_call_count: segmentation.engine_call_count,
        engine_ratio: if effective > 0 {
            Some(engine as f64 / effective as f64)
        } else {
            None
        },
    }
}

pub fn us_to_ms(value_us: u64) -> f64 {
    value_us as f64 / 1_000.0
}

pub fn us_to_seconds(value_us: u64) -> f64 {
    value_us as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::segmenter::EngineFrame;
    use std::collections::BTreeMap;

    fn frame(start: u64, end: u64, next: u64, info: &[(&str, u64)]) -> EngineFrame {
        EngineFrame {
            start_time: start,
            end_time: end,
            next_start_time: next,
            info: info.iter().map(|(k, v)| (k.to_string(), *v)).collect::<BTreeMap<_, _>>(),
        }
    }

    fn segmentation(frames: Vec<EngineFrame>) -> Segmentation {
        Segmentation {
            engine_call_count: frames.len() as u64,
            engine_total_weight: frames.iter().map(|f| f.execute()).sum(),
            effective_total_weight: 100_000,
            frames,
            ..Default::default()
        }
    }

    #[test]
    fn test_metric_key_order() {
        let seg = segmentation(vec![
            frame(0, 10, 20, &[("b_update", 5)]),
            frame(20, 30, 40, &[("a_update", 5), ("execute", 1)]),
        ]);
        assert_eq!(
            metric_keys(&seg),
            vec!["a_update", "b_update", "execute", "interval"]
        );
    }

    #[test]
    fn test_missing_label_counts_as_zero() {
        let seg = segmentation(vec![
            frame(0, 16_000, 16_667, &[("update", 4_000)]),
            frame(16_667, 30_000, 33_334, &[]),
        ]);

        let reports = build_metric_reports(&seg, &[0.0, 0.5]).unwrap();
        let update = &reports[0];
        assert_eq!(update.key, "update");
        assert_eq!(update.sample_count, 2);
        assert_eq!(update.values_ms, vec![0.0, 4.0]);

        let execute = &reports[1];
        assert_eq!(execute.key, "execute");
        assert_eq!(execute.values_ms, vec![13.333, 16.0]);
    }

    #[test]
    fn test_no_frames_yields_empty_reports() {
        let seg = segmentation(Vec::new());
        let reports = build_metric_reports(&seg, &[0.5]).unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.sample_count == 0 && r.values_ms.is_empty()));
    }

    #[test]
    fn test_invalid_fraction_propagates() {
        let seg = segmentation(vec![frame(0, 10, 20, &[])]);
        assert!(build_metric_reports(&seg, &[1.5]).is_err());
    }

    #[test]
    fn test_summary_ratio() {
        let seg = Segmentation {
            effective_total_weight: 10_000_000,
            engine_total_weight: 2_500_000,
            engine_call_count: 150,
            ..Default::default()
        };
        let summary = summarize_session("a.json", &seg);
        assert_eq!(summary.duration_seconds, 10.0);
        assert_eq!(summary.engine_seconds, 2.5);
        assert_eq!(summary.engine_ratio, Some(0.25));
    }

    #[test]
    fn test_summary_ratio_undefined_for_empty_session() {
        let summary = summarize_session("a.json", &Segmentation::default());
        assert_eq!(summary.engine_ratio, None);
    }
}
