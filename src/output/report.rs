//! Text rendering of metric reports and session summaries.
//!
//! Millisecond values use the shortest round-trip form (`4`, `2.5`,
//! `13.333`); seconds and ratios use two decimals.

use crate::aggregator::{MetricReport, Segmentation, SessionSummary};
use crate::aggregator::metrics::us_to_seconds;

/// Render one metric as four log lines
///
/// ```text
/// execute
/// samples 2
/// quantiles 0.25-0.5-0.75-0.9
/// quantile values (ms) 100-150-150-150
/// ```
pub fn render_metric(report: &MetricReport) -> Vec<String> {
    let values = if report.values_ms.is_empty() {
        "n/a".to_string()
    } else {
        join_values(&report.values_ms)
    };

    vec![
        report.key.clone(),
        format!("samples {}", report.sample_count),
        format!("quantiles {}", join_values(&report.fractions)),
        format!("quantile values (ms) {}", values),
    ]
}

/// Render the whole-session summary block
pub fn render_summary(summary: &SessionSummary) -> Vec<String> {
    let ratio = summary
        .engine_ratio
        .map_or_else(|| "undefined".to_string(), |ratio| format!("{:.2}", ratio));

    vec![
        format!("file {}", summary.file_name),
        format!("duration (s): {:.2}", summary.duration_seconds),
        format!(
            "engine calls {}, engine duration (s): {:.2}, engine/duration ratio: {}",
            summary.engine_call_count, summary.engine_seconds, ratio
        ),
    ]
}

/// Describe the edge trim, if one was applied
pub fn render_trim(segmentation: &Segmentation, start_cut_us: u64, end_cut_us: u64) -> Option<String> {
    if !segmentation.trimmed {
        return None;
    }

    Some(format!(
        "trimmed first {}s and last {}s: {}s => {}s",
        us_to_seconds(start_cut_us),
        us_to_seconds(end_cut_us),
        us_to_seconds(segmentation.session_total_weight),
        us_to_seconds(segmentation.effective_total_weight)
    ))
}

fn join_values(values: &[f64]) -> String {
    values
        .iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join("-")
}
