//! Engine-frame segmentation of a session's top-level timeline.
//!
//! Every top-level interval is one task run by the browser main thread. The
//! ones that reach the engine's main loop callback are engine-frames; the
//! others (input, GC, compositor work) are skipped but still delimit the
//! frame that precedes them.
//!
//! Field captures lose a fixed window at both ends before segmentation;
//! harness captures are used as recorded.

use super::markers::contains_marker;
use super::weights::aggregate_by_name;
use crate::flamechart::ChartInterval;
use crate::utils::config::AnalysisConfig;
use crate::utils::error::AnalysisError;
use log::{debug, info};
use std::collections::BTreeMap;

/// Reserved metric key: time spent inside the frame
pub const EXECUTE_KEY: &str = "execute";

/// Reserved metric key: time until the next top-level interval starts
pub const INTERVAL_KEY: &str = "interval";

/// One qualifying top-level interval
///
/// **Public** - consumed by the statistics reporter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineFrame {
    /// Interval start (microseconds)
    pub start_time: u64,

    /// Interval end (microseconds)
    pub end_time: u64,

    /// Start of the following retained interval, or the session end
    pub next_start_time: u64,

    /// Inclusive microseconds per update function label
    pub info: BTreeMap<String, u64>,
}

impl EngineFrame {
    pub fn execute(&self) -> u64 {
        self.end_time - self.start_time
    }

    pub fn interval(&self) -> u64 {
        self.next_start_time - self.start_time
    }

    /// Per-frame sample for a metric key
    ///
    /// Reserved keys are always computed, even if a function happens to carry
    /// the same name. Labels absent from this frame count as 0.
    pub fn metric(&self, key: &str) -> u64 {
        match key {
            EXECUTE_KEY => self.execute(),
            INTERVAL_KEY => self.interval(),
            _ => self.info.get(key).copied().unwrap_or(0),
        }
    }
}

/// Result of segmenting one session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segmentation {
    /// Engine-frames in temporal order
    pub frames: Vec<EngineFrame>,

    /// Summed inclusive duration of all engine-frames (microseconds)
    pub engine_total_weight: u64,

    /// Number of engine-frames
    pub engine_call_count: u64,

    /// Span of the retained timeline (microseconds)
    pub effective_total_weight: u64,

    /// Untrimmed session duration (microseconds)
    pub session_total_weight: u64,

    /// True when edge trimming was applied
    pub trimmed: bool,

    /// Top-level intervals that survived trimming
    pub retained_intervals: usize,
}

/// Check whether the session was recorded inside the development harness
///
/// **Public** - only the first top-level interval is inspected
pub fn is_captured_in_harness(top_level: &[ChartInterval<'_>], harness_marker: &str) -> bool {
    top_level
        .first()
        .is_some_and(|first| contains_marker(first.node, harness_marker))
}

/// Partition the top-level timeline into engine-frames
///
/// **Public** - main entry point of the segmentation stage
///
/// # Arguments
/// * `top_level` - layer 0 of the session's flame chart, in time order
/// * `total_duration` - session length (microseconds)
/// * `captured_in_harness` - disables trimming when true
/// * `config` - trim window and marker strings
///
/// # Errors
/// * `AnalysisError::InsufficientDuration` - a field capture shorter than
///   the combined trim window; no frames are produced
pub fn segment_frames(
    top_level: &[ChartInterval<'_>],
    total_duration: u64,
    captured_in_harness: bool,
    config: &AnalysisConfig,
) -> Result<Segmentation, AnalysisError> {
    let trim = config.trim;
    let markers = &config.markers;

    let (retained, effective_total_weight, trimmed) = if captured_in_harness {
        (top_level.to_vec(), total_duration, false)
    } else {
        if total_duration < trim.minimum_duration() {
            return Err(AnalysisError::InsufficientDuration {
                total_us: total_duration,
                required_us: trim.minimum_duration(),
            });
        }

        let start_limit = trim.start_cut_us;
        let end_limit = total_duration - trim.end_cut_us;
        let retained: Vec<ChartInterval<'_>> = top_level
            .iter()
            .filter(|interval| interval.end >= start_limit && interval.start <= end_limit)
            .copied()
            .collect();

        let effective = match (retained.first(), retained.last()) {
            (Some(first), Some(last)) => last.end.saturating_sub(first.start),
            _ => 0,
        };

        info!(
            "Trimmed {}us from the start and {}us from the end: {} -> {} top-level intervals",
            trim.start_cut_us,
            trim.end_cut_us,
            top_level.len(),
            retained.len()
        );

        (retained, effective, true)
    };

    let mut segmentation = Segmentation {
        effective_total_weight,
        session_total_weight: total_duration,
        trimmed,
        retained_intervals: retained.len(),
        ..Default::default()
    };

    for (i, interval) in retained.iter().enumerate() {
        if !contains_marker(interval.node, &markers.engine) {
            continue;
        }

        let next_start_time = retained
            .get(i + 1)
            .map_or(total_duration, |next| next.start)
            .max(interval.end);

        segmentation.frames.push(EngineFrame {
            start_time: interval.start,
            end_time: interval.end,
            next_start_time,
            info: aggregate_by_name(interval.node, &markers.update_pattern),
        });
        segmentation.engine_total_weight += interval.node.duration;
        segmentation.engine_call_count += 1;
    }

    debug!(
        "Segmented {} engine-frame(s) out of {} retained intervals",
        segmentation.engine_call_count,
        segmentation.retained_intervals
    );

    Ok(segmentation)
}
