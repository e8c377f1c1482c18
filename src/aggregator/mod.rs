//! Frame segmentation and statistical aggregation.
//!
//! This module turns a session's flame chart into:
//! - Engine-frame records (top-level intervals that ticked the engine)
//! - Per-frame inclusive time of each update function
//! - Nearest-rank quantile reports and a session summary

pub mod markers;
pub mod metrics;
pub mod quantile;
pub mod segmenter;
pub mod weights;

// Re-export main types and functions
pub use markers::contains_marker;
pub use metrics::{build_metric_reports, metric_keys, summarize_session, MetricReport, SessionSummary};
pub use quantile::quantiles;
pub use segmenter::{is_captured_in_harness, segment_frames, EngineFrame, Segmentation, EXECUTE_KEY, INTERVAL_KEY};
pub use weights::aggregate_by_name;
