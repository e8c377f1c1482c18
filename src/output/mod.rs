//! Output writers for analysis results.
//!
//! This module handles writing results to disk:
//! - Per-file text logs
//! - The summary index, rewritten after every file
//! - Optional JSON batch summaries

pub mod log;
pub mod report;
pub mod summary;

// Re-export main functions
pub use self::log::SessionLog;
pub use report::{render_metric, render_summary, render_trim};
pub use summary::{read_batch_summary, write_batch_summary, write_summary_index, BatchSummary};
