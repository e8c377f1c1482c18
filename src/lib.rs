//! Engine Frame Stats
//!
//! Engine-frame segmentation and percentile latency statistics for
//! browser execution traces of engine builds.
//!
//! This crate provides the core implementation for the
//! `frame-stats` CLI tool:
//! - `parser` imports DevTools timelines and `.cpuprofile` captures
//! - `flamechart` layers a profile's calls by depth
//! - `aggregator` segments engine-frames and computes quantiles
//! - `output` writes per-file logs, the summary index and JSON summaries
//! - `commands` drives batch runs over capture directories
//!
//! ## Getting Started
//!
//! ```bash
//! frame-stats analyze ./captures
//! frame-stats --help
//! ```

pub mod aggregator;
pub mod commands;
pub mod flamechart;
pub mod output;
pub mod parser;
pub mod utils;
