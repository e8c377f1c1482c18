//! Flame-chart layering of call trees.
//!
//! Converts a profile's call tree into per-depth interval layers. Layer 0,
//! the top-level timeline, is what the frame segmenter partitions.

pub mod layers;

// Re-export main types
pub use layers::{ChartInterval, FlameChart};
