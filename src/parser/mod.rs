//! Trace import and the call tree model.
//!
//! This module handles:
//! - Parsing `.cpuprofile` captures from the JavaScript profiler
//! - Parsing `.json` performance timeline captures
//! - Building time-ordered call trees from both
//! - Selecting the profile to analyze

pub mod call_tree;
pub mod cpuprofile;
pub mod import;
pub mod schema;
pub mod timeline;

// Re-export main types
pub use call_tree::CallTreeBuilder;
pub use import::{import_profile_group, select_target_profile, CaptureFormat};
pub use schema::{CallNode, Profile, ProfileGroup};
