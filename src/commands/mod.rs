//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod analyze;
pub mod discovery;
pub mod models;
pub mod utils;

// Re-export main command functions
pub use analyze::{analyze_session, run_batch, BatchResult, SessionOutcome};
pub use discovery::{discover_files, sort_key};
pub use models::{validate_args, BatchArgs};
pub use utils::{display_profiles, display_version};
