use crate::flamechart::FlameChart;
use crate::parser::import_profile_group;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::{Context, Result};
use std::path::Path;

use super::discovery::file_name_of;

/// List the profiles contained in a capture
pub fn display_profiles(file_path: &Path) -> Result<()> {
    let data = std::fs::read(file_path)
        .with_context(|| format!("Failed to read {}", file_path.display()))?;
    let file_name = file_name_of(file_path);

    let group = import_profile_group(&file_name, &data)
        .with_context(|| format!("Failed to import {}", file_path.display()))?;

    println!("Capture: {}", file_path.display());
    println!("Profiles: {}", group.profiles.len());

    for (i, profile) in group.profiles.iter().enumerate() {
        let chart = FlameChart::from_profile(profile);
        println!(
            "  {}. {}  duration {}, {} top-level call(s), depth {}",
            i,
            profile.name,
            profile.format_value(profile.total_weight()),
            chart.top_level().len(),
            chart.layers().len()
        );
    }

    Ok(())
}

/// Display version information
pub fn display_version() {
    println!("Engine Frame Stats v{}", env!("CARGO_PKG_VERSION"));
    println!("Summary Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Frame timing statistics for engine builds captured in browser traces.");
}
