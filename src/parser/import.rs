//! Capture format dispatch and target profile selection.

use super::cpuprofile::parse_cpuprofile;
use super::schema::{Profile, ProfileGroup};
use super::timeline::parse_timeline;
use crate::utils::error::ImportError;
use log::debug;

/// Recognized capture formats, distinguished by file name suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureFormat {
    /// DevTools performance timeline: many threads, one profile each
    Timeline,
    /// DevTools JavaScript profiler: a single profile
    CpuProfile,
}

impl CaptureFormat {
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        if file_name.ends_with(".cpuprofile") {
            Some(CaptureFormat::CpuProfile)
        } else if file_name.ends_with(".json") {
            Some(CaptureFormat::Timeline)
        } else {
            None
        }
    }
}

/// Import a capture file into its profile group
///
/// **Public** - main entry point for import
///
/// # Errors
/// * `ImportError::UnsupportedFormat` - unknown file suffix
/// * any error of the format-specific parser
pub fn import_profile_group(file_name: &str, data: &[u8]) -> Result<ProfileGroup, ImportError> {
    let format = CaptureFormat::from_file_name(file_name)
        .ok_or_else(|| ImportError::UnsupportedFormat(file_name.to_string()))?;

    debug!("Importing {} as {:?} ({} bytes)", file_name, format, data.len());

    match format {
        CaptureFormat::Timeline => parse_timeline(file_name, data),
        CaptureFormat::CpuProfile => parse_cpuprofile(file_name, data),
    }
}

/// Pick the profile to analyze from an imported group
///
/// Timelines use the first profile whose name contains `renderer_marker`;
/// CPU profiles always use their only profile.
pub fn select_target_profile<'a>(
    group: &'a ProfileGroup,
    format: CaptureFormat,
    renderer_marker: &str,
) -> Option<&'a Profile> {
    match format {
        CaptureFormat::Timeline => group
            .profiles
            .iter()
            .find(|p| p.name.contains(renderer_marker)),
        CaptureFormat::CpuProfile => group.profiles.first(),
    }
}
