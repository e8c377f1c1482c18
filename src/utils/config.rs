//! Configuration and constants for the analyzer.
//!
//! Every marker string, threshold and window used by the pipeline lives in
//! [`AnalysisConfig`], which is passed explicitly into the analysis instead of
//! being read from literals at the call sites. The constants below are only
//! the defaults.

use crate::utils::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Function present in the first top-level call when the session was
/// recorded inside the developer tools harness
pub const DEFAULT_HARNESS_MARKER: &str = "cbWithTimeStamp";

/// Function reached by every top-level call that ticks the engine
pub const DEFAULT_ENGINE_MARKER: &str = "Browser_mainLoop_runner";

/// Mangled prefix shared by the Update / LateUpdate / FixedUpdate instantiations
pub const DEFAULT_UPDATE_PATTERN: &str = "__ZN20BaseBehaviourManager12CommonUpdate";

/// Thread whose profile is analyzed in multi-profile timeline captures
pub const DEFAULT_RENDERER_MARKER: &str = "CrRendererMain";

/// Edge window discarded from each end of a field capture (microseconds)
pub const DEFAULT_TRIM_US: u64 = 5_000_000;

/// Nearest-rank quantile fractions reported for every metric
pub const DEFAULT_QUANTILES: &[f64] = &[0.25, 0.5, 0.75, 0.9];

/// Files above this size are skipped unread
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Summary index file name, written into the input directory by default
pub const DEFAULT_SUMMARY_FILE: &str = "info.txt";

/// Suffix appended to an input file name for its per-file log
pub const LOG_FILE_SUFFIX: &str = ".log.txt";

/// Current JSON summary schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Marker substrings used to classify calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    /// Identifies sessions captured inside the development harness
    pub harness: String,

    /// Identifies top-level calls that reached the engine tick
    pub engine: String,

    /// Identifies the per-tick update entry points to aggregate
    pub update_pattern: String,

    /// Identifies the renderer thread profile in timeline captures
    pub renderer_thread: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            harness: DEFAULT_HARNESS_MARKER.to_string(),
            engine: DEFAULT_ENGINE_MARKER.to_string(),
            update_pattern: DEFAULT_UPDATE_PATTERN.to_string(),
            renderer_thread: DEFAULT_RENDERER_MARKER.to_string(),
        }
    }
}

/// Edge trimming window applied to field captures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimWindow {
    /// Microseconds discarded from the start of the session
    pub start_cut_us: u64,

    /// Microseconds discarded from the end of the session
    pub end_cut_us: u64,
}

impl Default for TrimWindow {
    fn default() -> Self {
        Self::symmetric(DEFAULT_TRIM_US)
    }
}

impl TrimWindow {
    pub fn symmetric(cut_us: u64) -> Self {
        Self {
            start_cut_us: cut_us,
            end_cut_us: cut_us,
        }
    }

    /// Shortest session that can be trimmed
    pub fn minimum_duration(&self) -> u64 {
        self.start_cut_us.saturating_add(self.end_cut_us)
    }
}

/// Complete analysis configuration
///
/// **Public** - built by the CLI (optionally from a TOML file) and passed to
/// every analysis entry point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub markers: MarkerConfig,

    pub trim: TrimWindow,

    /// Quantile fractions, each in `[0, 1)`
    pub quantiles: Vec<f64>,

    /// Size threshold in bytes
    pub max_file_size: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            markers: MarkerConfig::default(),
            trim: TrimWindow::default(),
            quantiles: DEFAULT_QUANTILES.to_vec(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl AnalysisConfig {
    /// Load a configuration from a TOML file
    ///
    /// Missing keys fall back to the defaults.
    ///
    /// # Errors
    /// * `ConfigError::Io` - file cannot be read
    /// * `ConfigError::Toml` - file is not valid TOML for this schema
    /// * `ConfigError::Invalid` - values rejected by [`AnalysisConfig::validate`]
    ///
    /// # Example
    /// ```ignore
    /// let config = AnalysisConfig::load("frame-stats.toml")?;
    /// ```
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AnalysisConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would make the analysis meaningless
    pub fn validate(&self) -> Result<(), ConfigError> {
        let markers = [
            ("markers.harness", &self.markers.harness),
            ("markers.engine", &self.markers.engine),
            ("markers.update_pattern", &self.markers.update_pattern),
            ("markers.renderer_thread", &self.markers.renderer_thread),
        ];
        for (field, value) in markers {
            if value.is_empty() {
                return Err(ConfigError::Invalid(format!("{} cannot be empty", field)));
            }
        }

        if self.quantiles.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one quantile fraction is required".to_string(),
            ));
        }

        if let Some(q) = self
            .quantiles
            .iter()
            .find(|q| !(0.0..1.0).contains(*q))
        {
            return Err(ConfigError::Invalid(format!(
                "quantile fraction {} is outside [0, 1)",
                q
            )));
        }

        if self.max_file_size == 0 {
            return Err(ConfigError::Invalid(
                "max_file_size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Convert a size limit given in MiB to bytes
///
/// # Errors
/// * `ConfigError::Invalid` - the byte count does not fit in a `u64`
pub fn mib_to_bytes(mib: u64) -> Result<u64, ConfigError> {
    mib.checked_mul(1024 * 1024).ok_or_else(|| {
        ConfigError::Invalid(format!("file size limit of {} MiB is too large", mib))
    })
}
