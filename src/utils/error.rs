//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while importing a trace file
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid trace format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported capture format: {0}")]
    UnsupportedFormat(String),
}

/// Errors raised by the quantile calculator
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum QuantileError {
    #[error("cannot compute quantiles of an empty sample set")]
    EmptyInput,

    #[error("quantile fraction {0} is outside [0, 1)")]
    InvalidFraction(f64),
}

/// Per-file analysis failures
///
/// None of these abort a batch: they are caught at the file boundary,
/// written to the file's log and the run moves on.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("failed to import {file}: {source}")]
    ImportFailure {
        file: String,
        #[source]
        source: ImportError,
    },

    #[error("{file} parsed, but no profile matched '{selector}'")]
    MissingTargetProfile { file: String, selector: String },

    #[error("session too short to trim: {total_us}us < {required_us}us")]
    InsufficientDuration { total_us: u64, required_us: u64 },

    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl AnalysisError {
    /// Stable kind name used in log lines
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::ImportFailure { .. } => "ImportFailure",
            AnalysisError::MissingTargetProfile { .. } => "MissingTargetProfile",
            AnalysisError::InsufficientDuration { .. } => "InsufficientDuration",
            AnalysisError::Unexpected(_) => "UnexpectedException",
        }
    }
}

impl From<QuantileError> for AnalysisError {
    fn from(err: QuantileError) -> Self {
        AnalysisError::Unexpected(err.to_string())
    }
}

/// Errors that can occur while loading the analysis configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
