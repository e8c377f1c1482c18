//! Cross-file outputs: the summary index and the JSON batch summary.
//!
//! The summary index is rewritten in full after every file, so a run that
//! dies mid-batch still leaves an index listing exactly the files finished.

use crate::aggregator::SessionSummary;
use crate::utils::config::SCHEMA_VERSION;
use crate::utils::error::OutputError;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// JSON document written by `analyze --json-summary`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Schema version for compatibility checking
    pub version: String,

    /// Directories the sessions were read from
    pub input_dirs: Vec<String>,

    /// One entry per analyzed session, in processing order
    pub sessions: Vec<SessionSummary>,

    /// Timestamp when the summary was generated
    pub generated_at: String,
}

impl BatchSummary {
    pub fn new(input_dirs: Vec<String>, sessions: Vec<SessionSummary>) -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            input_dirs,
            sessions,
            generated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Rewrite the summary index
///
/// **Public** - called after every file of a batch
///
/// # Arguments
/// * `file_names` - processed files, one per line, in processing order
/// * `output_path` - index file
pub fn write_summary_index(
    file_names: &[String],
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();
    prepare_output_path(output_path)?;

    std::fs::write(output_path, file_names.join("\n"))?;
    debug!(
        "Summary index {} now lists {} file(s)",
        output_path.display(),
        file_names.len()
    );
    Ok(())
}

/// Write the batch summary as pretty JSON
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_batch_summary(
    summary: &BatchSummary,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing batch summary to: {}", output_path.display());
    prepare_output_path(output_path)?;

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer_pretty(writer, summary).map_err(OutputError::SerializationFailed)?;

    Ok(())
}

/// Read a batch summary back
///
/// **Public** - useful for validation and testing
pub fn read_batch_summary(input_path: impl AsRef<Path>) -> Result<BatchSummary, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading batch summary from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;
    let summary: BatchSummary =
        serde_json::from_reader(file).map_err(OutputError::SerializationFailed)?;

    Ok(summary)
}

/// Validate an output path and create its parent directories
///
/// **Internal** - shared by every writer in this module tree
pub(crate) fn prepare_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_summary() -> BatchSummary {
        BatchSummary::new(
            vec!["/captures".to_string()],
            vec![SessionSummary {
                file_name: "a-b-c.json".to_string(),
                duration_seconds: 10.0,
                engine_seconds: 2.5,
                engine_call_count: 600,
                engine_ratio: None,
            }],
        )
    }

    #[test]
    fn test_write_and_read_batch_summary() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("summary.json");

        let summary = create_test_summary();
        write_batch_summary(&summary, &path).unwrap();

        let loaded = read_batch_summary(&path).unwrap();
        assert_eq!(loaded.version, SCHEMA_VERSION);
        assert_eq!(loaded.sessions, summary.sessions);
    }

    #[test]
    fn test_summary_index_is_rewritten() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("info.txt");

        write_summary_index(&["a.json".to_string()], &path).unwrap();
        write_summary_index(&["a.json".to_string(), "b.cpuprofile".to_string()], &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a.json\nb.cpuprofile");
    }

    #[test]
    fn test_prepare_output_path_rejects_empty_and_directories() {
        assert!(prepare_output_path(Path::new("")).is_err());

        let temp_dir = tempfile::tempdir().unwrap();
        assert!(prepare_output_path(temp_dir.path()).is_err());
    }

    #[test]
    fn test_prepare_output_path_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested = temp_dir.path().join("nested/dirs/info.txt");
        prepare_output_path(&nested).unwrap();
        assert!(nested.parent().unwrap().exists());
    }
}
