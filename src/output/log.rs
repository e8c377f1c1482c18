//! Per-file analysis log.

use super::summary::prepare_output_path;
use crate::utils::error::OutputError;
use log::{error, info};
use std::path::Path;

/// Human-readable lines produced while analyzing one session
///
/// Every line is mirrored to the process logger as it is added; the file
/// artifact only exists once `write` is called.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionLog {
    lines: Vec<String>,
}

impl SessionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, line: impl Into<String>) {
        let line = line.into();
        info!("{}", line);
        self.lines.push(line);
    }

    pub fn error(&mut self, line: impl Into<String>) {
        let line = line.into();
        error!("{}", line);
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }

    /// Write the log to disk, replacing any previous one
    ///
    /// # Errors
    /// * `OutputError::InvalidPath` - empty path, a directory, or parent not creatable
    /// * `OutputError::WriteFailed` - I/O error during write
    pub fn write(&self, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
        let output_path = output_path.as_ref();
        prepare_output_path(output_path)?;
        std::fs::write(output_path, self.render())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut log = SessionLog::new();
        log.log("first");
        log.error("second");
        log.log(String::from("third"));

        assert_eq!(log.lines(), ["first", "second", "third"]);
        assert_eq!(log.render(), "first\nsecond\nthird");
    }

    #[test]
    fn test_write_replaces_existing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("a.json.log.txt");
        std::fs::write(&path, "stale content that is longer").unwrap();

        let mut log = SessionLog::new();
        log.log("fresh");
        log.write(&path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fresh");
    }
}
