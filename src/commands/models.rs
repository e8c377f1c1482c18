use crate::utils::config::AnalysisConfig;
use anyhow::Result;
use std::path::PathBuf;

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone, Default)]
pub struct BatchArgs {
    /// Directories whose captures are analyzed, in the given order
    pub input_dirs: Vec<PathBuf>,

    /// Where per-file logs go (None = next to each input file)
    pub output_dir: Option<PathBuf>,

    /// Summary index path (None = `info.txt` inside each input directory)
    pub summary_path: Option<PathBuf>,

    /// Optional JSON summary covering every analyzed session
    pub json_summary: Option<PathBuf>,

    /// Markers, trim window, quantiles and size limit
    pub config: AnalysisConfig,
}

/// Validate analyze arguments
///
/// **Public** - can be called before run_batch for early validation
///
/// # Arguments
/// * `args` - Arguments to validate
///
/// # Returns
/// Ok if arguments are valid, Err with message if not
pub fn validate_args(args: &BatchArgs) -> Result<()> {
    if args.input_dirs.is_empty() {
        anyhow::bail!("At least one input directory is required");
    }

    // One index per directory, so an explicit path only makes sense for one
    if args.summary_path.is_some() && args.input_dirs.len() > 1 {
        anyhow::bail!("--summary can only be used with a single input directory");
    }

    if let Some(dir) = &args.output_dir {
        if dir.is_file() {
            anyhow::bail!("Output directory is a file: {}", dir.display());
        }
    }

    args.config.validate()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_for(dirs: &[&str]) -> BatchArgs {
        BatchArgs {
            input_dirs: dirs.iter().map(PathBuf::from).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_args_valid() {
        assert!(validate_args(&args_for(&["captures"])).is_ok());
    }

    #[test]
    fn test_validate_args_no_input() {
        assert!(validate_args(&args_for(&[])).is_err());
    }

    #[test]
    fn test_validate_args_summary_with_many_dirs() {
        let args = BatchArgs {
            summary_path: Some(PathBuf::from("info.txt")),
            ..args_for(&["a", "b"])
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_output_dir_is_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let args = BatchArgs {
            output_dir: Some(file.path().to_path_buf()),
            ..args_for(&["captures"])
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_rejects_bad_config() {
        let mut args = args_for(&["captures"]);
        args.config.quantiles = vec![1.0];
        assert!(validate_args(&args).is_err());
    }
}
