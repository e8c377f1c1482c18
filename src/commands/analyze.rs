//! Analyze command implementation.
//!
//! For every capture of every input directory:
//! 1. Skips files over the size limit or with an unknown suffix
//! 2. Imports the capture and selects the target profile
//! 3. Builds the flame chart and segments engine-frames
//! 4. Computes metric quantiles and the session summary
//! 5. Writes `<file>.log.txt` and rewrites the summary index

use super::discovery::{discover_files, file_name_of};
use super::models::{validate_args, BatchArgs};
use crate::aggregator::{
    build_metric_reports, is_captured_in_harness, segment_frames, summarize_session,
    MetricReport, SessionSummary,
};
use crate::flamechart::FlameChart;
use crate::output::{
    render_metric, render_summary, render_trim, write_batch_summary, write_summary_index,
    BatchSummary, SessionLog,
};
use crate::parser::{import_profile_group, select_target_profile, CaptureFormat};
use crate::utils::config::{AnalysisConfig, DEFAULT_SUMMARY_FILE, LOG_FILE_SUFFIX};
use crate::utils::error::{AnalysisError, ImportError};
use anyhow::{Context, Result};
use log::{debug, error, info};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Everything produced by analyzing one capture
#[derive(Debug)]
pub struct SessionOutcome {
    /// Lines destined for `<file>.log.txt`
    pub log: SessionLog,

    /// One report per metric key; empty when the analysis failed
    pub reports: Vec<MetricReport>,

    pub summary: Option<SessionSummary>,

    pub error: Option<AnalysisError>,
}

impl SessionOutcome {
    /// Whether the file belongs in the summary index
    ///
    /// Handled failures still produced a meaningful log; only unexpected
    /// ones are left out.
    pub fn is_indexed(&self) -> bool {
        !matches!(self.error, Some(AnalysisError::Unexpected(_)))
    }
}

/// Totals of a batch run
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Files listed in a summary index, in processing order
    pub indexed: Vec<String>,

    /// Files skipped for size or suffix
    pub skipped: Vec<String>,

    /// Files whose analysis or output failed, with the failure kind
    pub failures: Vec<(String, String)>,

    /// Summaries of the sessions analyzed to completion
    pub sessions: Vec<SessionSummary>,
}

/// Analyze one capture held in memory
///
/// **Public** - pure and deterministic; performs no I/O beyond logging
///
/// # Arguments
/// * `file_name` - capture file name; its suffix selects the importer
/// * `data` - raw file contents
/// * `config` - markers, trim window and quantile fractions
///
/// # Returns
/// The session log plus reports and summary, or the error that stopped the
/// analysis. Errors are also recorded in the log.
///
/// # Example
/// ```ignore
/// let bytes = std::fs::read("captures/dev-b1-run1.json")?;
/// let outcome = analyze_session("dev-b1-run1.json", &bytes, &AnalysisConfig::default());
/// println!("{}", outcome.log.render());
/// ```
pub fn analyze_session(file_name: &str, data: &[u8], config: &AnalysisConfig) -> SessionOutcome {
    let mut log = SessionLog::new();

    match isolate_panics(|| analyze_into_log(file_name, data, config, &mut log)) {
        Ok((reports, summary)) => SessionOutcome {
            log,
            reports,
            summary: Some(summary),
            error: None,
        },
        Err(err) => {
            log.error(format!("{}: {}: {}", file_name, err.kind(), err));
            SessionOutcome {
                log,
                reports: Vec::new(),
                summary: None,
                error: Some(err),
            }
        }
    }
}

/// Run one file's analysis, turning a panic into `AnalysisError::Unexpected`
///
/// **Private** - keeps one bad capture from ending the batch
fn isolate_panics<T>(
    analysis: impl FnOnce() -> Result<T, AnalysisError>,
) -> Result<T, AnalysisError> {
    panic::catch_unwind(AssertUnwindSafe(analysis)).unwrap_or_else(|payload| {
        let detail = payload
            .downcast_ref::<&str>()
            .map(|msg| msg.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic with a non-string payload".to_string());
        Err(AnalysisError::Unexpected(detail))
    })
}

/// **Private** - the analysis pipeline proper
fn analyze_into_log(
    file_name: &str,
    data: &[u8],
    config: &AnalysisConfig,
    log: &mut SessionLog,
) -> Result<(Vec<MetricReport>, SessionSummary), AnalysisError> {
    let import_failure = |source: ImportError| AnalysisError::ImportFailure {
        file: file_name.to_string(),
        source,
    };

    let format = CaptureFormat::from_file_name(file_name)
        .ok_or_else(|| import_failure(ImportError::UnsupportedFormat(file_name.to_string())))?;
    let group = import_profile_group(file_name, data).map_err(import_failure)?;

    let selector = match format {
        CaptureFormat::Timeline => config.markers.renderer_thread.as_str(),
        CaptureFormat::CpuProfile => "profile 0",
    };
    let profile = select_target_profile(&group, format, selector).ok_or_else(|| {
        AnalysisError::MissingTargetProfile {
            file: file_name.to_string(),
            selector: selector.to_string(),
        }
    })?;
    debug!("Selected profile '{}' of {}", profile.name, group.name);

    let chart = FlameChart::from_profile(profile);
    let in_harness = is_captured_in_harness(chart.top_level(), &config.markers.harness);
    log.log(format!(
        "capture mode: {}",
        if in_harness { "harness" } else { "field" }
    ));

    let segmentation = segment_frames(chart.top_level(), chart.total_weight(), in_harness, config)?;
    if let Some(line) = render_trim(&segmentation, config.trim.start_cut_us, config.trim.end_cut_us) {
        log.log(line);
    }

    let reports = build_metric_reports(&segmentation, &config.quantiles)?;
    for report in &reports {
        for line in render_metric(report) {
            log.log(line);
        }
    }

    let summary = summarize_session(file_name, &segmentation);
    for line in render_summary(&summary) {
        log.log(line);
    }

    Ok((reports, summary))
}

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
///
/// # Returns
/// Totals over every input directory
///
/// # Errors
/// * invalid arguments
/// * an input directory that cannot be listed
/// * the JSON summary cannot be written
///
/// Per-file failures are logged and never returned.
pub fn run_batch(args: &BatchArgs) -> Result<BatchResult> {
    let start_time = Instant::now();
    validate_args(args)?;

    let mut result = BatchResult::default();
    for dir in &args.input_dirs {
        process_directory(dir, args, &mut result)?;
    }

    if let Some(path) = &args.json_summary {
        let dirs = args
            .input_dirs
            .iter()
            .map(|dir| dir.display().to_string())
            .collect();
        let summary = BatchSummary::new(dirs, result.sessions.clone());
        write_batch_summary(&summary, path).context("Failed to write JSON summary")?;
        info!("✓ JSON summary written to: {}", path.display());
    }

    info!(
        "Batch completed in {:.2}s: {} indexed, {} skipped, {} failed",
        start_time.elapsed().as_secs_f64(),
        result.indexed.len(),
        result.skipped.len(),
        result.failures.len()
    );

    Ok(result)
}

enum FileOutcome {
    Skipped(String),
    Analyzed(SessionOutcome),
}

/// **Private** - one directory, one summary index
fn process_directory(dir: &Path, args: &BatchArgs, result: &mut BatchResult) -> Result<()> {
    let files = discover_files(dir)
        .with_context(|| format!("Failed to list input directory {}", dir.display()))?;
    let index_path = args
        .summary_path
        .clone()
        .unwrap_or_else(|| dir.join(DEFAULT_SUMMARY_FILE));

    info!("Processing {} file(s) from {}", files.len(), dir.display());

    let mut indexed: Vec<String> = Vec::new();
    for path in files {
        if path == index_path {
            continue;
        }

        let file_name = file_name_of(&path);
        info!("======= {} =======", path.display());

        match process_file(&path, &file_name, args) {
            Ok(FileOutcome::Skipped(reason)) => {
                info!("Skipping {}: {}", file_name, reason);
                result.skipped.push(file_name);
                continue;
            }
            Ok(FileOutcome::Analyzed(outcome)) => {
                if let Some(err) = &outcome.error {
                    result.failures.push((file_name.clone(), err.kind().to_string()));
                }
                if outcome.is_indexed() {
                    indexed.push(file_name.clone());
                    result.indexed.push(file_name);
                }
                if let Some(summary) = outcome.summary {
                    result.sessions.push(summary);
                }
            }
            Err(err) => {
                error!("{}: {:#}", file_name, err);
                result.failures.push((file_name, "Io".to_string()));
            }
        }

        if let Err(err) = write_summary_index(&indexed, &index_path) {
            error!("Failed to rewrite summary index {}: {}", index_path.display(), err);
        }
    }

    Ok(())
}

/// **Private** - skip checks, analysis and log output for one file
fn process_file(path: &Path, file_name: &str, args: &BatchArgs) -> Result<FileOutcome> {
    if CaptureFormat::from_file_name(file_name).is_none() {
        return Ok(FileOutcome::Skipped("unrecognized suffix".to_string()));
    }

    let size = std::fs::metadata(path)
        .with_context(|| format!("Failed to stat {}", path.display()))?
        .len();
    if size > args.config.max_file_size {
        return Ok(FileOutcome::Skipped(format!(
            "{} bytes exceeds the {} byte limit",
            size, args.config.max_file_size
        )));
    }

    let data = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let outcome = analyze_session(file_name, &data, &args.config);

    let log_path = log_path_for(path, file_name, args.output_dir.as_deref());
    outcome
        .log
        .write(&log_path)
        .with_context(|| format!("Failed to write log {}", log_path.display()))?;
    debug!("Log written to {}", log_path.display());

    Ok(FileOutcome::Analyzed(outcome))
}

/// `<file>.log.txt`, next to the input or inside `output_dir`
pub fn log_path_for(input: &Path, file_name: &str, output_dir: Option<&Path>) -> PathBuf {
    match output_dir {
        Some(dir) => dir.join(format!("{}{}", file_name, LOG_FILE_SUFFIX)),
        None => {
            let mut path = input.as_os_str().to_owned();
            path.push(LOG_FILE_SUFFIX);
            PathBuf::from(path)
        }
    }
}
