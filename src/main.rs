//! Engine Frame Stats CLI
//!
//! Batch analysis of browser execution traces: per-frame update timings,
//! frame-time quantiles and engine load for every capture in a directory.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use engine_frame_stats::commands::{display_profiles, display_version, run_batch, BatchArgs};
use engine_frame_stats::utils::config::{mib_to_bytes, AnalysisConfig, TrimWindow};

/// Engine Frame Stats - frame timing statistics from browser traces
#[derive(Parser, Debug)]
#[command(name = "frame-stats")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze every capture in one or more directories
    Analyze {
        /// Directories holding `.json` timelines and `.cpuprofile` captures
        #[arg(required = true)]
        dirs: Vec<PathBuf>,

        /// Write per-file logs here instead of next to each capture
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Summary index path (defaults to info.txt in the input directory)
        #[arg(short, long)]
        summary: Option<PathBuf>,

        /// Also write a JSON summary of every session
        #[arg(long)]
        json_summary: Option<PathBuf>,

        /// TOML file with markers, trim window and quantiles
        #[arg(short, long, env = "FRAME_STATS_CONFIG")]
        config: Option<PathBuf>,

        /// Skip captures larger than this many MiB
        #[arg(long)]
        max_file_size_mb: Option<u64>,

        /// Quantile fractions, comma separated (e.g. 0.25,0.5,0.75,0.9)
        #[arg(long, value_delimiter = ',')]
        quantiles: Option<Vec<f64>>,

        /// Microseconds trimmed from each end of field captures
        #[arg(long)]
        trim_us: Option<u64>,
    },

    /// List the profiles contained in a capture
    Profiles {
        /// Path to a `.json` or `.cpuprofile` capture
        file: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Analyze {
            dirs,
            output_dir,
            summary,
            json_summary,
            config,
            max_file_size_mb,
            quantiles,
            trim_us,
        } => {
            // File first, then flags on top
            let mut analysis = match config {
                Some(path) => AnalysisConfig::load(&path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => AnalysisConfig::default(),
            };

            if let Some(mb) = max_file_size_mb {
                analysis.max_file_size =
                    mib_to_bytes(mb).context("Invalid --max-file-size-mb")?;
            }
            if let Some(fractions) = quantiles {
                analysis.quantiles = fractions;
            }
            if let Some(cut) = trim_us {
                analysis.trim = TrimWindow::symmetric(cut);
            }

            let args = BatchArgs {
                input_dirs: dirs,
                output_dir,
                summary_path: summary,
                json_summary,
                config: analysis,
            };

            let result = run_batch(&args)?;
            if !result.failures.is_empty() {
                log::warn!("{} file(s) failed:", result.failures.len());
                for (file, kind) in &result.failures {
                    log::warn!("  {} ({})", file, kind);
                }
            }
        }

        Commands::Profiles { file } => {
            display_profiles(&file)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
