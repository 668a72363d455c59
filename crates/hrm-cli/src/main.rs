use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hrm_lib::{
    detectors::qrs::{analyze_recording, QrsDetectorConfig},
    error::PipelineError,
    io::{csv as csv_io, json as json_io},
    preprocess,
    signal::{AnalysisWindow, Recording},
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "hrm",
    version,
    about = "HRM: heart-rate metrics from two-column ECG strips"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one ECG strip and write its metrics JSON next to it
    Analyze {
        /// Two-column CSV: time (s), voltage (mV), no header row
        input: PathBuf,
        /// Start of the mean-heart-rate window in seconds
        #[arg(long, requires = "window_end")]
        window_start: Option<f64>,
        /// End of the mean-heart-rate window in seconds
        #[arg(long, requires = "window_start")]
        window_end: Option<f64>,
        /// Where to write the metrics JSON (default: input with .json)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Analyze every .csv strip in a directory, continuing past failures
    Batch {
        dir: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze {
            input,
            window_start,
            window_end,
            out,
        } => cmd_analyze(&input, window_start.zip(window_end), out.as_deref())?,
        Commands::Batch { dir } => cmd_batch(&dir)?,
    }
    Ok(())
}

fn cmd_analyze(input: &Path, window: Option<(f64, f64)>, out: Option<&Path>) -> Result<()> {
    let (time, voltage) = csv_io::read_two_column_csv(input)?;
    let recording = preprocess::sanitize(&time, &voltage)
        .with_context(|| format!("sanitizing {}", input.display()))?;
    let window = resolve_or_fall_back(&recording, window)?;
    let report = analyze_recording(&recording, &window, &QrsDetectorConfig::default());

    let out_path = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| json_io::metrics_path_for(input));
    match json_io::write_metrics(&report, &out_path) {
        Ok(()) => log::info!("wrote {}", out_path.display()),
        Err(err) => log::warn!("{err:#}"),
    }
    println!("{}", serde_json::to_string(&json_io::metrics_document(&report))?);
    Ok(())
}

/// Resolve the requested window, falling back to the full strip when the
/// request is rejected. The fallback is a warning, not a failure.
fn resolve_or_fall_back(
    recording: &Recording,
    requested: Option<(f64, f64)>,
) -> Result<AnalysisWindow> {
    match preprocess::resolve_window(recording, requested) {
        Ok(window) => Ok(window),
        Err(err @ PipelineError::InvalidWindow { .. }) => {
            log::warn!("{err}; falling back to the full recording");
            Ok(preprocess::resolve_window(recording, None)?)
        }
        Err(err) => Err(err.into()),
    }
}

fn cmd_batch(dir: &Path) -> Result<()> {
    let mut strips = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            strips.push(path);
        }
    }
    strips.sort();
    if strips.is_empty() {
        log::warn!("no .csv strips in {}", dir.display());
    }
    for path in strips {
        if let Err(err) = cmd_analyze(&path, None, None) {
            log::error!("{}: {err:#}", path.display());
        }
    }
    Ok(())
}
