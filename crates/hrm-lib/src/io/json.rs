use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::metrics::summary::MetricsReport;

/// Output path for a strip's metrics: the input path with its extension
/// swapped for `.json`.
pub fn metrics_path_for(input: &Path) -> PathBuf {
    input.with_extension("json")
}

/// The persistable JSON document for one report.
pub fn metrics_document(report: &MetricsReport) -> Value {
    let metrics = report.metrics();
    serde_json::json!({
        "voltage_extremes": [metrics.voltage_extremes.0, metrics.voltage_extremes.1],
        "duration": metrics.duration,
        "window": [metrics.window.start, metrics.window.end],
        "beats": metrics.beats,
        "num_beats": metrics.num_beats,
        "mean_hr_bpm": metrics.mean_hr_bpm,
        "is_valid": report.is_valid(),
    })
}

/// Write a report's metrics document, refusing flagged reports.
pub fn write_metrics(report: &MetricsReport, path: &Path) -> Result<()> {
    if !report.is_valid() {
        let reasons: Vec<String> = report.flags().iter().map(|f| format!("{f:?}")).collect();
        bail!(
            "refusing to write {}: report flagged for review ({})",
            path.display(),
            reasons.join(", ")
        );
    }
    let file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, &metrics_document(report))
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
