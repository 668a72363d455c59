//! Thresholding QRS detector.
//!
//! Segments the voltage trace into above-threshold runs and takes the
//! voltage maximum of each run as that beat's timestamp.

use crate::metrics::summary::{summarize, MetricsReport};
use crate::signal::{AnalysisWindow, Beats, Recording};

/// Configurable parameters for the thresholding beat detector.
#[derive(Debug, Clone, Copy)]
pub struct QrsDetectorConfig {
    /// Fraction of the global voltage peak used as the detection threshold.
    pub threshold_fraction: f64,
    /// Sample-index gap above which two above-threshold runs belong to
    /// separate beats.
    pub max_run_gap: usize,
}

impl Default for QrsDetectorConfig {
    fn default() -> Self {
        Self {
            threshold_fraction: 0.75,
            max_run_gap: 2,
        }
    }
}

/// Detect QRS peaks with the default configuration.
pub fn detect_beats(recording: &Recording) -> Beats {
    detect_beats_with_config(recording, &QrsDetectorConfig::default())
}

/// Detect QRS peaks in a sanitized recording.
///
/// The fixed-fraction threshold assumes a clean strip in which the QRS
/// complex dominates the trace; it is not an adaptive detector and will
/// mislabel noisy or baseline-wandering input. A strip with no sample
/// above threshold (flat or inverted lead) yields zero beats.
pub fn detect_beats_with_config(recording: &Recording, cfg: &QrsDetectorConfig) -> Beats {
    let voltage = &recording.voltage;
    let threshold = detection_threshold(voltage, cfg.threshold_fraction);
    let above = indices_above(voltage, threshold);
    if above.is_empty() {
        return Beats::default();
    }
    let closing = run_closing_indices(&above, cfg.max_run_gap);
    let peaks = locate_run_peaks(voltage, &closing);
    Beats::from_times(peaks.into_iter().map(|i| recording.time[i]).collect())
}

/// Run detection over a sanitized recording and fold the results into a
/// quality-checked metrics report.
pub fn analyze_recording(
    recording: &Recording,
    window: &AnalysisWindow,
    cfg: &QrsDetectorConfig,
) -> MetricsReport {
    let beats = detect_beats_with_config(recording, cfg);
    summarize(recording, window, beats)
}

fn detection_threshold(voltage: &[f64], fraction: f64) -> f64 {
    let max = voltage.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    fraction * max
}

fn indices_above(voltage: &[f64], threshold: f64) -> Vec<usize> {
    voltage
        .iter()
        .enumerate()
        .filter(|(_, &v)| v > threshold)
        .map(|(i, _)| i)
        .collect()
}

/// Index at the end of each above-threshold run except the final one.
///
/// A jump of more than `max_gap` between consecutive above-threshold
/// indices closes the current run; the final run's closing index is
/// implicit (end of the list).
fn run_closing_indices(above: &[usize], max_gap: usize) -> Vec<usize> {
    above
        .windows(2)
        .filter(|w| w[1] - w[0] > max_gap)
        .map(|w| w[0])
        .collect()
}

/// Argmax of the original voltage trace within each run span.
///
/// Runs are bounded by consecutive closing indices; the first starts at
/// sample 0 and the last ends at the last sample. Searching the original
/// trace (not the thresholded subset) keeps the true peak even when the
/// run boundaries came from thresholded indices. Ties go to the earliest
/// sample.
fn locate_run_peaks(voltage: &[f64], closing: &[usize]) -> Vec<usize> {
    let mut peaks = Vec::with_capacity(closing.len() + 1);
    let mut start = 0usize;
    for &sep in closing {
        peaks.push(argmax_span(voltage, start, sep + 1));
        start = sep;
    }
    let tail_start = if closing.is_empty() { 0 } else { start + 1 };
    peaks.push(argmax_span(voltage, tail_start, voltage.len()));
    peaks
}

fn argmax_span(voltage: &[f64], from: usize, to: usize) -> usize {
    let mut best = from;
    for i in from..to {
        if voltage[i] > voltage[best] {
            best = i;
        }
    }
    best
}
