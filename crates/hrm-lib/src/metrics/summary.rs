//! Per-strip summary metrics and their quality gates.

use crate::error::PipelineError;
use crate::signal::{AnalysisWindow, Beats, Recording};
use serde::{Deserialize, Serialize};

/// Advisory ceiling on lead voltage magnitude (millivolts).
pub const VOLTAGE_WARN_LIMIT_MV: f64 = 300.0;
/// Physiological floor on detected beats per second of strip (~36 BPM).
pub const MIN_EXPECTED_BEATS_PER_SEC: f64 = 0.6;
/// Physiological ceiling on detected beats per second of strip (~150 BPM).
pub const MAX_EXPECTED_BEATS_PER_SEC: f64 = 2.5;

/// Summary metrics for one analyzed strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Smallest and largest voltage in the strip (mV)
    pub voltage_extremes: (f64, f64),
    /// Strip duration in seconds (largest timestamp)
    pub duration: f64,
    /// Window the mean heart rate was computed over
    pub window: AnalysisWindow,
    /// Beat timestamps in seconds
    pub beats: Vec<f64>,
    pub num_beats: usize,
    /// Mean heart rate over the window; `None` when the window has zero
    /// width and the rate is undefined
    pub mean_hr_bpm: Option<f64>,
}

/// Reason a report was flagged for review.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum QualityFlag {
    /// Beat count outside the physiological range for the strip length.
    ImplausibleBeatCount {
        num_beats: usize,
        min_expected: f64,
        max_expected: f64,
    },
    /// Voltage extremes beyond the expected signal range. Advisory only.
    VoltageOutOfRange {
        min_mv: f64,
        max_mv: f64,
        limit_mv: f64,
    },
}

impl QualityFlag {
    /// Whether this flag makes the report unfit to persist.
    pub fn invalidates(&self) -> bool {
        matches!(self, QualityFlag::ImplausibleBeatCount { .. })
    }
}

/// Quality-tagged outcome of one analysis run.
///
/// `Flagged` reports carry at least one invalidating reason and must not be
/// persisted; advisory flags alone (voltage range) leave a report `Valid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MetricsReport {
    Valid {
        metrics: Metrics,
        advisories: Vec<QualityFlag>,
    },
    Flagged {
        metrics: Metrics,
        reasons: Vec<QualityFlag>,
    },
}

impl MetricsReport {
    fn from_parts(metrics: Metrics, flags: Vec<QualityFlag>) -> Self {
        if flags.iter().any(QualityFlag::invalidates) {
            MetricsReport::Flagged {
                metrics,
                reasons: flags,
            }
        } else {
            MetricsReport::Valid {
                metrics,
                advisories: flags,
            }
        }
    }

    pub fn metrics(&self) -> &Metrics {
        match self {
            MetricsReport::Valid { metrics, .. } => metrics,
            MetricsReport::Flagged { metrics, .. } => metrics,
        }
    }

    pub fn flags(&self) -> &[QualityFlag] {
        match self {
            MetricsReport::Valid { advisories, .. } => advisories,
            MetricsReport::Flagged { reasons, .. } => reasons,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, MetricsReport::Valid { .. })
    }
}

/// Build the metrics aggregate for one strip and classify its quality.
pub fn summarize(recording: &Recording, window: &AnalysisWindow, beats: Beats) -> MetricsReport {
    let voltage_extremes = recording.voltage_extremes();
    let duration = recording.duration();
    let mean = mean_hr_bpm(&beats, window).ok();
    let num_beats = beats.len();

    let mut flags = Vec::new();
    if !is_physiologically_plausible(num_beats, duration) {
        flags.push(QualityFlag::ImplausibleBeatCount {
            num_beats,
            min_expected: MIN_EXPECTED_BEATS_PER_SEC * duration,
            max_expected: MAX_EXPECTED_BEATS_PER_SEC * duration,
        });
    }
    if !voltage_within_expected_range(voltage_extremes) {
        flags.push(QualityFlag::VoltageOutOfRange {
            min_mv: voltage_extremes.0,
            max_mv: voltage_extremes.1,
            limit_mv: VOLTAGE_WARN_LIMIT_MV,
        });
    }

    let metrics = Metrics {
        voltage_extremes,
        duration,
        window: *window,
        beats: beats.times,
        num_beats,
        mean_hr_bpm: mean,
    };
    MetricsReport::from_parts(metrics, flags)
}

/// Mean heart rate over the window, in beats per minute.
///
/// The count is the span of ranked positions between the first beat at or
/// after `window.start` and the first beat at or after `window.end`
/// (clamped to the last beat when the window extends past it), not a
/// literal membership count of `[start, end)`. For evenly spaced beats the
/// two agree; at window edges the rank-difference form can differ by one.
/// Kept as-is for compatibility with existing recordings.
pub fn mean_hr_bpm(beats: &Beats, window: &AnalysisWindow) -> Result<f64, PipelineError> {
    let width = window.width();
    if width == 0.0 {
        return Err(PipelineError::DegenerateWindow { at: window.start });
    }
    if beats.is_empty() {
        return Ok(0.0);
    }
    let times = &beats.times;
    let start_inx = times
        .iter()
        .position(|&t| t >= window.start)
        .unwrap_or(0);
    let mut end_inx = times.iter().position(|&t| t >= window.end).unwrap_or(0);
    if times[times.len() - 1] < window.end {
        end_inx = times.len() - 1;
    }
    // start <= end keeps the ranks ordered; saturate rather than panic on
    // a hand-built window.
    let count = end_inx.saturating_sub(start_inx) as f64;
    Ok(count / (width / 60.0))
}

/// Whether a detected beat count is physiologically plausible for a strip
/// of the given duration (seconds).
pub fn is_physiologically_plausible(num_beats: usize, duration: f64) -> bool {
    let min_expected = MIN_EXPECTED_BEATS_PER_SEC * duration;
    let max_expected = MAX_EXPECTED_BEATS_PER_SEC * duration;
    let n = num_beats as f64;
    n >= min_expected && n <= max_expected
}

/// Whether the voltage extremes stay inside the expected ±300 mV range.
pub fn voltage_within_expected_range(extremes: (f64, f64)) -> bool {
    extremes.0.abs() <= VOLTAGE_WARN_LIMIT_MV && extremes.1.abs() <= VOLTAGE_WARN_LIMIT_MV
}
