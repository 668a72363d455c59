use serde::{Deserialize, Serialize};

/// Sanitized two-column ECG strip.
///
/// `time` is in seconds and non-decreasing, `voltage` in millivolts; both
/// columns are equal length and fully finite once `preprocess::sanitize`
/// has accepted them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    /// Sample timestamps in seconds
    pub time: Vec<f64>,
    /// Lead voltage in millivolts
    pub voltage: Vec<f64>,
}

impl Recording {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Strip duration, defined as the largest timestamp.
    pub fn duration(&self) -> f64 {
        self.time_bounds().1
    }

    /// Smallest and largest timestamps in the strip.
    pub fn time_bounds(&self) -> (f64, f64) {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &t in &self.time {
            min = min.min(t);
            max = max.max(t);
        }
        (min, max)
    }

    /// Smallest and largest voltage values in the strip.
    pub fn voltage_extremes(&self) -> (f64, f64) {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in &self.voltage {
            min = min.min(v);
            max = max.max(v);
        }
        (min, max)
    }
}

/// Analysis span in seconds; `start <= end`, both inside the recording.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisWindow {
    pub start: f64,
    pub end: f64,
}

impl AnalysisWindow {
    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Beat timestamps (seconds), one per QRS peak, ascending by construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Beats {
    pub times: Vec<f64>,
}

impl Beats {
    pub fn from_times(times: Vec<f64>) -> Self {
        Self { times }
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}
