use thiserror::Error;

/// Why a raw strip failed sanitization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MalformedKind {
    #[error("recording has no samples")]
    Empty,
    #[error("time and voltage columns differ in length ({time} vs {voltage})")]
    LengthMismatch { time: usize, voltage: usize },
    #[error("{count} non-finite time samples remain after gap filling")]
    NonFiniteTime { count: usize },
    #[error("voltage column holds {count} non-finite samples")]
    NonFiniteVoltage { count: usize },
    #[error("time runs backwards at sample {index}")]
    NonMonotonicTime { index: usize },
}

/// Failure taxonomy for the validation and beat-detection pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PipelineError {
    /// The recording cannot be trusted; fatal for this strip.
    #[error("malformed recording: {0}")]
    MalformedData(#[from] MalformedKind),
    /// Requested window lies outside the strip; callers are expected to
    /// fall back to the full recording rather than abort.
    #[error("window {start}..{end} s lies outside the recorded span {t_min}..{t_max} s")]
    InvalidWindow {
        start: f64,
        end: f64,
        t_min: f64,
        t_max: f64,
    },
    /// Zero-width window: the mean rate is undefined, not zero. Fatal to
    /// the BPM figure only; the remaining metrics stay usable.
    #[error("window has zero width at {at} s, mean heart rate is undefined")]
    DegenerateWindow { at: f64 },
}
