//! Raw strip validation: missing-value repair and window resolution.

use crate::error::{MalformedKind, PipelineError};
use crate::signal::{AnalysisWindow, Recording};

/// Smallest share of finite time samples for which gap filling is attempted.
pub const MIN_FINITE_FRACTION: f64 = 0.9;

/// Share of entries in `values` that are finite numbers.
pub fn finite_fraction(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let finite = values.iter().filter(|v| v.is_finite()).count();
    finite as f64 / values.len() as f64
}

/// Whether a column has enough finite samples left to repair by
/// interpolation.
pub fn can_interpolate(values: &[f64]) -> bool {
    finite_fraction(values) >= MIN_FINITE_FRACTION
}

/// Fill non-finite entries by position-indexed linear interpolation through
/// the finite `(index, value)` pairs. Finite samples pass through exactly.
///
/// Entries before the first or after the last finite sample take that
/// sample's value: a piecewise-linear fit cannot extrapolate past its
/// anchors, so gaps at the extreme ends of the column are repaired only in
/// this clamped sense.
pub fn interpolate_gaps(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    let anchors: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .map(|(i, _)| i)
        .collect();
    let (first, last) = match (anchors.first(), anchors.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return out,
    };
    for slot in out.iter_mut().take(first) {
        *slot = values[first];
    }
    for slot in out.iter_mut().skip(last + 1) {
        *slot = values[last];
    }
    for pair in anchors.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if b - a < 2 {
            continue;
        }
        let (ya, yb) = (values[a], values[b]);
        let span = (b - a) as f64;
        for i in a + 1..b {
            let frac = (i - a) as f64 / span;
            out[i] = ya + frac * (yb - ya);
        }
    }
    out
}

/// Turn raw time/voltage columns into a validated `Recording`.
///
/// A time column with fewer than 10% missing entries is repaired by
/// `interpolate_gaps`; voltage is never repaired. Anything still
/// non-finite afterwards, mismatched column lengths, an empty strip, or
/// time running backwards is rejected as `MalformedData`.
pub fn sanitize(time: &[f64], voltage: &[f64]) -> Result<Recording, PipelineError> {
    let gaps = time.iter().filter(|t| !t.is_finite()).count();
    let time = if gaps > 0 && can_interpolate(time) {
        log::debug!("filling {gaps} time gaps by linear interpolation");
        interpolate_gaps(time)
    } else {
        time.to_vec()
    };

    let non_finite_time = time.iter().filter(|t| !t.is_finite()).count();
    if non_finite_time > 0 {
        return Err(MalformedKind::NonFiniteTime {
            count: non_finite_time,
        }
        .into());
    }
    let non_finite_voltage = voltage.iter().filter(|v| !v.is_finite()).count();
    if non_finite_voltage > 0 {
        return Err(MalformedKind::NonFiniteVoltage {
            count: non_finite_voltage,
        }
        .into());
    }
    if time.len() != voltage.len() {
        return Err(MalformedKind::LengthMismatch {
            time: time.len(),
            voltage: voltage.len(),
        }
        .into());
    }
    if time.is_empty() {
        return Err(MalformedKind::Empty.into());
    }
    if let Some(index) = first_backwards_step(&time) {
        return Err(MalformedKind::NonMonotonicTime { index }.into());
    }

    Ok(Recording {
        time,
        voltage: voltage.to_vec(),
    })
}

/// Resolve the analysis window for a sanitized recording.
///
/// With no request the window spans the whole strip. A request must lie
/// inside the recorded time span with `start <= end`; otherwise the caller
/// gets `InvalidWindow` and is expected to retry with `None`.
pub fn resolve_window(
    recording: &Recording,
    requested: Option<(f64, f64)>,
) -> Result<AnalysisWindow, PipelineError> {
    let (t_min, t_max) = recording.time_bounds();
    match requested {
        None => Ok(AnalysisWindow {
            start: t_min,
            end: t_max,
        }),
        Some((start, end)) => {
            if start > end || start < t_min || end > t_max {
                return Err(PipelineError::InvalidWindow {
                    start,
                    end,
                    t_min,
                    t_max,
                });
            }
            Ok(AnalysisWindow { start, end })
        }
    }
}

fn first_backwards_step(time: &[f64]) -> Option<usize> {
    time.windows(2).position(|w| w[1] < w[0]).map(|i| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MalformedKind, PipelineError};

    const NAN: f64 = f64::NAN;

    #[test]
    fn interpolation_recovers_interior_gaps_exactly() {
        let time = [1.0, 2.0, NAN, 4.0, 5.0, NAN, 7.0];
        let filled = interpolate_gaps(&time);
        assert_eq!(filled, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn interpolation_clamps_leading_and_trailing_gaps() {
        let time = [NAN, 2.0, 3.0, 4.0, NAN];
        let filled = interpolate_gaps(&time);
        assert_eq!(filled, vec![2.0, 2.0, 3.0, 4.0, 4.0]);
    }

    #[test]
    fn can_interpolate_accepts_ninety_percent_finite() {
        let mut values = vec![1.0; 10];
        values[4] = NAN;
        assert!(can_interpolate(&values));

        let mut values = vec![1.0; 20];
        values[3] = NAN;
        values[11] = NAN;
        assert!(can_interpolate(&values));
    }

    #[test]
    fn can_interpolate_rejects_below_ninety_percent_finite() {
        let mut values = vec![1.0; 20];
        for slot in values.iter_mut().take(10) {
            *slot = NAN;
        }
        assert!(!can_interpolate(&values));

        let mut values = vec![1.0; 10];
        values[0] = NAN;
        values[5] = NAN;
        assert!(!can_interpolate(&values));
    }

    #[test]
    fn sanitize_repairs_sparse_time_gaps() {
        let time = [0.0, 1.0, NAN, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let voltage = [0.0; 10];
        let recording = sanitize(&time, &voltage).unwrap();
        assert_eq!(recording.time[2], 2.0);
        assert!(recording.time.iter().all(|t| t.is_finite()));
    }

    #[test]
    fn sanitize_rejects_time_with_too_many_gaps() {
        let time = [0.0, NAN, NAN, 3.0, 4.0];
        let voltage = [0.0; 5];
        let err = sanitize(&time, &voltage).unwrap_err();
        assert_eq!(
            err,
            PipelineError::MalformedData(MalformedKind::NonFiniteTime { count: 2 })
        );
    }

    #[test]
    fn sanitize_never_repairs_voltage() {
        let time = [0.0, 1.0, 2.0, 3.0, 4.0];
        let voltage = [0.5, NAN, 0.5, 0.5, 0.5];
        let err = sanitize(&time, &voltage).unwrap_err();
        assert_eq!(
            err,
            PipelineError::MalformedData(MalformedKind::NonFiniteVoltage { count: 1 })
        );
    }

    #[test]
    fn sanitize_rejects_mismatched_lengths() {
        let time = [0.0, 1.0, 2.0];
        let voltage = [0.5, 0.5];
        let err = sanitize(&time, &voltage).unwrap_err();
        assert_eq!(
            err,
            PipelineError::MalformedData(MalformedKind::LengthMismatch { time: 3, voltage: 2 })
        );
    }

    #[test]
    fn sanitize_rejects_empty_strips() {
        let err = sanitize(&[], &[]).unwrap_err();
        assert_eq!(err, PipelineError::MalformedData(MalformedKind::Empty));
    }

    #[test]
    fn sanitize_rejects_time_running_backwards() {
        let time = [0.0, 1.0, 0.5, 2.0];
        let voltage = [0.0; 4];
        let err = sanitize(&time, &voltage).unwrap_err();
        assert_eq!(
            err,
            PipelineError::MalformedData(MalformedKind::NonMonotonicTime { index: 2 })
        );
    }

    #[test]
    fn sanitize_is_idempotent() {
        let time = [1.0, 2.0, NAN, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        let voltage = [0.1; 10];
        let once = sanitize(&time, &voltage).unwrap();
        let twice = sanitize(&once.time, &once.voltage).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn resolve_window_defaults_to_full_strip() {
        let recording = sanitize(&[0.0, 1.0, 2.0], &[1.0, 2.0, 3.0]).unwrap();
        let window = resolve_window(&recording, None).unwrap();
        assert_eq!(window.start, 0.0);
        assert_eq!(window.end, 2.0);
    }

    #[test]
    fn resolve_window_accepts_in_range_request() {
        let recording = sanitize(&[0.0, 1.0, 2.0, 3.0], &[0.0; 4]).unwrap();
        let window = resolve_window(&recording, Some((0.5, 2.5))).unwrap();
        assert_eq!(window.start, 0.5);
        assert_eq!(window.end, 2.5);
    }

    #[test]
    fn resolve_window_rejects_out_of_range_request() {
        let recording = sanitize(&[0.0, 1.0, 2.0, 3.0], &[0.0; 4]).unwrap();
        let err = resolve_window(&recording, Some((0.5, 9.0))).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidWindow { .. }));
        let err = resolve_window(&recording, Some((-1.0, 2.0))).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidWindow { .. }));
    }

    #[test]
    fn resolve_window_rejects_reversed_request() {
        let recording = sanitize(&[0.0, 1.0, 2.0, 3.0], &[0.0; 4]).unwrap();
        let err = resolve_window(&recording, Some((2.0, 1.0))).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidWindow { .. }));
    }
}
