//! # Pitch Detection Module
//!
//! This module estimates the fundamental frequency of a monophonic frame
//! using time-domain autocorrelation. It is stateless: every call looks at
//! one frame only and keeps nothing between calls.
//!
//! ## Pipeline
//! 1. RMS noise gate
//! 2. Edge trimming to the first/last quiet sample
//! 3. Autocorrelation over every lag of the trimmed frame
//! 4. Skip the falling slope after lag 0
//! 5. Arg-max over the remaining lags
//! 6. Parabolic interpolation around the peak for sub-sample accuracy
//!
//! Octave errors (a peak at twice or half the true period) are not corrected.

use log::trace;

/// Frames quieter than this RMS level are treated as silence.
pub const NOISE_GATE_RMS: f32 = 0.01;

/// Absolute sample level below which a sample counts as "near zero" when
/// trimming partial cycles from the frame edges.
pub const TRIM_THRESHOLD: f32 = 0.2;

/// Trimmed frames shorter than this are not analysed.
pub const MIN_ANALYSIS_LEN: usize = 8;

/// Correlation values must exceed this to be accepted as a peak.
const PEAK_FLOOR: f64 = -1.0;

/// Outcome of analysing a single frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PitchEstimate {
    /// Silence, noise, or a frame too short or too flat to analyse.
    NoPitch,
    /// Estimated fundamental frequency in Hz, always finite and positive.
    Frequency(f64),
}

impl PitchEstimate {
    pub fn frequency(&self) -> Option<f64> {
        match *self {
            PitchEstimate::Frequency(hz) => Some(hz),
            PitchEstimate::NoPitch => None,
        }
    }

    pub fn is_pitched(&self) -> bool {
        matches!(self, PitchEstimate::Frequency(_))
    }
}

/// Estimates the fundamental frequency of `buffer`.
///
/// # Arguments
/// * `buffer` - Time-domain samples, roughly in `[-1.0, 1.0]`
/// * `sample_rate` - Sample rate in Hz
///
/// # Returns
/// * `PitchEstimate::Frequency(hz)` - Detected fundamental
/// * `PitchEstimate::NoPitch` - Frame below the noise gate, or nothing
///   usable left after trimming
pub fn estimate(buffer: &[f32], sample_rate: f64) -> PitchEstimate {
    if buffer.is_empty() || !sample_rate.is_finite() || sample_rate <= 0.0 {
        return PitchEstimate::NoPitch;
    }

    // --- Noise gate ---
    let level = rms(buffer);
    if level < NOISE_GATE_RMS {
        trace!("[PITCH] Below noise gate (rms={:.4})", level);
        return PitchEstimate::NoPitch;
    }

    // --- Crop partial cycles at the edges ---
    let (start, end) = trim_bounds(buffer, TRIM_THRESHOLD);
    if end <= start || end - start < MIN_ANALYSIS_LEN {
        trace!("[PITCH] Trimmed frame too short ({}..{})", start, end);
        return PitchEstimate::NoPitch;
    }
    let trimmed = &buffer[start..end];

    // --- Period search ---
    let correlation = autocorrelate(trimmed);
    let descent_end = skip_initial_descent(&correlation);
    let Some(peak) = argmax_from(&correlation, descent_end) else {
        trace!("[PITCH] No correlation peak after lag {}", descent_end);
        return PitchEstimate::NoPitch;
    };
    let Some(period) = refine_period(&correlation, peak) else {
        trace!("[PITCH] Peak at lag {} has no neighbours to interpolate", peak);
        return PitchEstimate::NoPitch;
    };

    let frequency = sample_rate / period;
    if frequency.is_finite() && frequency > 0.0 {
        PitchEstimate::Frequency(frequency)
    } else {
        PitchEstimate::NoPitch
    }
}

/// Root-mean-square amplitude of the buffer. Zero for an empty buffer.
pub fn rms(buffer: &[f32]) -> f32 {
    if buffer.is_empty() {
        return 0.0;
    }
    let energy: f64 = buffer.iter().map(|&s| s as f64 * s as f64).sum();
    (energy / buffer.len() as f64).sqrt() as f32
}

/// Returns the half-open range `[start, end)` left after cropping the edges.
///
/// `start` is the first index in the first half whose magnitude is below
/// `threshold` (0 if none). `end` is the first index found scanning back
/// from the last sample, within the second half, whose magnitude is below
/// `threshold` (the last index if none). The last sample is therefore
/// never part of the range.
pub fn trim_bounds(buffer: &[f32], threshold: f32) -> (usize, usize) {
    let size = buffer.len();
    let half = size.div_ceil(2);
    let is_quiet = |i: &usize| buffer[*i].abs() < threshold;

    let start = (0..half).find(is_quiet).unwrap_or(0);
    let end = (1..half)
        .map(|offset| size - offset)
        .find(is_quiet)
        .unwrap_or(size.saturating_sub(1));

    (start, end)
}

/// Unnormalised autocorrelation for every lag in `[0, len)`.
///
/// `c[lag] = sum(buffer[j] * buffer[j + lag])` over all valid `j`.
/// This is O(n²) and dominates the cost of [`estimate`].
pub fn autocorrelate(buffer: &[f32]) -> Vec<f64> {
    let size = buffer.len();
    (0..size)
        .map(|lag| {
            buffer[..size - lag]
                .iter()
                .zip(&buffer[lag..])
                .map(|(&a, &b)| a as f64 * b as f64)
                .sum()
        })
        .collect()
}

/// Index of the first lag where the correlation stops strictly falling.
///
/// If the correlation falls all the way to the end, the last lag is returned.
pub fn skip_initial_descent(correlation: &[f64]) -> usize {
    correlation
        .windows(2)
        // Written as a negation so a NaN also ends the walk.
        .position(|pair| !(pair[0] > pair[1]))
        .unwrap_or(correlation.len().saturating_sub(1))
}

/// Arg-max of `values[from..]`. Ties go to the first occurrence.
///
/// Returns `None` when no value in range exceeds the peak floor.
pub fn argmax_from(values: &[f64], from: usize) -> Option<usize> {
    let mut best = None;
    let mut best_value = PEAK_FLOOR;
    for (i, &value) in values.iter().enumerate().skip(from) {
        if value > best_value {
            best_value = value;
            best = Some(i);
        }
    }
    best
}

/// Sub-sample period around `peak`, or `None` if the peak sits on either
/// end of the correlation and has no neighbour.
pub fn refine_period(correlation: &[f64], peak: usize) -> Option<f64> {
    if peak == 0 || peak + 1 >= correlation.len() {
        return None;
    }
    let offset = parabolic_offset(
        correlation[peak - 1],
        correlation[peak],
        correlation[peak + 1],
    );
    Some(peak as f64 + offset)
}

/// Vertex offset of the parabola through `(-1, left)`, `(0, centre)`,
/// `(1, right)`. Zero when the three points are collinear.
pub fn parabolic_offset(left: f64, centre: f64, right: f64) -> f64 {
    let a = (left + right - 2.0 * centre) / 2.0;
    let b = (right - left) / 2.0;
    if a == 0.0 { 0.0 } else { -b / (2.0 * a) }
}
