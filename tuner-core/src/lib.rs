// tuner-core/src/lib.rs

//! The core logic for the guitar tuner.
//! This crate is responsible for audio capture, pitch estimation,
//! note mapping and reference tones. It is completely headless
//! and contains no GUI code.

pub mod audio;
pub mod config;
pub mod error;
pub mod pitch;
pub mod tone;
pub mod tuning;

use log::warn;

pub use error::TuningError;
pub use pitch::PitchEstimate;
pub use tuning::SymbolicPitch;

/// Represents the result of a single audio analysis frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    /// Raw estimator output for the frame.
    pub estimate: PitchEstimate,
    /// Nearest note, present only when the frame was pitched.
    pub pitch: Option<SymbolicPitch>,
}

impl AnalysisResult {
    pub fn silent() -> Self {
        Self {
            estimate: PitchEstimate::NoPitch,
            pitch: None,
        }
    }
}

/// Runs one frame through the estimator and, if pitched, the note mapper.
///
/// # Arguments
/// * `frame` - Mono samples (typically 2048)
/// * `sample_rate` - Sample rate in Hz (typically 44100 or 48000)
pub fn analyze_frame(frame: &[f32], sample_rate: f64) -> AnalysisResult {
    let estimate = pitch::estimate(frame, sample_rate);
    let pitch = estimate.frequency().and_then(|hz| match tuning::map_to_note(hz) {
        Ok(pitch) => Some(pitch),
        Err(e) => {
            warn!("[ANALYSIS] Discarding estimate: {}", e);
            None
        }
    });

    AnalysisResult { estimate, pitch }
}
