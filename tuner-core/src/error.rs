//! # Error Types
//!
//! Typed failures of the tuning layer. "No pitch in this frame" is not an
//! error and never shows up here; see [`crate::pitch::PitchEstimate`].

/// Errors raised when converting between frequencies and note names,
/// or when setting up a reference tone.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TuningError {
    /// Frequency was zero, negative, NaN or infinite.
    #[error("invalid frequency: {0} Hz (must be finite and positive)")]
    InvalidFrequency(f64),

    /// Pitch-class label not found in the 12-note table.
    #[error("unknown note name `{0}`")]
    UnknownNote(String),

    /// A reference tone parameter was out of range.
    #[error("invalid reference tone {what}: {value}")]
    InvalidReference { what: &'static str, value: f64 },
}
