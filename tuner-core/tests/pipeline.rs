//! End-to-end checks: synthetic frames through `analyze_frame`.

use std::f64::consts::PI;
use tuner_core::tuning::{self, GUITAR_STRINGS, IN_TUNE_CENTS, StringMatch};
use tuner_core::{AnalysisResult, PitchEstimate, analyze_frame};

fn sine(freq: f64, sample_rate: f64, len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| (0.6 * (2.0 * PI * freq * i as f64 / sample_rate).sin()) as f32)
        .collect()
}

/// Fundamental plus a weaker second and third harmonic, like a plucked string.
fn plucked(freq: f64, sample_rate: f64, len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| {
            let t = 2.0 * PI * freq * i as f64 / sample_rate;
            (0.5 * t.sin() + 0.2 * (2.0 * t).sin() + 0.1 * (3.0 * t).sin()) as f32
        })
        .collect()
}

#[test]
fn silence_produces_no_reading() {
    let result = analyze_frame(&[0.0; 2048], 44100.0);
    assert_eq!(result, AnalysisResult::silent());
}

#[test]
fn a440_frame_reads_as_a4() {
    let result = analyze_frame(&sine(440.0, 44100.0, 2048), 44100.0);
    assert!(result.estimate.is_pitched());
    let pitch = result.pitch.expect("pitched frame is mapped");
    assert_eq!(pitch.label(), "A4");
    assert!(pitch.cents.abs() <= 5, "cents = {}", pitch.cents);
}

#[test]
fn every_string_is_recognised_with_harmonics() {
    for string in &GUITAR_STRINGS {
        let frame = plucked(string.frequency, 44100.0, 2048);
        let pitch = analyze_frame(&frame, 44100.0).pitch.expect("pitched frame");
        assert_eq!(
            tuning::match_string(string, Some(&pitch), IN_TUNE_CENTS),
            StringMatch::Exact,
            "{} read as {} {:+}",
            string.label(),
            pitch.label(),
            pitch.cents
        );
    }
}

#[test]
fn low_strings_fit_in_a_default_frame() {
    // 2048 samples at 44.1 kHz still hold almost four periods of low E.
    for string in &GUITAR_STRINGS[..3] {
        let result = analyze_frame(&sine(string.frequency, 44100.0, 2048), 44100.0);
        let hz = result.estimate.frequency().expect("pitched frame");
        assert!(
            (hz - string.frequency).abs() / string.frequency < 0.005,
            "{} read as {hz} Hz",
            string.label()
        );
        assert_eq!(result.pitch.expect("mapped").label(), string.label());
    }
}

#[test]
fn detuned_string_is_matched_but_not_exact() {
    // G3 played 30 cents sharp.
    let g3 = GUITAR_STRINGS[3];
    let sharp = g3.frequency * 2.0_f64.powf(30.0 / 1200.0);
    let pitch = analyze_frame(&sine(sharp, 48000.0, 2048), 48000.0)
        .pitch
        .expect("pitched frame");
    assert_eq!(
        tuning::match_string(&g3, Some(&pitch), IN_TUNE_CENTS),
        StringMatch::Matched
    );
    assert!((20..40).contains(&pitch.cents), "cents = {}", pitch.cents);
}

#[test]
fn repeated_calls_are_independent() {
    let frame = sine(330.0, 44100.0, 2048);
    let first = analyze_frame(&frame, 44100.0);
    let _ = analyze_frame(&[0.0; 2048], 44100.0);
    assert_eq!(analyze_frame(&frame, 44100.0), first);
    assert!(matches!(first.estimate, PitchEstimate::Frequency(_)));
}
