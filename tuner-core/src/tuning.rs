//! # Musical Tuning Module
//!
//! Maps frequencies onto 12-tone equal temperament (A4 = 440 Hz) and holds
//! the guitar reference strings used by the tuner display.
//!
//! ## Conventions
//! - Notes are numbered like MIDI: A4 is 69, middle C (C4) is 60
//! - The nearest note is chosen by rounding halves upward
//! - Cents are floored, not rounded, so a reading runs from -50 up to +49.
//!   Exactly on the midpoint between two notes the raw value lands a hair
//!   under -50 and floors to -51.

use serde::Serialize;

use crate::error::TuningError;

/// Pitch-class labels, indexed by `midi_note mod 12`.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Reference pitch of A4 in Hz.
pub const A4_FREQUENCY: f64 = 440.0;

/// MIDI note number of A4.
pub const A4_MIDI: i32 = 69;

/// A reading with `|cents|` below this is shown as in tune.
pub const IN_TUNE_CENTS: i32 = 5;

/// A frequency expressed as the nearest equal-tempered note.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolicPitch {
    /// Pitch-class label, e.g. "C#"
    pub note_name: &'static str,
    /// Octave in scientific pitch notation (middle C is in octave 4)
    pub octave: i32,
    /// Floored deviation from `perfect_frequency` in cents
    pub cents: i32,
    /// The frequency that was mapped, in Hz
    pub frequency: f64,
    /// Exact equal-tempered frequency of the matched note, in Hz
    pub perfect_frequency: f64,
}

impl SymbolicPitch {
    pub fn midi_note(&self) -> i32 {
        let pitch_class = NOTE_NAMES
            .iter()
            .position(|&n| n == self.note_name)
            .unwrap_or_default() as i32;
        (self.octave + 1) * 12 + pitch_class
    }

    /// Note name with octave, e.g. "A4".
    pub fn label(&self) -> String {
        format!("{}{}", self.note_name, self.octave)
    }

    pub fn is_in_tune(&self, threshold_cents: i32) -> bool {
        self.cents.abs() < threshold_cents
    }
}

/// Maps a frequency to its nearest equal-tempered note.
///
/// # Arguments
/// * `frequency` - Frequency in Hz, finite and positive
///
/// # Returns
/// * `Ok(SymbolicPitch)` - Note name, octave, cents and reference frequency
/// * `Err(TuningError::InvalidFrequency)` - Zero, negative or non-finite
///   input, or a frequency so extreme its note frequency over- or underflows
pub fn map_to_note(frequency: f64) -> Result<SymbolicPitch, TuningError> {
    if !frequency.is_finite() || frequency <= 0.0 {
        return Err(TuningError::InvalidFrequency(frequency));
    }

    let note_number = 12.0 * (frequency / A4_FREQUENCY).log2();
    let semitones = round_half_up(note_number);
    let perfect_frequency = equal_tempered(semitones);
    let raw_cents = cents_between(frequency, perfect_frequency);
    if !semitones.is_finite() || !perfect_frequency.is_finite() || !raw_cents.is_finite() {
        return Err(TuningError::InvalidFrequency(frequency));
    }

    let midi_note = semitones as i32 + A4_MIDI;

    Ok(SymbolicPitch {
        note_name: NOTE_NAMES[midi_note.rem_euclid(12) as usize],
        octave: midi_note.div_euclid(12) - 1,
        cents: raw_cents.floor() as i32,
        frequency,
        perfect_frequency,
    })
}

/// Exact frequency of `note` in `octave`, e.g. `("A", 4)` -> 440 Hz.
pub fn perfect_frequency_of(note: &str, octave: i32) -> Result<f64, TuningError> {
    let pitch_class = NOTE_NAMES
        .iter()
        .position(|&n| n == note)
        .ok_or_else(|| TuningError::UnknownNote(note.to_string()))?;
    Ok(midi_to_frequency((octave + 1) * 12 + pitch_class as i32))
}

/// Equal-tempered frequency of a MIDI note number.
pub fn midi_to_frequency(midi_note: i32) -> f64 {
    equal_tempered((midi_note - A4_MIDI) as f64)
}

/// Unrounded deviation of `frequency` from `reference`, in cents.
pub fn cents_between(frequency: f64, reference: f64) -> f64 {
    1200.0 * (frequency / reference).log2()
}

fn equal_tempered(semitones_from_a4: f64) -> f64 {
    A4_FREQUENCY * 2.0_f64.powf(semitones_from_a4 / 12.0)
}

/// Rounds to the nearest integer, with halves going toward positive infinity.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// One open string of a guitar in standard tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuitarString {
    pub note: &'static str,
    pub octave: i32,
    /// Target frequency in Hz
    pub frequency: f64,
}

impl GuitarString {
    pub fn label(&self) -> String {
        format!("{}{}", self.note, self.octave)
    }
}

/// Standard tuning, low E to high E.
pub static GUITAR_STRINGS: [GuitarString; 6] = [
    GuitarString { note: "E", octave: 2, frequency: 82.41 },
    GuitarString { note: "A", octave: 2, frequency: 110.00 },
    GuitarString { note: "D", octave: 3, frequency: 146.83 },
    GuitarString { note: "G", octave: 3, frequency: 196.00 },
    GuitarString { note: "B", octave: 3, frequency: 246.94 },
    GuitarString { note: "E", octave: 4, frequency: 329.63 },
];

/// How the live reading relates to a reference string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringMatch {
    /// Same note and octave, and in tune
    Exact,
    /// Same note and octave, but out of tune
    Matched,
    /// Different note, or no reading
    Idle,
}

/// Compares the current reading against a reference string.
pub fn match_string(
    string: &GuitarString,
    pitch: Option<&SymbolicPitch>,
    threshold_cents: i32,
) -> StringMatch {
    match pitch {
        Some(p) if p.note_name == string.note && p.octave == string.octave => {
            if p.is_in_tune(threshold_cents) {
                StringMatch::Exact
            } else {
                StringMatch::Matched
            }
        }
        _ => StringMatch::Idle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a440_is_a4() {
        let pitch = map_to_note(440.0).unwrap();
        assert_eq!(pitch.note_name, "A");
        assert_eq!(pitch.octave, 4);
        assert_eq!(pitch.cents, 0);
        assert_eq!(pitch.perfect_frequency, 440.0);
        assert_eq!(pitch.frequency, 440.0);
        assert_eq!(pitch.midi_note(), 69);
    }

    #[test]
    fn middle_c_is_in_octave_four() {
        let pitch = map_to_note(261.63).unwrap();
        assert_eq!(pitch.label(), "C4");
        assert_eq!(pitch.cents, 0);
    }

    #[test]
    fn low_e_string() {
        let pitch = map_to_note(82.41).unwrap();
        assert_eq!((pitch.note_name, pitch.octave, pitch.cents), ("E", 2, 0));
    }

    #[test]
    fn every_table_note_round_trips() {
        for octave in -1..=9 {
            for note in NOTE_NAMES {
                let freq = perfect_frequency_of(note, octave).unwrap();
                let pitch = map_to_note(freq).unwrap();
                assert_eq!((pitch.note_name, pitch.octave), (note, octave));
                assert_eq!(pitch.cents, 0, "{note}{octave} at {freq} Hz");
                assert_eq!(pitch.perfect_frequency, freq);
            }
        }
    }

    #[test]
    fn cents_wrap_at_the_midpoint_between_notes() {
        // A4 and A#4 meet 50 cents above 440 Hz.
        let midpoint = 440.0 * 2.0_f64.powf(50.0 / 1200.0);

        let below = map_to_note(midpoint * (1.0 - 1e-6)).unwrap();
        assert_eq!((below.note_name, below.cents), ("A", 49));

        let above = map_to_note(midpoint * (1.0 + 1e-6)).unwrap();
        assert_eq!((above.note_name, above.cents), ("A#", -50));
    }

    #[test]
    fn exact_midpoint_reads_minus_51() {
        // log2 puts the midpoint a hair above the half step, then the cents
        // come out just under -50.
        let pitch = map_to_note(440.0 * 2.0_f64.powf(0.5 / 12.0)).unwrap();
        assert_eq!(
            (pitch.note_name, pitch.octave, pitch.cents),
            ("A#", 4, -51)
        );
    }

    #[test]
    fn cents_are_floored_not_rounded() {
        // 0.4 cents flat of A4 reads as -1, 0.9 cents sharp reads as 0.
        let flat = map_to_note(440.0 * 2.0_f64.powf(-0.4 / 1200.0)).unwrap();
        assert_eq!(flat.cents, -1);
        let sharp = map_to_note(440.0 * 2.0_f64.powf(0.9 / 1200.0)).unwrap();
        assert_eq!(sharp.cents, 0);
    }

    #[test]
    fn cents_climb_toward_the_next_note() {
        let mut last = i32::MIN;
        for step in 0..50 {
            let freq = 440.0 * 2.0_f64.powf((step as f64 + 0.5) / 1200.0);
            let pitch = map_to_note(freq).unwrap();
            assert_eq!(pitch.note_name, "A");
            assert!(pitch.cents >= last);
            assert!((0..50).contains(&pitch.cents));
            last = pitch.cents;
        }
    }

    #[test]
    fn halves_round_upward() {
        assert_eq!(round_half_up(0.5), 1.0);
        assert_eq!(round_half_up(-0.5), 0.0);
        assert_eq!(round_half_up(-1.5), -1.0);
        assert_eq!(round_half_up(-1.6), -2.0);
    }

    #[test]
    fn sub_audio_notes_wrap_pitch_class() {
        // MIDI note -12 is C-2.
        let pitch = map_to_note(4.0).unwrap();
        assert_eq!(pitch.midi_note(), -12);
        assert_eq!((pitch.note_name, pitch.octave), ("C", -2));
    }

    #[test]
    fn rejects_non_positive_and_non_finite() {
        for bad in [0.0, -440.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                map_to_note(bad),
                Err(TuningError::InvalidFrequency(_))
            ));
        }
    }

    #[test]
    fn rejects_frequencies_whose_note_overflows() {
        for extreme in [f64::MAX, f64::from_bits(1)] {
            assert_eq!(
                map_to_note(extreme),
                Err(TuningError::InvalidFrequency(extreme)),
                "{extreme:e}"
            );
        }
    }

    #[test]
    fn unknown_note_name() {
        assert_eq!(
            perfect_frequency_of("H", 4),
            Err(TuningError::UnknownNote("H".to_string()))
        );
    }

    #[test]
    fn guitar_strings_map_to_their_own_notes() {
        for string in &GUITAR_STRINGS {
            let pitch = map_to_note(string.frequency).unwrap();
            assert_eq!(pitch.label(), string.label());
            // The table is rounded to 0.01 Hz, so some strings sit a hair flat.
            assert!((-1..=0).contains(&pitch.cents), "{}", string.label());
        }
    }

    #[test]
    fn string_match_states() {
        let low_e = GUITAR_STRINGS[0];
        let in_tune = map_to_note(82.41).unwrap();
        let sharp = map_to_note(84.0).unwrap();
        let other = map_to_note(110.0).unwrap();

        assert_eq!(match_string(&low_e, Some(&in_tune), IN_TUNE_CENTS), StringMatch::Exact);
        assert_eq!(match_string(&low_e, Some(&sharp), IN_TUNE_CENTS), StringMatch::Matched);
        assert_eq!(match_string(&low_e, Some(&other), IN_TUNE_CENTS), StringMatch::Idle);
        assert_eq!(match_string(&low_e, None, IN_TUNE_CENTS), StringMatch::Idle);
    }

    #[test]
    fn cents_between_octave() {
        assert!((cents_between(880.0, 440.0) - 1200.0).abs() < 1e-9);
    }
}
