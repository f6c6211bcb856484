//! # Reference Tone Module
//!
//! Synthesises and plays the short reference note for a guitar string: a
//! triangle wave whose gain falls exponentially from the start level to the
//! fade level, holds there, and stops when the tone ends.

use anyhow::{Result, anyhow};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{error, info};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::ReferenceSettings;
use crate::error::TuningError;
use crate::tuning::GuitarString;

/// A single reference note with its gain envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTone {
    frequency: f64,
    gain: f64,
    fade_to: f64,
    fade_secs: f64,
    duration_secs: f64,
}

impl ReferenceTone {
    /// Builds a tone at `frequency` Hz with the envelope from `settings`.
    pub fn new(frequency: f64, settings: &ReferenceSettings) -> Result<Self, TuningError> {
        check_positive("frequency", frequency)?;
        check_positive("gain", settings.gain)?;
        check_positive("fade level", settings.fade_to)?;
        check_positive("fade time", settings.fade_secs)?;
        check_positive("duration", settings.duration_secs)?;

        Ok(Self {
            frequency,
            gain: settings.gain,
            fade_to: settings.fade_to,
            fade_secs: settings.fade_secs,
            duration_secs: settings.duration_secs,
        })
    }

    pub fn for_string(string: &GuitarString, settings: &ReferenceSettings) -> Result<Self, TuningError> {
        Self::new(string.frequency, settings)
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_secs)
    }

    /// Envelope gain at `t` seconds. Zero outside the tone.
    pub fn gain_at(&self, t: f64) -> f64 {
        if !(0.0..self.duration_secs).contains(&t) {
            0.0
        } else if t < self.fade_secs {
            self.gain * (self.fade_to / self.gain).powf(t / self.fade_secs)
        } else {
            self.fade_to
        }
    }

    /// Output sample at `t` seconds, envelope applied.
    pub fn sample(&self, t: f64) -> f32 {
        (triangle((t * self.frequency).fract()) * self.gain_at(t)) as f32
    }

    /// Renders the whole tone as mono samples.
    pub fn render(&self, sample_rate: u32) -> Result<Vec<f32>, TuningError> {
        check_positive("sample rate", sample_rate as f64)?;
        let len = (self.duration_secs * sample_rate as f64).round() as usize;
        Ok((0..len)
            .map(|i| self.sample(i as f64 / sample_rate as f64))
            .collect())
    }
}

fn check_positive(what: &'static str, value: f64) -> Result<(), TuningError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TuningError::InvalidReference { what, value })
    }
}

/// Unit triangle wave starting at zero and rising, `phase` in `[0, 1)`.
fn triangle(phase: f64) -> f64 {
    if phase < 0.25 {
        4.0 * phase
    } else if phase < 0.75 {
        2.0 - 4.0 * phase
    } else {
        4.0 * phase - 4.0
    }
}

/// Plays `tone` on the default output device from a background thread.
///
/// The output stream lives only on that thread and is dropped once the
/// tone has finished. Device errors inside the thread are logged.
pub fn play_reference_tone(tone: ReferenceTone) -> Result<JoinHandle<()>> {
    let handle = thread::Builder::new()
        .name("reference-tone".into())
        .spawn(move || {
            if let Err(e) = run_output(&tone) {
                error!("[TONE] Could not play {:.2} Hz: {:#}", tone.frequency(), e);
            }
        })?;
    Ok(handle)
}

fn run_output(tone: &ReferenceTone) -> Result<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow!("No output device available"))?;
    let supported = device.default_output_config()?;
    if supported.sample_format() != cpal::SampleFormat::F32 {
        return Err(anyhow!("Unsupported sample format {}", supported.sample_format()));
    }

    let sample_rate = supported.sample_rate().0;
    let config: cpal::StreamConfig = supported.into();
    let channels = config.channels as usize;
    let samples = tone.render(sample_rate)?;

    info!(
        "[TONE] Playing {:.2} Hz for {:?} at {} Hz",
        tone.frequency(),
        tone.duration(),
        sample_rate
    );

    let mut cursor = 0usize;
    let stream = device.build_output_stream(
        &config,
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            for frame in data.chunks_mut(channels) {
                let value = samples.get(cursor).copied().unwrap_or(0.0);
                frame.fill(value);
                cursor += 1;
            }
        },
        |err| error!("[TONE] An error occurred on the output stream: {}", err),
        None,
    )?;
    stream.play()?;

    // Leave headroom for the device to drain its last buffer.
    thread::sleep(tone.duration() + Duration::from_millis(100));
    drop(stream);
    Ok(())
}
