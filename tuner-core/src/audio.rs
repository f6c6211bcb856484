//! # Audio Capture Module
//!
//! This module handles real-time microphone capture using CPAL (Cross-Platform Audio Library).
//! Incoming callback data is downmixed to mono, cut into fixed-size frames and
//! sent to the analysis thread over a crossbeam channel.
//!
//! ## Features
//! - Default input device selection
//! - Nearest supported sample rate, mono preferred
//! - Interleaved multi-channel downmix
//! - Non-blocking frame hand-off (frames are dropped if the consumer lags)

use anyhow::{Result, anyhow};
use cpal::SupportedStreamConfigRange;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use log::{error, info, trace};

use crate::config::CaptureSettings;

/// Default number of samples per analysis frame.
///
/// 2048 samples is about 46 ms at 44.1 kHz, enough for several periods of
/// the low E string.
pub const BUFFER_SIZE: usize = 2048;

/// Frames that may wait for analysis before new ones are dropped.
pub const FRAME_QUEUE_DEPTH: usize = 4;

/// Creates the bounded channel that carries frames from the capture callback.
pub fn frame_channel() -> (Sender<Vec<f32>>, Receiver<Vec<f32>>) {
    crossbeam_channel::bounded(FRAME_QUEUE_DEPTH)
}

/// Collects interleaved callback data into mono frames of a fixed length.
#[derive(Debug)]
pub struct FrameAccumulator {
    frame_size: usize,
    pending: Vec<f32>,
}

impl FrameAccumulator {
    pub fn new(frame_size: usize) -> Self {
        Self {
            frame_size: frame_size.max(1),
            pending: Vec::with_capacity(frame_size * 2),
        }
    }

    /// Appends `data` (interleaved, `channels` wide) and hands every
    /// completed frame to `emit`. A trailing partial frame is kept for the
    /// next call.
    pub fn push(&mut self, data: &[f32], channels: usize, mut emit: impl FnMut(Vec<f32>)) {
        let channels = channels.max(1);
        if channels == 1 {
            self.pending.extend_from_slice(data);
        } else {
            self.pending.extend(
                data.chunks_exact(channels)
                    .map(|frame| frame.iter().sum::<f32>() / channels as f32),
            );
        }

        while self.pending.len() >= self.frame_size {
            let frame: Vec<f32> = self.pending.drain(..self.frame_size).collect();
            emit(frame);
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Non-blocking sender used inside the capture callback.
///
/// Frames that do not fit in the channel are counted and discarded.
#[derive(Debug)]
pub struct FrameForwarder {
    sender: Sender<Vec<f32>>,
    dropped: u64,
}

impl FrameForwarder {
    pub fn new(sender: Sender<Vec<f32>>) -> Self {
        Self { sender, dropped: 0 }
    }

    /// Returns `true` if the frame was queued.
    pub fn forward(&mut self, frame: Vec<f32>) -> bool {
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                self.dropped += 1;
                trace!("[AUDIO] Analysis behind, {} frame(s) dropped so far", self.dropped);
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

/// Starts audio capture from the default input device.
///
/// # Arguments
/// * `sender` - Sender half of [`frame_channel`], read by the analysis thread
/// * `settings` - Preferred sample rate and frame size
///
/// # Returns
/// * `Ok((stream, sample_rate))` - Running stream handle and the actual sample rate
/// * `Err(e)` - No device, no f32 format, or the stream failed to start
///
/// The stream stops when the returned handle is dropped.
pub fn start_audio_capture(
    sender: Sender<Vec<f32>>,
    settings: &CaptureSettings,
) -> Result<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow!("No input device available"))?;

    info!("[AUDIO] Using audio input device: {}", device.name()?);

    let configs = device.supported_input_configs()?.collect::<Vec<_>>();
    let supported_config = find_supported_config(configs, settings.sample_rate)
        .ok_or_else(|| anyhow!("No suitable f32 input format found"))?;

    let sample_rate = supported_config
        .max_sample_rate()
        .0
        .min(settings.sample_rate.max(supported_config.min_sample_rate().0));
    let config: cpal::StreamConfig = supported_config
        .with_sample_rate(cpal::SampleRate(sample_rate))
        .into();
    let channels = config.channels as usize;

    info!(
        "[AUDIO] Selected sample rate: {} Hz, {} channel(s), {} samples per frame",
        sample_rate, channels, settings.buffer_size
    );

    let err_fn = |err| error!("[AUDIO] An error occurred on the audio stream: {}", err);

    let mut accumulator = FrameAccumulator::new(settings.buffer_size);
    let mut forwarder = FrameForwarder::new(sender);
    let stream = device.build_input_stream(
        &config,
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            accumulator.push(data, channels, |frame| {
                forwarder.forward(frame);
            });
        },
        err_fn,
        None,
    )?;

    stream.play()?;

    Ok((stream, sample_rate))
}

/// Finds the best supported input configuration for the target sample rate.
///
/// Only 32-bit float formats qualify. Mono is preferred over multi-channel,
/// then the range closest to `target_rate` wins.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.sample_format() == cpal::SampleFormat::F32)
        .min_by_key(|c| {
            let min = c.min_sample_rate().0;
            let max = c.max_sample_rate().0;
            let distance = if target_rate < min {
                min - target_rate
            } else {
                target_rate.saturating_sub(max)
            };
            (c.channels() != 1, distance)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_full_frames_and_keeps_the_rest() {
        let mut acc = FrameAccumulator::new(4);
        let mut frames = Vec::new();
        acc.push(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 1, |f| frames.push(f));
        assert_eq!(frames, vec![vec![1.0, 2.0, 3.0, 4.0]]);
        assert_eq!(acc.pending_len(), 2);

        acc.push(&[7.0, 8.0, 9.0], 1, |f| frames.push(f));
        assert_eq!(frames[1], vec![5.0, 6.0, 7.0, 8.0]);
        assert_eq!(acc.pending_len(), 1);
    }

    #[test]
    fn averages_interleaved_channels() {
        let mut acc = FrameAccumulator::new(2);
        let mut frames = Vec::new();
        acc.push(&[1.0, 3.0, -1.0, -3.0], 2, |f| frames.push(f));
        assert_eq!(frames, vec![vec![2.0, -2.0]]);
    }

    #[test]
    fn lagging_consumer_loses_frames_instead_of_queueing_them() {
        let (tx, rx) = frame_channel();
        let mut forwarder = FrameForwarder::new(tx);
        let mut acc = FrameAccumulator::new(2);
        let samples = vec![0.25; 2 * (FRAME_QUEUE_DEPTH + 3)];

        acc.push(&samples, 1, |f| {
            forwarder.forward(f);
        });

        assert_eq!(rx.len(), FRAME_QUEUE_DEPTH);
        assert_eq!(forwarder.dropped(), 3);

        // Once the consumer catches up, frames flow again.
        rx.recv().unwrap();
        assert!(forwarder.forward(vec![0.0; 2]));
        assert_eq!(forwarder.dropped(), 3);
    }

    #[test]
    fn closed_channel_is_not_counted_as_a_drop() {
        let (tx, rx) = frame_channel();
        drop(rx);
        let mut forwarder = FrameForwarder::new(tx);
        assert!(!forwarder.forward(vec![0.0; 4]));
        assert_eq!(forwarder.dropped(), 0);
    }

    #[test]
    fn zero_frame_size_is_clamped() {
        let mut acc = FrameAccumulator::new(0);
        let mut count = 0;
        acc.push(&[0.5, 0.5], 1, |_| count += 1);
        assert_eq!(count, 2);
    }
}
