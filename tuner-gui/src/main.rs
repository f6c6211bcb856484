//! # Guitar Tuner GUI
//!
//! Desktop front end for `tuner-core`. It owns the microphone session and
//! shows the live reading next to the six guitar reference strings.
//!
//! ## Architecture
//! - **Main Thread**: Iced GUI application with dark theme
//! - **Audio Thread**: Capture and per-frame analysis, started and stopped on demand
//! - **Communication**: Crossbeam channels for analysis results and shutdown
//! - **Updates**: Timer subscription polls the analysis channel while listening

mod ui;

use cpal::traits::StreamTrait;
use crossbeam_channel::{Receiver, Sender};
use iced::{Element, Subscription, Theme};
use log::{error, info, warn};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use tuner_core::{
    AnalysisResult, SymbolicPitch, analyze_frame, audio,
    config::{CONFIG_FILE, CaptureSettings, TunerConfig},
    tone::{self, ReferenceTone},
    tuning::GUITAR_STRINGS,
};
use ui::main_display::create_main_view;

/// Main entry point for the tuner application.
pub fn main() -> iced::Result {
    init_logging();
    info!("[MAIN] Starting tuner application...");
    let result = iced::application("Guitar Tuner", TunerApp::update, TunerApp::view)
        .subscription(TunerApp::subscription)
        .theme(TunerApp::theme)
        .run();
    info!("[MAIN] Application finished with result: {:?}", result);
    result
}

/// Console logging; `RUST_LOG` overrides the default filter.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,tuner_gui=info,tuner_core=info"));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_names(true)
                .with_level(true),
        )
        .with(filter)
        .init();
}

/// Application message types for the Iced GUI framework.
#[derive(Debug, Clone)]
pub enum Message {
    StartListening,        // Open the microphone and start analysing
    StopListening,         // Close the microphone and clear the reading
    StringSelected(usize), // Reference string pressed (index into GUITAR_STRINGS)
    Tick,                  // Timer tick: drain analysis results
}

/// UI-specific data needed for rendering the interface.
#[derive(Debug, Clone)]
pub struct AppDisplayData {
    pub listening: bool,
    /// Last pitched reading. Silent frames leave it in place.
    pub pitch: Option<SymbolicPitch>,
    pub selected_string: Option<usize>,
    pub in_tune_cents: i32,
    /// One-line error shown under the controls.
    pub status: Option<String>,
}

/// Main application state.
#[derive(Debug)]
struct TunerApp {
    config: TunerConfig,
    audio_worker: Option<AudioWorker>,
    display_data: AppDisplayData,
}

/// Audio worker thread management structure.
#[derive(Debug)]
struct AudioWorker {
    analysis_rx: Receiver<AnalysisResult>, // Results from the audio thread
    shutdown_tx: Sender<()>,               // Channel to send shutdown signal
    thread_handle: Option<JoinHandle<()>>,
}

impl Default for TunerApp {
    fn default() -> Self {
        let config = TunerConfig::load_or_default(CONFIG_FILE).unwrap_or_else(|e| {
            warn!("[MAIN] Ignoring {}: {:#}", CONFIG_FILE, e);
            TunerConfig::default()
        });
        info!("[MAIN] Configuration: {:?}", config);

        Self {
            display_data: AppDisplayData {
                listening: false,
                pitch: None,
                selected_string: None,
                in_tune_cents: config.display.in_tune_cents,
                status: None,
            },
            audio_worker: None,
            config,
        }
    }
}

impl Drop for TunerApp {
    fn drop(&mut self) {
        self.stop_listening();
    }
}

impl TunerApp {
    /// Spawns the audio thread. Does nothing if it is already running.
    fn start_listening(&mut self) {
        if self.audio_worker.is_some() {
            return;
        }

        let (analysis_tx, analysis_rx) = crossbeam_channel::unbounded();
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded(1);
        let settings = self.config.capture.clone();

        let spawned = thread::Builder::new()
            .name("audio".into())
            .spawn(move || run_audio_worker(settings, analysis_tx, shutdown_rx));

        match spawned {
            Ok(handle) => {
                self.audio_worker = Some(AudioWorker {
                    analysis_rx,
                    shutdown_tx,
                    thread_handle: Some(handle),
                });
                self.display_data.listening = true;
                self.display_data.status = None;
            }
            Err(e) => {
                error!("[MAIN] Could not spawn audio thread: {}", e);
                self.display_data.status = Some("Could not start audio".to_string());
            }
        }
    }

    /// Signals the audio thread, waits for it, and clears the reading.
    fn stop_listening(&mut self) {
        if let Some(mut worker) = self.audio_worker.take() {
            info!("[MAIN] Shutting down audio worker...");
            let _ = worker.shutdown_tx.send(());
            if let Some(handle) = worker.thread_handle.take() {
                if handle.join().is_err() {
                    error!("[MAIN] Audio thread panicked");
                }
            }
        }
        self.display_data.listening = false;
        self.display_data.pitch = None;
    }

    fn play_string(&mut self, index: usize) {
        let Some(string) = GUITAR_STRINGS.get(index) else {
            warn!("[MAIN] No reference string at index {}", index);
            return;
        };
        self.display_data.selected_string = Some(index);

        let played = ReferenceTone::for_string(string, &self.config.reference)
            .map_err(anyhow::Error::from)
            .and_then(tone::play_reference_tone);
        if let Err(e) = played {
            error!("[MAIN] Reference tone for {} failed: {:#}", string.label(), e);
        }
    }

    fn update(&mut self, message: Message) {
        match message {
            Message::StartListening => self.start_listening(),
            Message::StopListening => self.stop_listening(),
            Message::StringSelected(index) => self.play_string(index),
            Message::Tick => self.poll_audio_worker(),
        }
    }

    /// Drains pending analysis results and notices a worker that died.
    fn poll_audio_worker(&mut self) {
        let Some(worker) = &self.audio_worker else {
            return;
        };
        let results: Vec<AnalysisResult> = worker.analysis_rx.try_iter().collect();
        let finished = worker
            .thread_handle
            .as_ref()
            .is_some_and(|handle| handle.is_finished());

        for result in results {
            self.process_analysis_result(result);
        }

        if finished {
            warn!("[MAIN] Audio worker exited on its own");
            self.stop_listening();
            self.display_data.status = Some("Microphone unavailable".to_string());
        }
    }

    fn process_analysis_result(&mut self, result: AnalysisResult) {
        if let Some(pitch) = result.pitch {
            self.display_data.pitch = Some(pitch);
        }
    }

    fn view(&self) -> Element<'_, Message> {
        create_main_view(&self.display_data)
    }

    /// Polls for results only while the microphone is open.
    fn subscription(&self) -> Subscription<Message> {
        if self.audio_worker.is_some() {
            let period = Duration::from_millis(self.config.display.refresh_ms.max(1));
            iced::time::every(period).map(|_| Message::Tick)
        } else {
            Subscription::none()
        }
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Body of the audio thread: capture, analyse each frame, forward results.
fn run_audio_worker(
    settings: CaptureSettings,
    analysis_tx: Sender<AnalysisResult>,
    shutdown_rx: Receiver<()>,
) {
    info!("[AUDIO-THREAD] Starting audio capture...");
    let (raw_audio_tx, raw_audio_rx) = audio::frame_channel();
    let (stream, sample_rate) = match audio::start_audio_capture(raw_audio_tx, &settings) {
        Ok(tuple) => tuple,
        Err(e) => {
            error!("[AUDIO-THREAD] Fatal error starting audio: {:#}", e);
            return;
        }
    };

    info!("[AUDIO-THREAD] Entering audio processing loop...");
    loop {
        crossbeam_channel::select! {
            recv(raw_audio_rx) -> msg => match msg {
                Ok(frame) => {
                    let result = analyze_frame(&frame, sample_rate as f64);
                    if analysis_tx.send(result).is_err() {
                        warn!("[AUDIO-THREAD] GUI side closed, stopping");
                        break;
                    }
                }
                Err(_) => {
                    warn!("[AUDIO-THREAD] Audio channel closed");
                    break;
                }
            },
            recv(shutdown_rx) -> _ => {
                info!("[AUDIO-THREAD] Received shutdown signal");
                break;
            },
        }
    }

    if let Err(e) = stream.pause() {
        warn!("[AUDIO-THREAD] Error pausing stream: {}", e);
    }
    drop(stream);
    info!("[AUDIO-THREAD] Audio thread finished");
}
