//! # Configuration Module
//!
//! User-adjustable settings for capture, display and reference tones,
//! stored as JSON. Every field has a default, so a partial file (or no
//! file at all) is valid. The estimator's own thresholds are fixed and
//! are not part of this configuration.

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::audio::BUFFER_SIZE;
use crate::tuning::IN_TUNE_CENTS;

/// Default file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "tuner_config.json";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunerConfig {
    pub capture: CaptureSettings,
    pub display: DisplaySettings,
    pub reference: ReferenceSettings,
}

/// Microphone capture settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Preferred sample rate in Hz; the nearest supported rate is used.
    pub sample_rate: u32,
    /// Samples per analysis frame.
    pub buffer_size: usize,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            buffer_size: BUFFER_SIZE,
        }
    }
}

/// Display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Readings with `|cents|` below this are shown as in tune.
    pub in_tune_cents: i32,
    /// GUI refresh interval in milliseconds.
    pub refresh_ms: u64,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            in_tune_cents: IN_TUNE_CENTS,
            refresh_ms: 16,
        }
    }
}

/// Reference tone envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceSettings {
    /// Starting gain.
    pub gain: f64,
    /// Gain reached at the end of the fade.
    pub fade_to: f64,
    /// Length of the exponential fade in seconds.
    pub fade_secs: f64,
    /// Total tone length in seconds.
    pub duration_secs: f64,
}

impl Default for ReferenceSettings {
    fn default() -> Self {
        Self {
            gain: 0.3,
            fade_to: 0.01,
            fade_secs: 1.5,
            duration_secs: 2.5,
        }
    }
}

impl TunerConfig {
    /// Reads a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&data)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Like [`TunerConfig::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("[CONFIG] {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Writes the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("writing config {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("tuner-core-{}-{}", std::process::id(), name))
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: TunerConfig =
            serde_json::from_str(r#"{ "capture": { "buffer_size": 4096 } }"#).unwrap();
        assert_eq!(config.capture.buffer_size, 4096);
        assert_eq!(config.capture.sample_rate, 44100);
        assert_eq!(config.display, DisplaySettings::default());
        assert_eq!(config.reference.gain, 0.3);
    }

    #[test]
    fn save_then_load() {
        let path = temp_path("save.json");
        let mut config = TunerConfig::default();
        config.display.in_tune_cents = 3;
        config.save(&path).unwrap();

        let loaded = TunerConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let path = temp_path("does-not-exist.json");
        assert_eq!(TunerConfig::load_or_default(&path).unwrap(), TunerConfig::default());
        assert!(TunerConfig::load(&path).is_err());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = temp_path("malformed.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(TunerConfig::load_or_default(&path).is_err());
        let _ = fs::remove_file(&path);
    }
}
