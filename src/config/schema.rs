//! Configuration schema definitions

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::sequencer::{
    NoiseParams, Pattern, PulseParams, SampleParams, SweepParams, Track, TrackParams,
    DEFAULT_TEMPO, MAX_TEMPO, MIN_TEMPO,
};

/// Main configuration for stepwave
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepwaveConfig {
    /// Audio output settings
    #[serde(default)]
    pub audio: AudioConfig,

    /// Master output settings
    #[serde(default)]
    pub master: MasterConfig,

    /// Tempo, selection and starting patterns
    #[serde(default)]
    pub sequencer: SequencerConfig,

    /// Per-track sound parameters
    #[serde(default)]
    pub tracks: TracksConfig,
}

impl StepwaveConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.audio.sample_rate < 8000 || self.audio.sample_rate > 192000 {
            bail!("Sample rate must be between 8000 and 192000");
        }
        if self.audio.buffer_size < 64 || self.audio.buffer_size > 8192 {
            bail!("Buffer size must be between 64 and 8192");
        }

        if !(0.0..=1.0).contains(&self.master.volume) {
            bail!("Master volume must be between 0.0 and 1.0");
        }

        if self.sequencer.tempo < MIN_TEMPO || self.sequencer.tempo > MAX_TEMPO {
            bail!("Tempo must be between {} and {} BPM", MIN_TEMPO, MAX_TEMPO);
        }

        self.patterns()?;

        for params in self.tracks.params() {
            params
                .validate()
                .with_context(|| format!("invalid [tracks.{}] settings", params.track()))?;
        }

        Ok(())
    }

    /// Parse the configured starting patterns
    pub fn patterns(&self) -> Result<Vec<(Track, Pattern)>> {
        self.sequencer
            .patterns
            .iter()
            .map(|(track, text)| {
                let pattern = text
                    .parse::<Pattern>()
                    .with_context(|| format!("invalid pattern for track '{}'", track))?;
                Ok((*track, pattern))
            })
            .collect()
    }
}

/// Audio output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Sample rate for offline rendering in Hz (default: 44100).
    /// Live playback uses the device rate.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Offline render block size in samples (default: 512)
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Output device name (None = default device)
    #[serde(default)]
    pub device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            buffer_size: default_buffer_size(),
            device: None,
        }
    }
}

fn default_sample_rate() -> u32 { 44100 }
fn default_buffer_size() -> usize { 512 }

/// Master settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasterConfig {
    /// Master volume 0.0-1.0 (default: 0.8)
    #[serde(default = "default_volume")]
    pub volume: f32,
}

impl Default for MasterConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
        }
    }
}

fn default_volume() -> f32 { 0.8 }

/// Sequencer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequencerConfig {
    /// Beats per minute, one step per beat (default: 120)
    #[serde(default = "default_tempo")]
    pub tempo: u32,

    /// Track shown in the waveform display (default: sweep)
    #[serde(default)]
    pub selected: Track,

    /// Starting patterns, e.g. `sweep: "x...x...x...x..."`
    #[serde(default)]
    pub patterns: BTreeMap<Track, String>,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            tempo: default_tempo(),
            selected: Track::default(),
            patterns: BTreeMap::new(),
        }
    }
}

fn default_tempo() -> u32 { DEFAULT_TEMPO }

/// Per-track parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TracksConfig {
    #[serde(default)]
    pub sweep: SweepParams,

    #[serde(default)]
    pub pulse: PulseParams,

    #[serde(default)]
    pub noise: NoiseParams,

    #[serde(default)]
    pub sample: SampleConfig,
}

impl TracksConfig {
    /// Parameter records for all four tracks, in grid order
    pub fn params(&self) -> [TrackParams; 4] {
        [
            TrackParams::Sweep(self.sweep),
            TrackParams::Pulse(self.pulse),
            TrackParams::Noise(self.noise),
            TrackParams::Sample(SampleParams {
                playback_rate: self.sample.playback_rate,
            }),
        ]
    }
}

/// Sample track settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleConfig {
    /// Playback speed multiplier (default: 1.0)
    #[serde(default = "default_playback_rate")]
    pub playback_rate: f64,

    /// WAV file to load (None = sample gates stay silent)
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            playback_rate: default_playback_rate(),
            path: None,
        }
    }
}

fn default_playback_rate() -> f64 { 1.0 }
