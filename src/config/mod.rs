//! Configuration loading and validation

mod schema;

pub use schema::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::sequencer::SequencerState;
use crate::synth::SampleBuffer;

/// Commented starting configuration written by `stepwave init`
pub const EXAMPLE_CONFIG: &str = include_str!("../../stepwave.example.yaml");

/// Load configuration from a YAML file
pub fn load_config(path: &Path) -> Result<StepwaveConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {:?}", path))?;
    let mut config: StepwaveConfig = serde_yaml::from_str(&contents)
        .with_context(|| format!("failed to parse config: {:?}", path))?;
    config.validate()?;

    // Sample paths are relative to the config file
    if let (Some(sample), Some(dir)) = (config.tracks.sample.path.as_mut(), path.parent()) {
        if sample.is_relative() {
            *sample = dir.join(&*sample);
        }
    }

    Ok(config)
}

/// Load `path` if given, otherwise fall back to defaults
pub fn load_or_default(path: Option<&PathBuf>) -> Result<StepwaveConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(StepwaveConfig::default()),
    }
}

/// Build the starting sequencer state described by `config`
pub fn build_state(config: &StepwaveConfig) -> Result<SequencerState> {
    let mut state = SequencerState::new();
    state.set_tempo(config.sequencer.tempo);
    state.select(config.sequencer.selected);

    for (track, pattern) in config.patterns()? {
        state.set_pattern(track, pattern);
    }
    for params in config.tracks.params() {
        state.set_params(params)?;
    }

    if let Some(path) = &config.tracks.sample.path {
        let buffer = SampleBuffer::from_wav(path)?;
        state.set_sample(Some(Arc::new(buffer)));
    }

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::{Track, TrackParams};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_minimal_config() {
        let yaml = r#"
audio:
  sample_rate: 44100
  buffer_size: 512

master:
  volume: 0.7
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.audio.sample_rate, 44100);
        assert_eq!(config.master.volume, 0.7);
        assert_eq!(config.sequencer.tempo, 120);
    }

    #[test]
    fn test_load_rejects_invalid() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"sequencer:\n  tempo: 20\n").unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_example_config_is_valid() {
        let config: StepwaveConfig = serde_yaml::from_str(EXAMPLE_CONFIG).unwrap();
        config.validate().unwrap();
        assert!(config.tracks.sample.path.is_none());
        build_state(&config).unwrap();
    }

    #[test]
    fn test_build_state() {
        let yaml = r#"
sequencer:
  tempo: 150
  selected: pulse
  patterns:
    pulse: "x.x.x.x.x.x.x.x."
tracks:
  pulse:
    frequency: 1000
"#;
        let config: StepwaveConfig = serde_yaml::from_str(yaml).unwrap();
        let state = build_state(&config).unwrap();

        assert_eq!(state.tempo(), 150);
        assert_eq!(state.selected(), Track::Pulse);
        assert_eq!(state.pattern(Track::Pulse).active_count(), 8);
        assert_eq!(state.pattern(Track::Sweep).active_count(), 0);
        assert_eq!(state.params(Track::Pulse).get("frequency"), Some(1000.0));
        assert_eq!(
            state.params(Track::Noise),
            TrackParams::default_for(Track::Noise)
        );
        assert!(!state.is_playing());
        assert!(state.sample().is_none());
    }

    #[test]
    fn test_sample_path_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let wav = dir.path().join("hit.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&wav, spec).unwrap();
        for _ in 0..100 {
            writer.write_sample(1000i16).unwrap();
        }
        writer.finalize().unwrap();

        let config_path = dir.path().join("stepwave.yaml");
        std::fs::write(&config_path, "tracks:\n  sample:\n    path: hit.wav\n").unwrap();

        let config = load_config(&config_path).unwrap();
        assert_eq!(config.tracks.sample.path, Some(wav));

        let state = build_state(&config).unwrap();
        let sample = state.sample().unwrap();
        assert_eq!(sample.len(), 100);
        assert_eq!(sample.sample_rate(), 22050);
    }
}
