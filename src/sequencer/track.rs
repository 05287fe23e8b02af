//! Track identity and per-track parameter records

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SequencerError;

/// The four fixed tracks
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Track {
    #[default]
    Sweep,
    Pulse,
    Noise,
    Sample,
}

impl Track {
    /// All tracks in grid order
    pub const ALL: [Track; 4] = [Track::Sweep, Track::Pulse, Track::Noise, Track::Sample];

    /// Row index in the grid
    pub fn index(self) -> usize {
        match self {
            Track::Sweep => 0,
            Track::Pulse => 1,
            Track::Noise => 2,
            Track::Sample => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Track::Sweep => "sweep",
            Track::Pulse => "pulse",
            Track::Noise => "noise",
            Track::Sample => "sample",
        }
    }

    /// Declared parameters for this track
    pub fn params(self) -> &'static [ParamSpec] {
        match self {
            Track::Sweep => &SWEEP_SPECS,
            Track::Pulse => &PULSE_SPECS,
            Track::Noise => &NOISE_SPECS,
            Track::Sample => &SAMPLE_SPECS,
        }
    }

    /// Look up one declared parameter by name
    pub fn param(self, name: &str) -> Result<&'static ParamSpec, SequencerError> {
        self.params()
            .iter()
            .find(|spec| spec.name == name)
            .ok_or_else(|| SequencerError::UnknownParameter {
                track: self,
                name: name.to_string(),
            })
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Track {
    type Err = SequencerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Track::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SequencerError::UnknownTrack(s.to_string()))
    }
}

/// Name, valid range and UI step of one track parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ParamSpec {
    const fn new(name: &'static str, min: f64, max: f64, step: f64) -> Self {
        Self {
            name,
            min,
            max,
            step,
        }
    }

    /// Accept `value` only if it is finite and inside the declared range
    pub fn check(&self, track: Track, value: f64) -> Result<f64, SequencerError> {
        if value.is_finite() && (self.min..=self.max).contains(&value) {
            Ok(value)
        } else {
            Err(SequencerError::OutOfRange {
                track,
                name: self.name,
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

const SWEEP_SPECS: [ParamSpec; 2] = [
    ParamSpec::new("attack", 0.0, 1.0, 0.1),
    ParamSpec::new("release", 0.0, 1.0, 0.1),
];

const PULSE_SPECS: [ParamSpec; 2] = [
    ParamSpec::new("frequency", 660.0, 1320.0, 10.0),
    ParamSpec::new("lfo_rate", 20.0, 40.0, 1.0),
];

const NOISE_SPECS: [ParamSpec; 2] = [
    ParamSpec::new("duration", 0.0, 2.0, 0.1),
    ParamSpec::new("band_hz", 400.0, 1200.0, 10.0),
];

const SAMPLE_SPECS: [ParamSpec; 1] = [ParamSpec::new("playback_rate", 0.1, 2.0, 0.1)];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepParams {
    /// Seconds from silence to full level
    pub attack: f64,
    /// Seconds of fade before the fixed note end
    pub release: f64,
}

impl Default for SweepParams {
    fn default() -> Self {
        Self {
            attack: 0.2,
            release: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseParams {
    /// Carrier frequency in Hz
    pub frequency: f64,
    /// Tremolo rate in Hz
    pub lfo_rate: f64,
}

impl Default for PulseParams {
    fn default() -> Self {
        Self {
            frequency: 880.0,
            lfo_rate: 30.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseParams {
    /// Burst length in seconds
    pub duration: f64,
    /// Band-pass centre in Hz
    pub band_hz: f64,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            duration: 1.0,
            band_hz: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleParams {
    /// Playback speed multiplier
    pub playback_rate: f64,
}

impl Default for SampleParams {
    fn default() -> Self {
        Self { playback_rate: 1.0 }
    }
}

/// Parameters of one track, tagged by track
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackParams {
    Sweep(SweepParams),
    Pulse(PulseParams),
    Noise(NoiseParams),
    Sample(SampleParams),
}

impl TrackParams {
    /// Default parameters for `track`
    pub fn default_for(track: Track) -> Self {
        match track {
            Track::Sweep => TrackParams::Sweep(SweepParams::default()),
            Track::Pulse => TrackParams::Pulse(PulseParams::default()),
            Track::Noise => TrackParams::Noise(NoiseParams::default()),
            Track::Sample => TrackParams::Sample(SampleParams::default()),
        }
    }

    pub fn track(&self) -> Track {
        match self {
            TrackParams::Sweep(_) => Track::Sweep,
            TrackParams::Pulse(_) => Track::Pulse,
            TrackParams::Noise(_) => Track::Noise,
            TrackParams::Sample(_) => Track::Sample,
        }
    }

    fn slot(&mut self, name: &str) -> Option<&mut f64> {
        match (self, name) {
            (TrackParams::Sweep(p), "attack") => Some(&mut p.attack),
            (TrackParams::Sweep(p), "release") => Some(&mut p.release),
            (TrackParams::Pulse(p), "frequency") => Some(&mut p.frequency),
            (TrackParams::Pulse(p), "lfo_rate") => Some(&mut p.lfo_rate),
            (TrackParams::Noise(p), "duration") => Some(&mut p.duration),
            (TrackParams::Noise(p), "band_hz") => Some(&mut p.band_hz),
            (TrackParams::Sample(p), "playback_rate") => Some(&mut p.playback_rate),
            _ => None,
        }
    }

    /// Read a parameter by name
    pub fn get(&self, name: &str) -> Option<f64> {
        let mut copy = *self;
        copy.slot(name).map(|v| *v)
    }

    /// Set a parameter by name, refusing unknown names and out-of-range values
    pub fn set(&mut self, name: &str, value: f64) -> Result<(), SequencerError> {
        let track = self.track();
        let spec = track.param(name)?;
        let value = spec.check(track, value)?;
        match self.slot(spec.name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(SequencerError::UnknownParameter {
                track,
                name: name.to_string(),
            }),
        }
    }

    /// Check every parameter against its declared range
    pub fn validate(&self) -> Result<(), SequencerError> {
        let track = self.track();
        for spec in track.params() {
            if let Some(value) = self.get(spec.name) {
                spec.check(track, value)?;
            }
        }
        Ok(())
    }
}
