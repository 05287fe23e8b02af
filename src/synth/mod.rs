//! Synthesis for the four tracks
//!
//! Each fired gate builds a fresh one-shot voice from the track's parameters
//! and hands it to the output graph.

mod automation;
mod filter;
mod noise;
mod oscillator;
mod pulse;
mod sample;
mod sweep;
mod voice;
mod wavetable;

pub use automation::{Automation, EventKind};
pub use filter::BandPass;
pub use noise::{noise_buffer, NoiseVoice};
pub use oscillator::{Oscillator, Waveform};
pub use pulse::{PulseVoice, PULSE_LENGTH};
pub use sample::{SampleBuffer, SampleVoice};
pub use sweep::{SweepVoice, SWEEP_FREQUENCY, SWEEP_LENGTH};
pub use voice::Voice;
pub use wavetable::{sweep_wave, PeriodicWave, SWEEP_IMAG, SWEEP_REAL};

use std::sync::Arc;

use crate::error::GraphError;
use crate::graph::{AudioGraph, Route};
use crate::sequencer::TrackParams;

/// Build the voice for one fired gate.
///
/// Returns `None` for a sample gate with no sample loaded.
pub fn build_voice(
    params: &TrackParams,
    time: f64,
    sample_rate: u32,
    sample: Option<&Arc<SampleBuffer>>,
) -> Option<Box<dyn Voice>> {
    match params {
        TrackParams::Sweep(p) => Some(Box::new(SweepVoice::new(p, time, sample_rate))),
        TrackParams::Pulse(p) => Some(Box::new(PulseVoice::new(p, time, sample_rate))),
        TrackParams::Noise(p) => Some(Box::new(NoiseVoice::new(p, time, sample_rate))),
        TrackParams::Sample(p) => sample.map(|buffer| {
            Box::new(SampleVoice::new(p, buffer.clone(), time, sample_rate)) as Box<dyn Voice>
        }),
    }
}

/// Fire one note into `graph` at `time`. Returns whether a voice was connected.
pub fn trigger<G: AudioGraph + ?Sized>(
    graph: &G,
    params: &TrackParams,
    time: f64,
    route: Route,
    sample: Option<&Arc<SampleBuffer>>,
) -> Result<bool, GraphError> {
    match build_voice(params, time, graph.sample_rate(), sample) {
        Some(voice) => graph.connect(voice, route).map(|()| true),
        None => Ok(false),
    }
}
