//! stepwave - four-track step sequencer
//!
//! A 16-step grid drives four synthesized tracks (a wavetable sweep, an
//! LFO-gated pulse, band-passed noise and a sample player). Notes are
//! stamped with the audio clock when the scheduler fires them, and the
//! selected track is tapped for a live waveform.

pub mod config;
pub mod engine;
pub mod error;
pub mod graph;
pub mod sequencer;
pub mod synth;
pub mod viz;

pub use config::StepwaveConfig;
pub use engine::Engine;
