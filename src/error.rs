//! Error types for the sequencer core

use crate::sequencer::Track;
use thiserror::Error;

/// Errors raised at the sequencer mutation boundary
#[derive(Debug, Error, PartialEq)]
pub enum SequencerError {
    #[error("step {0} is outside the {steps}-step grid", steps = crate::sequencer::STEPS)]
    StepOutOfRange(usize),

    #[error("{track} has no parameter named '{name}'")]
    UnknownParameter { track: Track, name: String },

    #[error("{track}.{name} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        track: Track,
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("unknown track '{0}'")]
    UnknownTrack(String),

    #[error("invalid pattern '{0}': expected 16 steps of 'x' or '.'")]
    InvalidPattern(String),
}

/// Errors raised by the audio output graph
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GraphError {
    #[error("audio context is closed")]
    Closed,

    #[error("render queue is full")]
    QueueFull,
}
