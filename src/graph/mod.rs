//! Audio output graph
//!
//! The control side schedules one-shot voices against a precise audio clock;
//! the render side mixes them and feeds the analysis tap.

mod analyser;
mod context;

pub use analyser::{Analyser, AnalyserHandle, FFT_SIZE};
pub use context::{AudioContext, Renderer};

use std::sync::Arc;

use crate::error::GraphError;
use crate::sequencer::Track;
use crate::synth::Voice;

/// Lifecycle of the output graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphState {
    Running,
    Suspended,
    Closed,
}

/// Where a voice's output goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Straight to the mix
    Mix,
    /// Into the analyser as well as the mix
    Tapped,
}

impl Route {
    /// Tap `track` only while it is the selected track
    pub fn for_track(track: Track, selected: Track) -> Self {
        if track == selected {
            Route::Tapped
        } else {
            Route::Mix
        }
    }
}

/// What the scheduler and synthesizers need from the output graph
pub trait AudioGraph: Send + Sync {
    /// Output sample rate in Hz
    fn sample_rate(&self) -> u32;

    /// Seconds of audio rendered so far
    fn current_time(&self) -> f64;

    fn state(&self) -> GraphState;

    /// Bring a suspended graph back to running
    fn resume(&self) -> Result<(), GraphError>;

    /// Hand a voice to the renderer
    fn connect(&self, voice: Box<dyn Voice>, route: Route) -> Result<(), GraphError>;
}

impl<G: AudioGraph + ?Sized> AudioGraph for Arc<G> {
    fn sample_rate(&self) -> u32 {
        (**self).sample_rate()
    }

    fn current_time(&self) -> f64 {
        (**self).current_time()
    }

    fn state(&self) -> GraphState {
        (**self).state()
    }

    fn resume(&self) -> Result<(), GraphError> {
        (**self).resume()
    }

    fn connect(&self, voice: Box<dyn Voice>, route: Route) -> Result<(), GraphError> {
        (**self).connect(voice, route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_follows_selection() {
        assert_eq!(Route::for_track(Track::Pulse, Track::Pulse), Route::Tapped);
        assert_eq!(Route::for_track(Track::Pulse, Track::Sweep), Route::Mix);
    }
}
