//! Sequencer state: patterns, parameters, tempo and transport

use std::sync::Arc;

use super::pattern::Pattern;
use super::track::{Track, TrackParams};
use super::{MAX_TEMPO, MIN_TEMPO, STEPS};
use crate::error::SequencerError;
use crate::synth::SampleBuffer;

/// Default tempo in BPM
pub const DEFAULT_TEMPO: u32 = 120;

/// Pattern and parameters of one grid row
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSlot {
    pub pattern: Pattern,
    pub params: TrackParams,
}

/// Everything the scheduler reads on a tick and the UI writes between ticks
#[derive(Debug, Clone)]
pub struct SequencerState {
    tempo: u32,
    playing: bool,
    current_step: usize,
    selected: Track,
    tracks: [TrackSlot; 4],
    sample: Option<Arc<SampleBuffer>>,
}

impl SequencerState {
    /// Default parameters, all gates off, transport stopped.
    ///
    /// The play head rests on the last step so the first tick lands on step 0.
    pub fn new() -> Self {
        Self {
            tempo: DEFAULT_TEMPO,
            playing: false,
            current_step: STEPS - 1,
            selected: Track::default(),
            tracks: Track::ALL.map(|track| TrackSlot {
                pattern: Pattern::new(),
                params: TrackParams::default_for(track),
            }),
            sample: None,
        }
    }

    pub fn tempo(&self) -> u32 {
        self.tempo
    }

    /// Set the tempo, clamped to the supported range. Returns the applied value.
    pub fn set_tempo(&mut self, bpm: u32) -> u32 {
        self.tempo = bpm.clamp(MIN_TEMPO, MAX_TEMPO);
        self.tempo
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Move the play head one step, wrapping at the end of the grid
    pub fn advance(&mut self) -> usize {
        self.current_step = (self.current_step + 1) % STEPS;
        self.current_step
    }

    pub fn selected(&self) -> Track {
        self.selected
    }

    /// Choose which track feeds the waveform display
    pub fn select(&mut self, track: Track) {
        self.selected = track;
    }

    pub fn pattern(&self, track: Track) -> Pattern {
        self.tracks[track.index()].pattern
    }

    /// Replace a whole pattern
    pub fn set_pattern(&mut self, track: Track, pattern: Pattern) {
        self.tracks[track.index()].pattern = pattern;
    }

    /// Flip one gate. Returns the new gate value.
    pub fn toggle(&mut self, track: Track, step: usize) -> Result<bool, SequencerError> {
        let slot = &mut self.tracks[track.index()];
        let next = slot.pattern.toggled(step)?;
        slot.pattern = next;
        next.gate(step)
    }

    pub fn params(&self, track: Track) -> TrackParams {
        self.tracks[track.index()].params
    }

    /// Replace a whole parameter record after validating it
    pub fn set_params(&mut self, params: TrackParams) -> Result<(), SequencerError> {
        params.validate()?;
        self.tracks[params.track().index()].params = params;
        Ok(())
    }

    /// Set one named parameter of one track
    pub fn set_parameter(
        &mut self,
        track: Track,
        name: &str,
        value: f64,
    ) -> Result<(), SequencerError> {
        self.tracks[track.index()].params.set(name, value)
    }

    /// Move one parameter by `steps` UI increments, clamped to its range.
    /// Returns the applied value.
    pub fn nudge_parameter(
        &mut self,
        track: Track,
        name: &str,
        steps: i32,
    ) -> Result<f64, SequencerError> {
        let spec = track.param(name)?;
        let params = &mut self.tracks[track.index()].params;
        let current = params.get(spec.name).unwrap_or(spec.min);
        // Round away float drift from repeated 0.1 steps.
        let raw = current + spec.step * steps as f64;
        let value = ((raw / spec.step).round() * spec.step).clamp(spec.min, spec.max);
        params.set(spec.name, value)?;
        Ok(value)
    }

    pub fn slot(&self, track: Track) -> &TrackSlot {
        &self.tracks[track.index()]
    }

    pub fn sample(&self) -> Option<&Arc<SampleBuffer>> {
        self.sample.as_ref()
    }

    /// Swap the sample used by the sample track; `None` makes its gates inert
    pub fn set_sample(&mut self, sample: Option<Arc<SampleBuffer>>) {
        self.sample = sample;
    }
}

impl Default for SequencerState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::{NoiseParams, SweepParams};

    #[test]
    fn test_initial_state() {
        let state = SequencerState::new();
        assert_eq!(state.tempo(), DEFAULT_TEMPO);
        assert!(!state.is_playing());
        assert_eq!(state.selected(), Track::Sweep);
        assert_eq!(state.current_step(), STEPS - 1);
        assert!(state.sample().is_none());
        for track in Track::ALL {
            assert_eq!(state.pattern(track), Pattern::new());
            assert_eq!(state.params(track), TrackParams::default_for(track));
        }
    }

    #[test]
    fn test_tempo_is_clamped() {
        let mut state = SequencerState::new();
        assert_eq!(state.set_tempo(30), MIN_TEMPO);
        assert_eq!(state.set_tempo(500), MAX_TEMPO);
        assert_eq!(state.set_tempo(150), 150);
        assert_eq!(state.tempo(), 150);
    }

    #[test]
    fn test_advance_wraps() {
        let mut state = SequencerState::new();
        assert_eq!(state.advance(), 0);
        for k in 1..=40 {
            assert_eq!(state.advance(), k % STEPS);
        }
    }

    #[test]
    fn test_toggle_only_touches_one_track() {
        let mut state = SequencerState::new();
        assert!(state.toggle(Track::Noise, 4).unwrap());
        assert!(state.pattern(Track::Noise).gate(4).unwrap());
        assert_eq!(state.pattern(Track::Sweep), Pattern::new());
        assert!(!state.toggle(Track::Noise, 4).unwrap());
        assert_eq!(state.pattern(Track::Noise), Pattern::new());
        assert!(state.toggle(Track::Noise, 16).is_err());
    }

    #[test]
    fn test_set_parameter_routes_to_track() {
        let mut state = SequencerState::new();
        state.set_parameter(Track::Noise, "band_hz", 600.0).unwrap();
        assert_eq!(
            state.params(Track::Noise),
            TrackParams::Noise(NoiseParams {
                duration: 1.0,
                band_hz: 600.0
            })
        );
        assert!(state.set_parameter(Track::Sweep, "band_hz", 600.0).is_err());
        assert!(state.set_parameter(Track::Noise, "band_hz", 6000.0).is_err());
        assert_eq!(state.params(Track::Noise).get("band_hz"), Some(600.0));
    }

    #[test]
    fn test_set_params_validates() {
        let mut state = SequencerState::new();
        let bad = TrackParams::Sweep(SweepParams {
            attack: 2.0,
            release: 0.0,
        });
        assert!(state.set_params(bad).is_err());
        assert_eq!(state.params(Track::Sweep), TrackParams::default_for(Track::Sweep));
    }

    #[test]
    fn test_nudge_parameter_clamps_and_snaps() {
        let mut state = SequencerState::new();
        assert!((state.nudge_parameter(Track::Sweep, "attack", 1).unwrap() - 0.3).abs() < 1e-9);
        assert_eq!(state.nudge_parameter(Track::Sweep, "attack", 50).unwrap(), 1.0);
        assert_eq!(state.nudge_parameter(Track::Sweep, "attack", -50).unwrap(), 0.0);
        assert_eq!(state.nudge_parameter(Track::Pulse, "frequency", -1).unwrap(), 870.0);
        assert!(state.nudge_parameter(Track::Pulse, "attack", 1).is_err());
    }

    #[test]
    fn test_sample_slot() {
        let mut state = SequencerState::new();
        let buffer = Arc::new(SampleBuffer::new(vec![0.0; 4], 44100).unwrap());
        state.set_sample(Some(buffer.clone()));
        assert!(Arc::ptr_eq(state.sample().unwrap(), &buffer));
        state.set_sample(None);
        assert!(state.sample().is_none());
    }
}
