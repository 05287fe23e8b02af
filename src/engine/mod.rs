//! Audio engine for stepwave
//!
//! Ties the shared sequencer state, the output graph and the scheduler
//! together, and is the one place the UI and CLI mutate state through.

mod player;
mod recorder;

pub use player::{default_device_name, list_output_devices, Player};
pub use recorder::{Recorder, RecordingSummary};

use std::sync::{Arc, Mutex};

use anyhow::Result;
use tokio::sync::Notify;
use tracing::{debug, info};

use crate::config::{build_state, StepwaveConfig};
use crate::error::SequencerError;
use crate::graph::{AudioContext, AudioGraph, Renderer};
use crate::sequencer::{lock, tick_period, SequencerState, SharedState, StepScheduler, Track};
use crate::synth::SampleBuffer;
use crate::viz::VisualizationSampler;

/// The main audio engine
pub struct Engine {
    state: SharedState,
    context: AudioContext,
    wake: Arc<Notify>,
}

impl Engine {
    /// Create an engine around an existing state and output graph
    pub fn new(state: SequencerState, context: AudioContext) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            context,
            wake: Arc::new(Notify::new()),
        }
    }

    /// Create an engine with the patterns, parameters and sample from `config`
    pub fn from_config(config: &StepwaveConfig, context: AudioContext) -> Result<Self> {
        let state = build_state(config)?;
        info!(
            tempo = state.tempo(),
            selected = %state.selected(),
            sample = state.sample().is_some(),
            "engine ready"
        );
        Ok(Self::new(state, context))
    }

    pub fn context(&self) -> &AudioContext {
        &self.context
    }

    /// Handle to the shared state, for callers that need to hold the lock
    pub fn shared_state(&self) -> SharedState {
        self.state.clone()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> SequencerState {
        lock(&self.state).clone()
    }

    /// Set the tempo, clamped to 60-240 BPM. Returns the applied value.
    pub fn set_tempo(&self, bpm: u32) -> u32 {
        let applied = lock(&self.state).set_tempo(bpm);
        debug!(requested = bpm, applied, "tempo");
        applied
    }

    /// Flip one gate. Returns the new gate value.
    pub fn toggle_step(&self, track: Track, step: usize) -> Result<bool, SequencerError> {
        lock(&self.state).toggle(track, step)
    }

    pub fn set_parameter(
        &self,
        track: Track,
        name: &str,
        value: f64,
    ) -> Result<(), SequencerError> {
        lock(&self.state).set_parameter(track, name, value)
    }

    /// Move a parameter by `steps` UI increments. Returns the applied value.
    pub fn nudge_parameter(
        &self,
        track: Track,
        name: &str,
        steps: i32,
    ) -> Result<f64, SequencerError> {
        lock(&self.state).nudge_parameter(track, name, steps)
    }

    /// Choose which track feeds the analyser, from the next note on
    pub fn select_track(&self, track: Track) {
        lock(&self.state).select(track);
    }

    /// Start or pause the transport. Pausing leaves sounding notes alone.
    pub fn set_playing(&self, playing: bool) {
        lock(&self.state).set_playing(playing);
        if playing {
            self.wake.notify_one();
        }
        info!(playing, "transport");
    }

    /// Flip the transport. Returns whether it is now playing.
    pub fn toggle_playing(&self) -> bool {
        let playing = !lock(&self.state).is_playing();
        self.set_playing(playing);
        playing
    }

    /// Replace the sample track's buffer; `None` makes sample gates inert
    pub fn load_sample(&self, sample: Option<SampleBuffer>) {
        if let Some(buffer) = &sample {
            info!(
                frames = buffer.len(),
                sample_rate = buffer.sample_rate(),
                "sample loaded"
            );
        }
        lock(&self.state).set_sample(sample.map(Arc::new));
    }

    /// A scheduler bound to this engine's state and output graph
    pub fn scheduler(&self) -> StepScheduler<AudioContext> {
        StepScheduler::new(self.state.clone(), self.context.clone(), self.wake.clone())
    }

    /// A sampler over this engine's analysis tap
    pub fn visualizer(&self) -> VisualizationSampler {
        VisualizationSampler::new(self.context.analyser())
    }

    /// Render `seconds` of audio through `renderer`, ticking the scheduler
    /// from the render clock instead of a timer.
    ///
    /// Blocks of at most `block_size` frames are handed to `sink`. Returns the
    /// number of frames rendered.
    pub fn render_offline<F>(
        &self,
        renderer: &mut Renderer,
        seconds: f64,
        block_size: usize,
        mut sink: F,
    ) -> Result<u64>
    where
        F: FnMut(&[f32]) -> Result<()>,
    {
        self.context.resume()?;

        let sample_rate = renderer.sample_rate();
        let total = (seconds.max(0.0) * sample_rate as f64).round() as u64;
        let scheduler = self.scheduler();
        let mut block = vec![0.0f32; block_size.max(1)];

        let mut rendered = 0u64;
        let mut next_tick = period_frames(lock(&self.state).tempo(), sample_rate);

        while rendered < total {
            if rendered >= next_tick {
                scheduler.tick();
                next_tick += period_frames(lock(&self.state).tempo(), sample_rate);
            }

            let until = next_tick.min(total);
            let len = ((until - rendered) as usize).min(block.len());
            renderer.render(&mut block[..len]);
            sink(&block[..len])?;
            rendered += len as u64;
        }

        debug!(frames = rendered, "offline render finished");
        Ok(rendered)
    }
}

/// Tick period in frames, never zero
fn period_frames(tempo: u32, sample_rate: u32) -> u64 {
    let frames = (tick_period(tempo).as_secs_f64() * sample_rate as f64).round() as u64;
    frames.max(1)
}
