//! Step scheduler
//!
//! A coarse timer decides *when to decide*; the audio clock decides when the
//! sound starts. Each tick reads the audio clock once and stamps every note
//! fired on that tick with that time.

use std::sync::Arc;

use tokio::sync::Notify;
use tracing::{debug, info, trace, warn};

use super::{lock, tick_period, SharedState, Track, TrackParams};
use crate::graph::{AudioGraph, GraphState, Route};
use crate::synth;

/// What a single tick did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Transport is stopped
    Idle,
    /// The output graph could not be resumed; retried next tick
    Skipped,
    /// The play head moved to `step` and the listed gates fired at `time`
    Fired {
        step: usize,
        time: f64,
        gated: Vec<Track>,
    },
}

/// Advances the grid and fires notes into an output graph
pub struct StepScheduler<G> {
    state: SharedState,
    graph: G,
    wake: Arc<Notify>,
}

impl<G: Clone> Clone for StepScheduler<G> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            graph: self.graph.clone(),
            wake: self.wake.clone(),
        }
    }
}

impl<G: AudioGraph> StepScheduler<G> {
    /// `wake` must be notified whenever the transport starts
    pub fn new(state: SharedState, graph: G, wake: Arc<Notify>) -> Self {
        Self { state, graph, wake }
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    /// Run one scheduler step
    pub fn tick(&self) -> TickOutcome {
        if !lock(&self.state).is_playing() {
            return TickOutcome::Idle;
        }

        if self.graph.state() != GraphState::Running {
            if let Err(err) = self.graph.resume() {
                warn!(%err, "audio graph unavailable, skipping tick");
                return TickOutcome::Skipped;
            }
        }

        // Snapshot everything the notes need, then release the lock before
        // building voices.
        let (step, time, selected, notes, sample) = {
            let mut state = lock(&self.state);
            if !state.is_playing() {
                return TickOutcome::Idle;
            }
            let time = self.graph.current_time();
            let step = state.advance();
            let notes: Vec<TrackParams> = Track::ALL
                .into_iter()
                .filter(|track| state.pattern(*track).gate(step).unwrap_or(false))
                .map(|track| state.params(track))
                .collect();
            (step, time, state.selected(), notes, state.sample().cloned())
        };

        debug!(step, time, notes = notes.len(), "tick");

        let mut gated = Vec::with_capacity(notes.len());
        for params in &notes {
            let track = params.track();
            gated.push(track);
            let route = Route::for_track(track, selected);
            match synth::trigger(&self.graph, params, time, route, sample.as_ref()) {
                Ok(true) => trace!(%track, step, time, "note"),
                Ok(false) => trace!(%track, step, "gate fired with nothing to play"),
                Err(err) => warn!(%track, %err, "dropped note"),
            }
        }

        TickOutcome::Fired { step, time, gated }
    }

    /// Tick at the tempo-derived cadence until the task is aborted.
    ///
    /// Parks while the transport is stopped. Tempo is re-read every cycle so
    /// changes apply from the next tick.
    pub async fn run(self) {
        info!("scheduler started");
        loop {
            let (playing, tempo) = {
                let state = lock(&self.state);
                (state.is_playing(), state.tempo())
            };

            if !playing {
                self.wake.notified().await;
                continue;
            }

            tokio::time::sleep(tick_period(tempo)).await;
            self.tick();
        }
    }
}
