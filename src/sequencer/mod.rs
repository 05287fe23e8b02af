//! Step sequencer: grid patterns, track parameters, transport and the
//! scheduler that turns them into notes.

mod pattern;
mod scheduler;
mod state;
mod track;

pub use pattern::Pattern;
pub use scheduler::{StepScheduler, TickOutcome};
pub use state::{SequencerState, TrackSlot, DEFAULT_TEMPO};
pub use track::{
    NoiseParams, ParamSpec, PulseParams, SampleParams, SweepParams, Track, TrackParams,
};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Number of steps in the grid
pub const STEPS: usize = 16;

/// Slowest supported tempo in BPM
pub const MIN_TEMPO: u32 = 60;

/// Fastest supported tempo in BPM
pub const MAX_TEMPO: u32 = 240;

/// State shared between the UI, the scheduler and the visualizer
pub type SharedState = Arc<Mutex<SequencerState>>;

/// Milliseconds between scheduler ticks at `tempo` BPM
pub fn tick_period_ms(tempo: u32) -> f64 {
    60_000.0 / tempo.max(1) as f64
}

/// Interval between scheduler ticks at `tempo` BPM
pub fn tick_period(tempo: u32) -> Duration {
    Duration::from_secs_f64(tick_period_ms(tempo) / 1000.0)
}

/// Lock shared state, recovering the data if a holder panicked
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
