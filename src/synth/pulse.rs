//! Pulse voice: sine tone with square-wave tremolo

use super::oscillator::{Oscillator, Waveform};
use super::Voice;
use crate::sequencer::PulseParams;

/// Fixed note length in seconds
pub const PULSE_LENGTH: f64 = 1.0;

/// Intrinsic gain of the amplifier before LFO modulation
const BASE_GAIN: f64 = 1.0;

/// A single pulse note.
///
/// The LFO output is summed into the amplifier gain, so the tone alternates
/// between `BASE_GAIN + 1` and `BASE_GAIN - 1`. Carrier and LFO are both
/// stopped at the note boundary.
pub struct PulseVoice {
    carrier: Oscillator,
    lfo: Option<Oscillator>,
    start: f64,
    stop: f64,
}

impl PulseVoice {
    /// Build a note that starts at `time`
    pub fn new(params: &PulseParams, time: f64, sample_rate: u32) -> Self {
        let sr = sample_rate as f64;
        Self {
            carrier: Oscillator::new(Waveform::Sine, params.frequency, sr),
            lfo: Some(Oscillator::new(Waveform::Square, params.lfo_rate, sr)),
            start: time,
            stop: time + PULSE_LENGTH,
        }
    }

    /// Scheduled start time
    pub fn start_time(&self) -> f64 {
        self.start
    }

    /// Scheduled stop time
    pub fn stop_time(&self) -> f64 {
        self.stop
    }

    /// Whether the LFO is still allocated
    pub fn lfo_running(&self) -> bool {
        self.lfo.is_some()
    }
}

impl Voice for PulseVoice {
    fn render(&mut self, now: f64) -> f64 {
        if now < self.start {
            return 0.0;
        }
        if now >= self.stop {
            self.lfo = None;
            return 0.0;
        }
        let modulation = self.lfo.as_mut().map_or(0.0, Oscillator::generate);
        self.carrier.generate() * (BASE_GAIN + modulation)
    }

    fn is_finished(&self, now: f64) -> bool {
        now >= self.stop
    }

    fn node_count(&self) -> usize {
        // carrier + LFO + amplifier
        3
    }
}
