//! Phase-accumulating oscillator

use std::f64::consts::PI;
use std::sync::Arc;

use super::wavetable::PeriodicWave;

/// Waveform types
#[derive(Debug, Clone)]
pub enum Waveform {
    Sine,
    Square,
    /// Custom cycle built from harmonic coefficients
    Periodic(Arc<PeriodicWave>),
}

/// An oscillator that generates one sample per call
pub struct Oscillator {
    waveform: Waveform,
    phase: f64,
    frequency: f64,
    sample_rate: f64,
}

impl Oscillator {
    /// Create a new oscillator
    pub fn new(waveform: Waveform, frequency: f64, sample_rate: f64) -> Self {
        Self {
            waveform,
            phase: 0.0,
            frequency,
            sample_rate,
        }
    }

    /// Generate the next sample
    pub fn generate(&mut self) -> f64 {
        let sample = match &self.waveform {
            Waveform::Sine => (self.phase * 2.0 * PI).sin(),
            Waveform::Square => {
                if self.phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Periodic(wave) => wave.sample(self.phase),
        };

        self.phase += self.frequency / self.sample_rate;
        if self.phase >= 1.0 {
            self.phase -= self.phase.floor();
        }

        sample
    }
}
