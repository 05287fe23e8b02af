//! Harmonic wavetable for the sweep voice
//!
//! The sweep track plays a custom periodic wave described by pairs of
//! cosine (real) and sine (imaginary) harmonic amplitudes. Index 0 is the
//! DC term and is ignored when the table is built.

use std::f64::consts::PI;
use std::sync::{Arc, OnceLock};

/// Number of samples in one rendered cycle
pub const TABLE_SIZE: usize = 2048;

/// Cosine coefficients, one per harmonic
pub const SWEEP_REAL: [f64; 24] = [
    0.0, -0.000000, -0.203569, 0.500000, -0.401676, 0.137128, -0.104117, 0.115965,
    -0.004362, 0.067165, -0.000747, 0.043526, -0.014063, 0.030148, -0.014891, 0.021318,
    -0.007958, 0.015230, -0.005847, 0.011053, -0.004280, 0.008209, -0.003107, 0.006154,
];

/// Sine coefficients, one per harmonic
pub const SWEEP_IMAG: [f64; 24] = [
    0.0, 0.147621, 0.000000, 0.000000, 0.000000, 0.000000, 0.000000, -0.001829,
    0.000000, 0.039260, 0.000000, -0.029114, 0.000000, 0.021734, 0.000000, -0.016408,
    0.000000, 0.012483, 0.000000, -0.009587, 0.000000, 0.007398, 0.000000, -0.005741,
];

/// A single normalized waveform cycle built from harmonic coefficients
#[derive(Debug, Clone)]
pub struct PeriodicWave {
    table: Vec<f64>,
}

impl PeriodicWave {
    /// Build a cycle from cosine/sine harmonic amplitudes.
    ///
    /// The shorter of the two slices bounds the harmonic count. The result is
    /// scaled so its peak magnitude is 1; an all-zero spectrum stays silent.
    pub fn new(real: &[f64], imag: &[f64]) -> Self {
        let harmonics = real.len().min(imag.len());
        let mut table: Vec<f64> = (0..TABLE_SIZE)
            .map(|i| {
                let phase = 2.0 * PI * i as f64 / TABLE_SIZE as f64;
                (1..harmonics)
                    .map(|k| {
                        let kp = k as f64 * phase;
                        real[k] * kp.cos() + imag[k] * kp.sin()
                    })
                    .sum()
            })
            .collect();

        let peak = table.iter().fold(0.0f64, |acc, s| acc.max(s.abs()));
        if peak > 0.0 {
            for sample in &mut table {
                *sample /= peak;
            }
        }

        Self { table }
    }

    /// Read the cycle at `phase` in [0, 1) with linear interpolation
    pub fn sample(&self, phase: f64) -> f64 {
        let pos = phase.rem_euclid(1.0) * TABLE_SIZE as f64;
        let idx = pos as usize % TABLE_SIZE;
        let next = (idx + 1) % TABLE_SIZE;
        let frac = pos - pos.floor();
        self.table[idx] * (1.0 - frac) + self.table[next] * frac
    }
}

/// The shared wave used by every sweep note
pub fn sweep_wave() -> Arc<PeriodicWave> {
    static WAVE: OnceLock<Arc<PeriodicWave>> = OnceLock::new();
    WAVE.get_or_init(|| Arc::new(PeriodicWave::new(&SWEEP_REAL, &SWEEP_IMAG)))
        .clone()
}
