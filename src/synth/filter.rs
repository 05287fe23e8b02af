//! Band-pass biquad filter
//!
//! RBJ cookbook band-pass (constant 0 dB peak gain), run in Direct Form II
//! transposed.

use std::f64::consts::PI;

/// Default quality factor for the noise band
pub const DEFAULT_Q: f64 = 1.0;

#[derive(Debug, Clone, Copy)]
struct Coefficients {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

/// Band-pass filter centred on a single frequency
#[derive(Debug, Clone)]
pub struct BandPass {
    sample_rate: f64,
    center: f64,
    q: f64,
    coeffs: Coefficients,
    z1: f64,
    z2: f64,
}

impl BandPass {
    /// Create a filter centred at `center` Hz with the default Q
    pub fn new(sample_rate: f64, center: f64) -> Self {
        Self::with_q(sample_rate, center, DEFAULT_Q)
    }

    /// Create a filter with an explicit quality factor
    pub fn with_q(sample_rate: f64, center: f64, q: f64) -> Self {
        let mut filter = Self {
            sample_rate,
            // Keep the centre inside (0, Nyquist) so the coefficients stay stable.
            center: center.clamp(10.0, sample_rate * 0.49),
            q: q.clamp(0.1, 20.0),
            coeffs: Coefficients {
                b0: 1.0,
                b1: 0.0,
                b2: 0.0,
                a1: 0.0,
                a2: 0.0,
            },
            z1: 0.0,
            z2: 0.0,
        };
        filter.calculate_coefficients();
        filter
    }

    /// Centre frequency in Hz
    pub fn center(&self) -> f64 {
        self.center
    }

    /// Quality factor
    pub fn q(&self) -> f64 {
        self.q
    }

    fn calculate_coefficients(&mut self) {
        let omega = 2.0 * PI * self.center / self.sample_rate;
        let alpha = omega.sin() / (2.0 * self.q);
        let a0 = 1.0 + alpha;

        self.coeffs = Coefficients {
            b0: alpha / a0,
            b1: 0.0,
            b2: -alpha / a0,
            a1: -2.0 * omega.cos() / a0,
            a2: (1.0 - alpha) / a0,
        };
    }

    /// Process a single sample
    pub fn process(&mut self, input: f64) -> f64 {
        let output = self.coeffs.b0 * input + self.z1;
        self.z1 = self.coeffs.b1 * input - self.coeffs.a1 * output + self.z2;
        self.z2 = self.coeffs.b2 * input - self.coeffs.a2 * output;
        output
    }
}
