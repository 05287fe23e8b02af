//! Filtered noise burst

use rand::Rng;

use super::filter::BandPass;
use super::Voice;
use crate::sequencer::NoiseParams;

/// Fill a mono buffer of `sample_rate * duration` uniform samples in [-1, 1]
pub fn noise_buffer(sample_rate: u32, duration: f64) -> Vec<f32> {
    let len = (sample_rate as f64 * duration.max(0.0)).floor() as usize;
    let mut rng = rand::thread_rng();
    (0..len).map(|_| rng.gen_range(-1.0f32..=1.0)).collect()
}

/// One noise burst: a fresh buffer played once through a band-pass filter
pub struct NoiseVoice {
    buffer: Vec<f32>,
    filter: BandPass,
    start: f64,
    pos: usize,
}

impl NoiseVoice {
    /// Build a burst that starts at `time`
    pub fn new(params: &NoiseParams, time: f64, sample_rate: u32) -> Self {
        Self {
            buffer: noise_buffer(sample_rate, params.duration),
            filter: BandPass::new(sample_rate as f64, params.band_hz),
            start: time,
            pos: 0,
        }
    }

    /// Length of the generated buffer in samples
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the generated buffer is empty
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Centre frequency of the band-pass stage
    pub fn band_hz(&self) -> f64 {
        self.filter.center()
    }
}

impl Voice for NoiseVoice {
    fn render(&mut self, now: f64) -> f64 {
        if now < self.start {
            return 0.0;
        }
        match self.buffer.get(self.pos) {
            Some(&sample) => {
                self.pos += 1;
                self.filter.process(sample as f64)
            }
            None => 0.0,
        }
    }

    fn is_finished(&self, now: f64) -> bool {
        now >= self.start && self.pos >= self.buffer.len()
    }

    fn node_count(&self) -> usize {
        // buffer source + filter
        2
    }
}
