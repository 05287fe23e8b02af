//! Analysis tap: a ring of the most recent tapped samples

use std::sync::{Arc, Mutex};

/// Samples held by the analyser
pub const FFT_SIZE: usize = 2048;

/// Shared handle to the analyser
pub type AnalyserHandle = Arc<Mutex<Analyser>>;

/// Ring buffer of the tapped signal
pub struct Analyser {
    samples: Vec<f32>,
    write_pos: usize,
}

impl Analyser {
    pub fn new() -> Self {
        Self {
            samples: vec![0.0; FFT_SIZE],
            write_pos: 0,
        }
    }

    /// Append a block of tapped samples, overwriting the oldest
    pub fn push_block(&mut self, block: &[f32]) {
        for &sample in block {
            self.samples[self.write_pos] = sample;
            self.write_pos = (self.write_pos + 1) % FFT_SIZE;
        }
    }

    /// Fill `out` with byte samples, oldest first; 128 is silence
    pub fn write_time_domain_bytes(&self, out: &mut [u8]) {
        let len = out.len().min(FFT_SIZE);
        let start = (self.write_pos + FFT_SIZE - len) % FFT_SIZE;
        for (i, byte) in out.iter_mut().take(len).enumerate() {
            *byte = to_byte(self.samples[(start + i) % FFT_SIZE]);
        }
    }

    /// One snapshot of the whole ring as bytes
    pub fn time_domain_bytes(&self) -> Vec<u8> {
        let mut out = vec![128u8; FFT_SIZE];
        self.write_time_domain_bytes(&mut out);
        out
    }
}

impl Default for Analyser {
    fn default() -> Self {
        Self::new()
    }
}

fn to_byte(sample: f32) -> u8 {
    (128.0 * (1.0 + sample)).floor().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_is_128() {
        let analyser = Analyser::new();
        let bytes = analyser.time_domain_bytes();
        assert_eq!(bytes.len(), FFT_SIZE);
        assert!(bytes.iter().all(|&b| b == 128));
    }

    #[test]
    fn test_byte_conversion() {
        assert_eq!(to_byte(0.0), 128);
        assert_eq!(to_byte(1.0), 255);
        assert_eq!(to_byte(-1.0), 0);
        assert_eq!(to_byte(0.5), 192);
        assert_eq!(to_byte(4.0), 255);
    }

    #[test]
    fn test_newest_samples_last() {
        let mut analyser = Analyser::new();
        analyser.push_block(&[0.5, -0.5]);
        let bytes = analyser.time_domain_bytes();
        assert_eq!(bytes[FFT_SIZE - 2], 192);
        assert_eq!(bytes[FFT_SIZE - 1], 64);
        assert_eq!(bytes[0], 128);
    }

    #[test]
    fn test_ring_wraps() {
        let mut analyser = Analyser::new();
        let block: Vec<f32> = (0..FFT_SIZE + 3).map(|i| if i < 3 { 1.0 } else { 0.0 }).collect();
        analyser.push_block(&block);
        assert!(analyser.time_domain_bytes().iter().all(|&b| b == 128));
    }

    #[test]
    fn test_partial_snapshot() {
        let mut analyser = Analyser::new();
        analyser.push_block(&[-1.0, 1.0]);
        let mut out = [0u8; 2];
        analyser.write_time_domain_bytes(&mut out);
        assert_eq!(out, [0, 255]);
    }
}
