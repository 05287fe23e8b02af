//! Per-frame reads of the analysis tap

use crate::graph::AnalyserHandle;
use crate::sequencer::lock;

/// Something that can draw one frame of time-domain bytes
pub trait Surface {
    fn draw(&mut self, samples: &[u8]);
}

/// Reads the analyser once per display frame, independent of the scheduler
#[derive(Clone)]
pub struct VisualizationSampler {
    analyser: AnalyserHandle,
}

impl VisualizationSampler {
    pub fn new(analyser: AnalyserHandle) -> Self {
        Self { analyser }
    }

    /// Current time-domain bytes, oldest first. 128 is silence.
    pub fn snapshot(&self) -> Vec<u8> {
        lock(&self.analyser).time_domain_bytes()
    }

    /// Hand one snapshot to `surface`. Without a surface this does nothing.
    /// Returns whether anything was drawn.
    pub fn frame(&self, surface: Option<&mut dyn Surface>) -> bool {
        match surface {
            Some(surface) => {
                surface.draw(&self.snapshot());
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Analyser, FFT_SIZE};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recording {
        frames: Vec<Vec<u8>>,
    }

    impl Surface for Recording {
        fn draw(&mut self, samples: &[u8]) {
            self.frames.push(samples.to_vec());
        }
    }

    fn sampler() -> (VisualizationSampler, AnalyserHandle) {
        let analyser = Arc::new(Mutex::new(Analyser::new()));
        (VisualizationSampler::new(analyser.clone()), analyser)
    }

    #[test]
    fn test_silence_is_centered() {
        let (sampler, _) = sampler();
        let bytes = sampler.snapshot();
        assert_eq!(bytes.len(), FFT_SIZE);
        assert!(bytes.iter().all(|&b| b == 128));
    }

    #[test]
    fn test_missing_surface_is_noop() {
        let (sampler, _) = sampler();
        assert!(!sampler.frame(None));
    }

    #[test]
    fn test_each_frame_is_a_fresh_snapshot() {
        let (sampler, analyser) = sampler();
        let mut surface = Recording::default();

        assert!(sampler.frame(Some(&mut surface)));
        analyser.lock().unwrap().push_block(&[1.0, -1.0]);
        assert!(sampler.frame(Some(&mut surface)));

        assert_eq!(surface.frames.len(), 2);
        assert!(surface.frames[0].iter().all(|&b| b == 128));
        let last = &surface.frames[1];
        assert_eq!(last.len(), FFT_SIZE);
        assert_eq!(last[FFT_SIZE - 2], 255);
        assert_eq!(last[FFT_SIZE - 1], 0);
    }
}
