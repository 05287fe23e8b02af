//! Sweep voice: wavetable tone under a fixed-length linear envelope

use super::automation::Automation;
use super::oscillator::{Oscillator, Waveform};
use super::wavetable::sweep_wave;
use super::Voice;
use crate::sequencer::SweepParams;

/// Carrier frequency of every sweep note
pub const SWEEP_FREQUENCY: f64 = 380.0;

/// Fixed note length in seconds
pub const SWEEP_LENGTH: f64 = 2.0;

/// A single sweep note.
///
/// The envelope rises from 0 to 1 over `attack` and falls back to 0 at
/// `start + SWEEP_LENGTH - release`; release is measured back from the end of
/// the note. The oscillator runs for the full note regardless of envelope.
pub struct SweepVoice {
    osc: Oscillator,
    envelope: Automation,
    start: f64,
    stop: f64,
}

impl SweepVoice {
    /// Build a note that starts at `time`
    pub fn new(params: &SweepParams, time: f64, sample_rate: u32) -> Self {
        let mut envelope = Automation::new(0.0);
        envelope
            .set_value_at_time(0.0, time)
            .linear_ramp_to_value_at_time(1.0, time + params.attack)
            .linear_ramp_to_value_at_time(0.0, time + SWEEP_LENGTH - params.release);

        Self {
            osc: Oscillator::new(
                Waveform::Periodic(sweep_wave()),
                SWEEP_FREQUENCY,
                sample_rate as f64,
            ),
            envelope,
            start: time,
            stop: time + SWEEP_LENGTH,
        }
    }

    /// Envelope gain at `time`
    pub fn gain_at(&self, time: f64) -> f64 {
        self.envelope.value_at(time)
    }

    /// Scheduled start time
    pub fn start_time(&self) -> f64 {
        self.start
    }

    /// Scheduled stop time
    pub fn stop_time(&self) -> f64 {
        self.stop
    }
}

impl Voice for SweepVoice {
    fn render(&mut self, now: f64) -> f64 {
        if now < self.start || now >= self.stop {
            return 0.0;
        }
        self.osc.generate() * self.envelope.value_at(now)
    }

    fn is_finished(&self, now: f64) -> bool {
        now >= self.stop
    }

    fn node_count(&self) -> usize {
        // oscillator + envelope gain
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_envelope_shape() {
        let params = SweepParams {
            attack: 0.2,
            release: 0.5,
        };
        let voice = SweepVoice::new(&params, 0.0, 44100);

        assert!(close(voice.gain_at(0.0), 0.0));
        assert!(close(voice.gain_at(0.1), 0.5));
        assert!(close(voice.gain_at(0.2), 1.0));
        assert!(close(voice.gain_at(0.85), 0.5));
        assert!(close(voice.gain_at(1.5), 0.0));
        assert!(close(voice.gain_at(1.9), 0.0));
        assert_eq!(voice.stop_time(), 2.0);
    }

    #[test]
    fn test_envelope_is_anchored_at_trigger_time() {
        let params = SweepParams {
            attack: 0.2,
            release: 0.5,
        };
        let voice = SweepVoice::new(&params, 10.0, 44100);

        assert!(close(voice.gain_at(9.0), 0.0));
        assert!(close(voice.gain_at(10.2), 1.0));
        assert!(close(voice.gain_at(11.5), 0.0));
        assert_eq!(voice.start_time(), 10.0);
        assert_eq!(voice.stop_time(), 12.0);
    }

    #[test]
    fn test_stops_at_note_length_regardless_of_envelope() {
        let params = SweepParams {
            attack: 0.2,
            release: 1.0,
        };
        let mut voice = SweepVoice::new(&params, 0.0, 1000);

        // Envelope reaches zero at 1.0 but the oscillator keeps running.
        assert!(close(voice.gain_at(1.0), 0.0));
        assert!(!voice.is_finished(1.5));
        assert!(!voice.is_finished(1.999));
        assert!(voice.is_finished(2.0));
        assert_eq!(voice.render(2.0), 0.0);

        let instant = SweepParams {
            attack: 0.0,
            release: 0.0,
        };
        let voice = SweepVoice::new(&instant, 0.0, 1000);
        assert!(close(voice.gain_at(0.0), 1.0));
        assert!(close(voice.gain_at(1.0), 0.5));
    }

    #[test]
    fn test_full_attack_and_release_meet_in_the_middle() {
        let params = SweepParams {
            attack: 1.0,
            release: 1.0,
        };
        let voice = SweepVoice::new(&params, 0.0, 44100);
        assert!(close(voice.gain_at(0.5), 0.5));
        assert!(close(voice.gain_at(1.5), 0.0));
        for i in 0..200 {
            let g = voice.gain_at(i as f64 * 0.01);
            assert!((0.0..=1.0).contains(&g));
        }
    }

    #[test]
    fn test_silent_before_start() {
        let params = SweepParams {
            attack: 0.2,
            release: 0.5,
        };
        let mut voice = SweepVoice::new(&params, 1.0, 44100);
        assert_eq!(voice.render(0.5), 0.0);
        assert!(!voice.is_finished(0.5));
        assert_eq!(voice.node_count(), 2);
    }
}
