//! Sample playback voice and the decoded sample buffer it reads

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use hound::{SampleFormat, WavReader};

use super::Voice;
use crate::sequencer::SampleParams;

/// A decoded mono sample at its native rate
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    data: Vec<f32>,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Wrap decoded mono samples. A zero native rate is refused.
    pub fn new(data: Vec<f32>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            bail!("sample rate must be positive");
        }
        Ok(Self { data, sample_rate })
    }

    /// Decode a WAV file, downmixing every channel to mono
    pub fn from_wav(path: &Path) -> Result<Self> {
        let mut reader = WavReader::open(path)
            .with_context(|| format!("failed to open sample: {:?}", path))?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let interleaved: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<_, _>>()
                .context("failed to decode float samples")?,
            SampleFormat::Int => {
                if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                    bail!("unsupported bit depth: {}", spec.bits_per_sample);
                }
                let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<_, _>>()
                    .context("failed to decode integer samples")?
            }
        };

        let data = interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect();

        Self::new(data, spec.sample_rate).with_context(|| format!("invalid sample: {:?}", path))
    }

    /// Native sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Duration at the native rate, in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.data.len() as f64 / self.sample_rate as f64
    }

    /// Read at a fractional position with linear interpolation
    pub fn read_interpolated(&self, position: f64) -> f64 {
        if position < 0.0 {
            return 0.0;
        }
        let idx = position as usize;
        let Some(&s0) = self.data.get(idx) else {
            return 0.0;
        };
        let s1 = self.data.get(idx + 1).copied().unwrap_or(s0);
        let frac = (position - idx as f64) as f32;
        (s0 * (1.0 - frac) + s1 * frac) as f64
    }
}

/// One playback of the loaded sample
pub struct SampleVoice {
    buffer: Arc<SampleBuffer>,
    step: f64,
    pos: f64,
    start: f64,
}

impl SampleVoice {
    /// Build a playback that starts at `time`
    pub fn new(
        params: &SampleParams,
        buffer: Arc<SampleBuffer>,
        time: f64,
        sample_rate: u32,
    ) -> Self {
        let step = params.playback_rate * buffer.sample_rate() as f64 / sample_rate as f64;
        Self {
            buffer,
            step,
            pos: 0.0,
            start: time,
        }
    }

    /// Buffer positions advanced per output sample
    pub fn step(&self) -> f64 {
        self.step
    }

    // A read head that cannot advance never reaches the end
    fn exhausted(&self) -> bool {
        self.step.is_nan() || self.step <= 0.0 || self.pos >= self.buffer.len() as f64
    }
}

impl Voice for SampleVoice {
    fn render(&mut self, now: f64) -> f64 {
        if now < self.start || self.exhausted() {
            return 0.0;
        }
        let out = self.buffer.read_interpolated(self.pos);
        self.pos += self.step;
        out
    }

    fn is_finished(&self, now: f64) -> bool {
        now >= self.start && self.exhausted()
    }

    fn node_count(&self) -> usize {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{AudioContext, AudioGraph, Route};
    use hound::{WavSpec, WavWriter};
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_interpolated() {
        let buffer = SampleBuffer::new(vec![0.0, 1.0, 0.0], 44100).unwrap();
        assert_eq!(buffer.read_interpolated(0.5), 0.5);
        assert_eq!(buffer.read_interpolated(1.0), 1.0);
        assert_eq!(buffer.read_interpolated(2.0), 0.0);
        assert_eq!(buffer.read_interpolated(5.0), 0.0);
        assert_eq!(buffer.read_interpolated(-1.0), 0.0);
    }

    #[test]
    fn test_playback_rate_scales_step() {
        let buffer = Arc::new(SampleBuffer::new(vec![0.0; 100], 22050).unwrap());
        let params = SampleParams { playback_rate: 2.0 };
        let voice = SampleVoice::new(&params, buffer, 0.0, 44100);
        assert!((voice.step() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_voice_ends_with_buffer() {
        let buffer = Arc::new(SampleBuffer::new(vec![0.5; 8], 8).unwrap());
        let params = SampleParams { playback_rate: 0.5 };
        let mut voice = SampleVoice::new(&params, buffer, 1.0, 8);

        assert_eq!(voice.render(0.5), 0.0);
        let mut rendered = 0;
        let mut now = 1.0;
        while !voice.is_finished(now) {
            assert_eq!(voice.render(now), 0.5);
            rendered += 1;
            now += 1.0 / 8.0;
        }
        // Half speed reads every position twice.
        assert_eq!(rendered, 16);
    }

    #[test]
    fn test_zero_sample_rate_is_refused() {
        assert!(SampleBuffer::new(vec![0.5; 4], 0).is_err());
    }

    #[test]
    fn test_stalled_voice_is_released() {
        let (ctx, mut renderer) = AudioContext::new(1000, 1.0);
        ctx.resume().unwrap();

        let buffer = Arc::new(SampleBuffer::new(vec![0.5; 4], 1000).unwrap());
        let stalled = SampleParams { playback_rate: 0.0 };
        let voice = SampleVoice::new(&stalled, buffer, 0.0, 1000);
        assert!(voice.is_finished(0.0));

        ctx.connect(Box::new(voice), Route::Mix).unwrap();
        assert_eq!(ctx.live_nodes(), 1);

        let mut block = [1.0f32; 100];
        renderer.render(&mut block);
        assert!(block.iter().all(|&s| s == 0.0));
        assert_eq!(ctx.live_nodes(), 0);
        assert_eq!(renderer.voice_count(), 0);
    }

    #[test]
    fn test_from_wav_downmixes_stereo() {
        let file = NamedTempFile::new().unwrap();
        let spec = WavSpec {
            channels: 2,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        {
            let mut writer = WavWriter::create(file.path(), spec).unwrap();
            for _ in 0..4 {
                writer.write_sample(16384i16).unwrap();
                writer.write_sample(0i16).unwrap();
            }
            writer.finalize().unwrap();
        }

        let buffer = SampleBuffer::from_wav(file.path()).unwrap();
        assert_eq!(buffer.sample_rate(), 22050);
        assert_eq!(buffer.len(), 4);
        assert!((buffer.read_interpolated(0.0) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_from_wav_missing_file() {
        assert!(SampleBuffer::from_wav(Path::new("/nonexistent/kick.wav")).is_err());
    }
}
