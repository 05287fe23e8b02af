//! WAV file recorder
//!
//! Writes rendered mono output to 32-bit float WAV files.

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

/// WAV file recorder
pub struct Recorder {
    writer: WavWriter<BufWriter<File>>,
    path: PathBuf,
    sample_rate: u32,
    samples_written: u64,
    peak: f32,
}

impl Recorder {
    /// Create the output file
    pub fn create(path: &Path, sample_rate: u32) -> Result<Self> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };

        let writer = WavWriter::create(path, spec)
            .with_context(|| format!("failed to create WAV file: {:?}", path))?;

        Ok(Self {
            writer,
            path: path.to_path_buf(),
            sample_rate,
            samples_written: 0,
            peak: 0.0,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }

    /// Duration recorded so far in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples_written as f64 / self.sample_rate as f64
    }

    /// Write a block of samples
    pub fn write_block(&mut self, block: &[f32]) -> Result<()> {
        for &sample in block {
            self.writer
                .write_sample(sample)
                .context("failed to write sample")?;
            self.peak = self.peak.max(sample.abs());
        }
        self.samples_written += block.len() as u64;
        Ok(())
    }

    /// Finalize the WAV header and close the file
    pub fn finalize(self) -> Result<RecordingSummary> {
        let summary = RecordingSummary {
            path: self.path,
            samples: self.samples_written,
            duration_secs: self.samples_written as f64 / self.sample_rate as f64,
            peak: self.peak,
        };
        self.writer.finalize().context("failed to finalize WAV file")?;
        info!(
            path = ?summary.path,
            samples = summary.samples,
            peak = summary.peak,
            "recording finalized"
        );
        Ok(summary)
    }
}

/// What ended up in a finished recording
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSummary {
    pub path: PathBuf,
    pub samples: u64,
    pub duration_secs: f64,
    /// Largest absolute sample value
    pub peak: f32,
}
