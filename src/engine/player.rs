//! Real-time audio playback using cpal

use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig};
use tracing::{error, info};

use crate::graph::Renderer;

/// Mono frames rendered per chunk inside the device callback
const CHUNK_FRAMES: usize = 1024;

/// Real-time audio player
pub struct Player {
    device: Device,
    config: StreamConfig,
    sample_format: SampleFormat,
    stream: Option<Stream>,
}

impl Player {
    /// Open an output device by name, or the default device
    pub fn open(device_name: Option<&str>) -> Result<Self> {
        let host = cpal::default_host();
        let device = match device_name {
            Some(name) => host
                .output_devices()?
                .find(|d| d.name().map(|n| n == name).unwrap_or(false))
                .ok_or_else(|| anyhow!("Output device not found: {}", name))?,
            None => host
                .default_output_device()
                .ok_or_else(|| anyhow!("No output device available"))?,
        };

        let supported = device
            .default_output_config()
            .context("failed to query output config")?;
        let sample_format = supported.sample_format();
        let config: StreamConfig = supported.into();

        info!(
            device = %device.name().unwrap_or_else(|_| "unknown".into()),
            sample_rate = config.sample_rate.0,
            channels = config.channels,
            "output device opened"
        );

        Ok(Self {
            device,
            config,
            sample_format,
            stream: None,
        })
    }

    /// The device rate; the audio context must be created at this rate
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    /// Hand `renderer` to the audio thread and start the stream
    pub fn start(&mut self, renderer: Renderer) -> Result<()> {
        let stream = match self.sample_format {
            SampleFormat::F32 => self.build_stream::<f32>(renderer)?,
            SampleFormat::I16 => self.build_stream::<i16>(renderer)?,
            SampleFormat::U16 => self.build_stream::<u16>(renderer)?,
            other => return Err(anyhow!("Unsupported sample format: {:?}", other)),
        };

        stream.play()?;
        self.stream = Some(stream);

        Ok(())
    }

    /// Stop playback. Dropping the stream drops the renderer, which closes
    /// the context.
    pub fn stop(&mut self) {
        if self.stream.take().is_some() {
            info!("output stream stopped");
        }
    }

    fn build_stream<T: cpal::Sample + cpal::SizedSample + cpal::FromSample<f32>>(
        &self,
        mut renderer: Renderer,
    ) -> Result<Stream> {
        let channels = self.config.channels as usize;
        let mut mono = vec![0.0f32; CHUNK_FRAMES];

        let stream = self.device.build_output_stream(
            &self.config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                for frames in data.chunks_mut(CHUNK_FRAMES * channels) {
                    let len = frames.len() / channels;
                    renderer.render(&mut mono[..len]);
                    for (frame, &sample) in frames.chunks_mut(channels).zip(&mono[..len]) {
                        for channel_sample in frame.iter_mut() {
                            *channel_sample = T::from_sample(sample);
                        }
                    }
                }
            },
            |err| {
                error!(%err, "audio stream error");
            },
            None,
        )?;

        Ok(stream)
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Get the default output device name
pub fn default_device_name() -> Option<String> {
    let host = cpal::default_host();
    host.default_output_device()
        .and_then(|d| d.name().ok())
}

/// List all available output devices
pub fn list_output_devices() -> Vec<(String, StreamConfig)> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    if let Ok(output_devices) = host.output_devices() {
        for device in output_devices {
            if let (Ok(name), Ok(config)) = (device.name(), device.default_output_config()) {
                devices.push((name, config.into()));
            }
        }
    }

    devices
}
