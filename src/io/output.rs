use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    BufferSize, SampleRate, StreamConfig,
};
use tracing::{error, info};

use crate::synth::{EngineConfig, Synth, SynthError};

/// A running output stream. The synth renders inside the device callback
/// until this value is dropped.
///
/// Keep [`crate::control::Parameters`], [`crate::synth::ControlEvent`] and
/// diagnostics handles before starting: the synth itself moves into the
/// callback.
pub struct AudioOutput {
    device_name: String,
    config: EngineConfig,
    _stream: cpal::Stream,
}

impl AudioOutput {
    pub fn start(mut synth: Synth) -> Result<Self, SynthError> {
        let config = synth.config().clone();

        let host = cpal::default_host();
        info!(host = ?host.id(), "audio host");
        let device = select_device(&host, config.output_device)?;
        let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());

        let stream_config = StreamConfig {
            channels: config.channels,
            sample_rate: SampleRate(config.sample_rate as u32),
            buffer_size: BufferSize::Fixed(config.buffer_size),
        };
        let channels = usize::from(config.channels);

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let frames = data.len() / channels;
                    synth.fill_buffer(data, frames, channels);
                },
                |err| error!(%err, "audio stream error"),
                None,
            )
            .map_err(|err| SynthError::Stream(err.to_string()))?;

        stream
            .play()
            .map_err(|err| SynthError::Stream(err.to_string()))?;

        info!(
            device = %device_name,
            sample_rate = config.sample_rate,
            buffer_size = config.buffer_size,
            channels = config.channels,
            "audio stream started"
        );

        Ok(Self {
            device_name,
            config,
            _stream: stream,
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

fn select_device(host: &cpal::Host, index: Option<usize>) -> Result<cpal::Device, SynthError> {
    match index {
        Some(index) => host
            .output_devices()
            .map_err(|err| SynthError::DeviceUnavailable(err.to_string()))?
            .nth(index)
            .ok_or_else(|| SynthError::DeviceUnavailable(format!("no output device at index {index}"))),
        None => host
            .default_output_device()
            .ok_or_else(|| SynthError::DeviceUnavailable("no default output device".into())),
    }
}

/// Names of the host's output devices, in the order `output_device` indexes.
pub fn output_device_names() -> Result<Vec<String>, SynthError> {
    let host = cpal::default_host();
    let devices = host
        .output_devices()
        .map_err(|err| SynthError::DeviceUnavailable(err.to_string()))?;
    Ok(devices
        .map(|device| device.name().unwrap_or_else(|_| "unknown".to_string()))
        .collect())
}
