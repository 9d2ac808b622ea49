//! Live microphone capture.
//!
//! The cpal callback thread downmixes and decimates incoming PCM into a shared
//! ring of the most recent N samples. The analyzer copies the ring out once per
//! analysis tick, holding the lock only for that copy.

use super::device::find_input_device;
use super::Decimator;
use crate::analyzer::source::{pcm_to_sample, SampleRing, SampleSource};
use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use std::sync::{Arc, Mutex};

/// Sample source backed by an input device.
pub struct Microphone {
    ring: Arc<Mutex<SampleRing>>,
    /// Kept alive for as long as capture runs
    _stream: cpal::Stream,
    sample_rate: u32,
    device_name: String,
}

impl Microphone {
    /// Opens `device_spec` and starts capturing windows of `size` samples.
    ///
    /// Capture runs at the device's native rate, decimated by an integer factor
    /// towards `target_rate`; [`SampleSource::sample_rate`] reports the result.
    ///
    /// # Errors
    /// - If the device cannot be found
    /// - If the device has no usable input configuration
    /// - If the input stream cannot be built or started
    pub fn open(device_spec: &str, target_rate: u32, size: usize) -> Result<Self> {
        let device = find_input_device(device_spec)?;
        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());

        let device_config = device.default_input_config()?;
        let device_rate = device_config.sample_rate().0;
        let channels = device_config.channels() as usize;
        let factor = Decimator::factor_for(device_rate, target_rate);
        let sample_rate = device_rate / factor as u32;

        tracing::info!("Capture device: {}", device_name);
        tracing::debug!(
            "Device configuration: {}Hz, {} channels, {:?}",
            device_rate,
            channels,
            device_config.sample_format()
        );
        if sample_rate != target_rate {
            tracing::warn!(
                "Requested {}Hz but device runs at {}Hz; analyzing at {}Hz (decimation {})",
                target_rate,
                device_rate,
                sample_rate,
                factor
            );
        }

        let ring = Arc::new(Mutex::new(SampleRing::new(size)));
        let decimator = Decimator::new(channels, factor);
        let config: cpal::StreamConfig = device_config.clone().into();

        let stream = match device_config.sample_format() {
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, &ring, decimator),
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, &ring, decimator),
            cpal::SampleFormat::I32 => build_stream::<i32>(&device, &config, &ring, decimator),
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, &ring, decimator),
            format => Err(anyhow!("Unsupported input sample format: {format:?}")),
        }?;

        stream.play()?;
        tracing::debug!("Audio stream started");

        Ok(Self {
            ring,
            _stream: stream,
            sample_rate,
            device_name,
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    ring: &Arc<Mutex<SampleRing>>,
    mut decimator: Decimator,
) -> Result<cpal::Stream>
where
    T: SizedSample,
    i16: FromSample<T>,
{
    let ring = Arc::clone(ring);
    let mut pcm: Vec<i16> = Vec::new();

    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            pcm.clear();
            pcm.extend(data.iter().map(|s| s.to_sample::<i16>()));

            let Ok(mut ring) = ring.lock() else {
                return;
            };
            decimator.push(&pcm, |sample| ring.push(pcm_to_sample(sample)));
        },
        |err| {
            tracing::error!("Audio stream error: {}", err);
        },
        None,
    )?;

    Ok(stream)
}

impl SampleSource for Microphone {
    fn size(&self) -> usize {
        match self.ring.lock() {
            Ok(ring) => ring.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn read(&mut self, out: &mut [u16]) {
        match self.ring.lock() {
            Ok(ring) => ring.copy_ordered(out),
            Err(poisoned) => poisoned.into_inner().copy_ordered(out),
        }
    }
}
