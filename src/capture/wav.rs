//! WAV file playback as a sample source.
//!
//! The file is decoded up front, downmixed, decimated and converted to 12-bit
//! samples. Reads return the window ending at the current playback position,
//! which advances with wall time and loops at the end of the file.

use super::Decimator;
use crate::analyzer::source::{pcm_to_sample, SampleSource};
use anyhow::{anyhow, Result};
use std::path::Path;
use std::time::{Duration, Instant};

pub struct WavSource {
    samples: Box<[u16]>,
    sample_rate: u32,
    size: usize,
    started: Option<Instant>,
}

impl WavSource {
    /// Decodes `path` for windows of `size` samples at roughly `target_rate`.
    ///
    /// # Errors
    /// - If the file cannot be opened or is not a WAV file
    /// - If the sample format is unsupported
    /// - If the file contains no audio
    pub fn open(path: &Path, target_rate: u32, size: usize) -> Result<Self> {
        let reader = hound::WavReader::open(path)
            .map_err(|e| anyhow!("Failed to open {}: {e}", path.display()))?;
        let spec = reader.spec();
        let pcm = decode(reader)?;

        let factor = Decimator::factor_for(spec.sample_rate, target_rate);
        let mut decimator = Decimator::new(spec.channels as usize, factor);
        let mut samples = Vec::with_capacity(pcm.len() / (spec.channels as usize * factor).max(1));
        decimator.push(&pcm, |s| samples.push(pcm_to_sample(s)));

        if samples.is_empty() {
            return Err(anyhow!("{} contains no audio", path.display()));
        }

        let source = Self::from_samples(samples, spec.sample_rate / factor as u32, size);
        tracing::info!(
            "Loaded {}: {} channels at {}Hz, {:.1}s, analyzing at {}Hz",
            path.display(),
            spec.channels,
            spec.sample_rate,
            source.duration().as_secs_f32(),
            source.sample_rate
        );

        Ok(source)
    }

    /// Wraps already converted 12-bit samples.
    pub fn from_samples(samples: Vec<u16>, sample_rate: u32, size: usize) -> Self {
        assert!(!samples.is_empty(), "WavSource needs at least one sample");
        Self {
            samples: samples.into_boxed_slice(),
            sample_rate,
            size,
            started: None,
        }
    }

    /// Playback length.
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.samples.len() as f64 / self.sample_rate as f64)
    }

    /// Fills `out` with the window ending `elapsed` into playback.
    pub fn read_at(&self, elapsed: Duration, out: &mut [u16]) {
        let len = self.samples.len();
        let played = (elapsed.as_micros() * self.sample_rate as u128 / 1_000_000) as usize;
        let end = played % len;
        // Oldest sample of the window, wrapping backwards through the loop point.
        let start = (end + len - out.len() % len) % len;
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.samples[(start + i) % len];
        }
    }
}

fn decode<R: std::io::Read>(mut reader: hound::WavReader<R>) -> Result<Vec<i16>> {
    let spec = reader.spec();
    let pcm = match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Int, bits) if bits <= 16 => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v << (16 - bits)))
            .collect::<Result<Vec<_>, _>>()?,
        (hound::SampleFormat::Int, bits) if bits <= 32 => reader
            .samples::<i32>()
            .map(|s| s.map(|v| (v >> (bits - 16)) as i16))
            .collect::<Result<Vec<_>, _>>()?,
        (hound::SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * i16::MAX as f32) as i16))
            .collect::<Result<Vec<_>, _>>()?,
        (format, bits) => {
            return Err(anyhow!("Unsupported WAV format: {bits}-bit {format:?}"));
        }
    };
    Ok(pcm)
}

impl SampleSource for WavSource {
    fn size(&self) -> usize {
        self.size
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn read(&mut self, out: &mut [u16]) {
        let started = *self.started.get_or_insert_with(Instant::now);
        self.read_at(started.elapsed(), out);
    }
}
