//! Log-frequency spectrum analyzer.
//!
//! Each analysis tick swaps the spectrum slots, transforms a fresh sample window
//! into the new current slot and auto-gains it. Render ticks read bucket values
//! blended between the previous and current spectrum, so the display moves
//! smoothly even though analysis runs at a lower rate.

use super::frame::{blend_factor, DoubleBuffer};
use super::resample::BucketIndex;
use super::scale::{LogScale, MAX_VALUE};
use super::settings::Settings;
use super::source::SampleSource;
use super::transform::Transform;
use super::{AnalysisReport, Analyzer};
use std::time::{Duration, Instant};

pub struct SpectrumAnalyzer {
    transform: Transform,
    scale: LogScale,
    buckets: BucketIndex,
    frames: DoubleBuffer,
    samples: Box<[u16]>,
    update_interval: Duration,
    gate: u16,
    last_update: Option<Instant>,
}

impl SpectrumAnalyzer {
    pub fn new(settings: &Settings) -> Self {
        let transform = Transform::new(settings.transform_size, settings.gain, settings.transform);
        let spectrum_size = transform.spectrum_size();

        tracing::debug!(
            "Spectrum analyzer: {} samples ({} transform), {} bins of {:.1}Hz, {} buckets over {:.1}..{:.1}Hz, window {} ticks",
            settings.transform_size,
            transform.kind(),
            spectrum_size,
            settings.bin_width(),
            settings.bucket_count,
            settings.min_freq,
            settings.max_freq,
            settings.window_len()
        );

        Self {
            transform,
            scale: LogScale::new(settings.window_len()),
            buckets: BucketIndex::new(
                settings.min_freq,
                settings.max_freq,
                settings.bucket_count,
                spectrum_size,
            ),
            frames: DoubleBuffer::new(spectrum_size),
            samples: vec![0u16; settings.transform_size].into_boxed_slice(),
            update_interval: settings.update_interval,
            gate: settings.gate,
            last_update: None,
        }
    }

    #[cfg(test)]
    pub fn buckets(&self) -> &BucketIndex {
        &self.buckets
    }

    /// The most recent spectrum after auto-gain.
    #[cfg(test)]
    pub fn current(&self) -> &[u16] {
        self.frames.current()
    }

    /// The spectrum before the most recent one.
    #[cfg(test)]
    pub fn previous(&self) -> &[u16] {
        self.frames.previous()
    }

    fn analyze(&mut self, source: &mut dyn SampleSource) -> Option<(u16, u16)> {
        self.frames.swap();

        source.read(&mut self.samples);
        if tracing::enabled!(tracing::Level::TRACE) {
            let low = self.samples.iter().min().copied().unwrap_or_default();
            let high = self.samples.iter().max().copied().unwrap_or_default();
            tracing::trace!("Signal: {}..{}", low, high);
        }

        self.transform
            .transform(&self.samples, self.frames.current_mut());
        self.scale.scale(self.frames.current_mut())
    }
}

impl Analyzer for SpectrumAnalyzer {
    fn tick(&mut self, now: Instant, source: &mut dyn SampleSource) -> Option<AnalysisReport> {
        if let Some(last) = self.last_update {
            if now.saturating_duration_since(last) < self.update_interval {
                return None;
            }
        }

        let started = Instant::now();
        let window = self.analyze(source);
        let elapsed = started.elapsed();
        self.last_update = Some(now);

        Some(AnalysisReport {
            elapsed,
            window,
            overrun: elapsed > self.update_interval,
        })
    }

    /// Gated average of the interpolated bins in bucket `index`.
    ///
    /// Bins below the gate are left out of the average; a bucket whose bins are all
    /// gated out reads 0.
    fn get(&self, index: usize, frac: u8) -> u16 {
        let mut accumulated: u32 = 0;
        let mut significant: u32 = 0;
        for bin in self.buckets.range(index) {
            let value = self.frames.blended(bin, frac);
            if value >= self.gate {
                accumulated += value as u32;
                significant += 1;
            }
        }

        if significant == 0 {
            return 0;
        }
        (accumulated / significant).min(MAX_VALUE as u32) as u16
    }

    fn blend_factor(&self, now: Instant) -> u8 {
        self.last_update.map_or(0, |last| {
            blend_factor(now.saturating_duration_since(last), self.update_interval)
        })
    }

    fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    fn last_update(&self) -> Option<Instant> {
        self.last_update
    }
}
