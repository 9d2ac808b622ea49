//! Fixed-point audio analysis for low-resolution LED matrices.
//!
//! The pipeline runs on two clocks. An analysis tick reads a window of samples,
//! transforms it into a magnitude spectrum and auto-gains it into `0..=MAX_VALUE`.
//! A render tick, which runs at least as often, asks the analyzer for each
//! column's value blended between the last two analysis results.

pub mod frame;
pub mod resample;
pub mod scale;
pub mod settings;
pub mod source;
pub mod spectrum;
pub mod transform;
pub mod volume;
pub mod window;

pub use scale::MAX_VALUE;
pub use settings::Settings;
pub use source::{SampleSource, ToneSource};
pub use spectrum::SpectrumAnalyzer;
pub use volume::VolumeAnalyzer;

use crate::config::DisplayMode;
use std::time::{Duration, Instant};

/// Outcome of one analysis tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisReport {
    /// Wall time spent reading and analyzing
    pub elapsed: Duration,
    /// Auto-gain window bounds applied to this frame
    pub window: Option<(u16, u16)>,
    /// Analysis took longer than the update interval
    pub overrun: bool,
}

/// Shared surface of the spectrum and volume analyzers, driven by the control loop.
pub trait Analyzer {
    /// Runs an analysis tick if the update interval has elapsed since the last one.
    ///
    /// The first call always analyzes.
    fn tick(&mut self, now: Instant, source: &mut dyn SampleSource) -> Option<AnalysisReport>;

    /// Value of column `index` in `0..=MAX_VALUE`, blended by `frac / 255` from the
    /// previous towards the current analysis.
    fn get(&self, index: usize, frac: u8) -> u16;

    /// Blend factor for a render at `now`.
    fn blend_factor(&self, now: Instant) -> u8;

    /// Number of display columns.
    fn bucket_count(&self) -> usize;

    /// Time since the last analysis tick, zero before the first.
    fn delta(&self, now: Instant) -> Duration {
        self.last_update()
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last))
    }

    fn last_update(&self) -> Option<Instant>;
}

/// Builds the analyzer for `mode`.
pub fn build(mode: DisplayMode, settings: &Settings) -> Box<dyn Analyzer> {
    match mode {
        DisplayMode::Spectrum => Box::new(SpectrumAnalyzer::new(settings)),
        DisplayMode::Volume => Box::new(VolumeAnalyzer::new(settings)),
    }
}
