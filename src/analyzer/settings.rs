//! Validated analyzer parameters.

use crate::config::{ConfigError, LedspecConfig, TransformKind};
use std::time::Duration;

/// Everything the analyzers need, checked once at startup.
///
/// `sample_rate` is the rate the sample source actually delivers, which may
/// differ from the configured target.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub sample_rate: u32,
    pub transform_size: usize,
    pub transform: TransformKind,
    pub gain: u32,
    pub gate: u16,
    pub update_interval: Duration,
    pub render_interval: Duration,
    pub window_duration: Duration,
    pub bucket_count: usize,
    pub rows: usize,
    pub min_freq: f32,
    pub max_freq: f32,
}

impl Settings {
    /// # Errors
    /// Returns the first [`ConfigError`] found in `config` for this sample rate.
    pub fn new(config: &LedspecConfig, sample_rate: u32) -> Result<Self, ConfigError> {
        let analyzer = &config.analyzer;
        let display = &config.display;

        if sample_rate == 0 {
            return Err(ConfigError::SampleRate);
        }

        let size = analyzer.transform_size;
        if size < 4 || !size.is_power_of_two() {
            return Err(ConfigError::TransformSize(size));
        }

        if display.columns <= 1 {
            return Err(ConfigError::BucketCount(display.columns));
        }

        if display.rows == 0 {
            return Err(ConfigError::Rows);
        }

        if analyzer.update_interval_ms == 0 {
            return Err(ConfigError::UpdateInterval);
        }

        if analyzer.render_interval_ms == 0 || analyzer.render_interval_ms > analyzer.update_interval_ms {
            return Err(ConfigError::RenderInterval {
                render_ms: analyzer.render_interval_ms,
                update_ms: analyzer.update_interval_ms,
            });
        }

        let spectrum_size = size / 2;
        let min_freq = analyzer
            .min_freq
            .unwrap_or(sample_rate as f32 / spectrum_size as f32);
        let max_freq = analyzer.max_freq.unwrap_or(sample_rate as f32);
        if !(min_freq > 0.0 && max_freq > min_freq && max_freq.is_finite()) {
            return Err(ConfigError::FrequencyRange {
                min: min_freq,
                max: max_freq,
            });
        }

        Ok(Self {
            sample_rate,
            transform_size: size,
            transform: analyzer.transform,
            gain: analyzer.gain,
            gate: analyzer.gate,
            update_interval: Duration::from_millis(analyzer.update_interval_ms),
            render_interval: Duration::from_millis(analyzer.render_interval_ms),
            window_duration: Duration::from_millis(analyzer.window_duration_ms),
            bucket_count: display.columns,
            rows: display.rows,
            min_freq,
            max_freq,
        })
    }

    /// Number of magnitude bins produced by the transform.
    pub fn spectrum_size(&self) -> usize {
        self.transform_size / 2
    }

    /// Number of analysis ticks the auto-gain window spans, at least 1.
    pub fn window_len(&self) -> usize {
        let ticks = self.window_duration.as_millis() / self.update_interval.as_millis().max(1);
        (ticks as usize).max(1)
    }

    /// Width of one magnitude bin in Hz.
    pub fn bin_width(&self) -> f32 {
        self.sample_rate as f32 / self.transform_size as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(edit: impl FnOnce(&mut LedspecConfig)) -> Result<Settings, ConfigError> {
        let mut config = LedspecConfig::default();
        edit(&mut config);
        Settings::new(&config, 9600)
    }

    #[test]
    fn test_defaults_are_valid() {
        let settings = settings(|_| {}).unwrap();
        assert_eq!(settings.spectrum_size(), 64);
        assert_eq!(settings.window_len(), 3000 / 66);
        assert_eq!(settings.min_freq, 150.0);
        assert_eq!(settings.max_freq, 9600.0);
        assert_eq!(settings.bin_width(), 75.0);
    }

    #[test]
    fn test_rejects_bad_transform_size() {
        for size in [0, 2, 3, 100, 129] {
            assert_eq!(
                settings(|c| c.analyzer.transform_size = size),
                Err(ConfigError::TransformSize(size))
            );
        }
    }

    #[test]
    fn test_rejects_single_column_and_zero_rows() {
        assert_eq!(
            settings(|c| c.display.columns = 1),
            Err(ConfigError::BucketCount(1))
        );
        assert_eq!(settings(|c| c.display.rows = 0), Err(ConfigError::Rows));
    }

    #[test]
    fn test_rejects_zero_sample_rate() {
        assert_eq!(
            Settings::new(&LedspecConfig::default(), 0),
            Err(ConfigError::SampleRate)
        );
    }

    #[test]
    fn test_rejects_bad_intervals() {
        assert_eq!(
            settings(|c| c.analyzer.update_interval_ms = 0),
            Err(ConfigError::UpdateInterval)
        );
        assert_eq!(
            settings(|c| c.analyzer.render_interval_ms = 100),
            Err(ConfigError::RenderInterval {
                render_ms: 100,
                update_ms: 66
            })
        );
        assert!(matches!(
            settings(|c| c.analyzer.render_interval_ms = 0),
            Err(ConfigError::RenderInterval { .. })
        ));
    }

    #[test]
    fn test_rejects_inverted_frequency_range() {
        assert!(matches!(
            settings(|c| {
                c.analyzer.min_freq = Some(5000.0);
                c.analyzer.max_freq = Some(100.0);
            }),
            Err(ConfigError::FrequencyRange { .. })
        ));
        assert!(matches!(
            settings(|c| c.analyzer.min_freq = Some(0.0)),
            Err(ConfigError::FrequencyRange { .. })
        ));
    }

    #[test]
    fn test_short_window_is_at_least_one_tick() {
        let settings = settings(|c| c.analyzer.window_duration_ms = 10).unwrap();
        assert_eq!(settings.window_len(), 1);
    }
}
