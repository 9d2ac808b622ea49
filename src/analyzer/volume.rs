//! Scrolling volume meter.
//!
//! Each analysis tick measures the peak-to-peak amplitude of the sample window,
//! auto-gains it with the same log scale the spectrum uses and pushes it onto a
//! history. Column 0 shows the newest value and column M-1 the oldest, so the
//! display scrolls right as time passes.

use super::frame::{blend_factor, interpolate};
use super::scale::LogScale;
use super::settings::Settings;
use super::source::SampleSource;
use super::{AnalysisReport, Analyzer};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

pub struct VolumeAnalyzer {
    scale: LogScale,
    samples: Box<[u16]>,
    /// Newest first; one entry longer than the column count so the oldest
    /// column can blend from the value that just scrolled off.
    history: VecDeque<u16>,
    columns: usize,
    update_interval: Duration,
    last_update: Option<Instant>,
}

impl VolumeAnalyzer {
    pub fn new(settings: &Settings) -> Self {
        let columns = settings.bucket_count;
        tracing::debug!(
            "Volume analyzer: {} samples, {} columns, window {} ticks",
            settings.transform_size,
            columns,
            settings.window_len()
        );

        Self {
            scale: LogScale::new(settings.window_len()),
            samples: vec![0u16; settings.transform_size].into_boxed_slice(),
            history: std::iter::repeat(0).take(columns + 1).collect(),
            columns,
            update_interval: settings.update_interval,
            last_update: None,
        }
    }
}

impl Analyzer for VolumeAnalyzer {
    fn tick(&mut self, now: Instant, source: &mut dyn SampleSource) -> Option<AnalysisReport> {
        if let Some(last) = self.last_update {
            if now.saturating_duration_since(last) < self.update_interval {
                return None;
            }
        }

        let started = Instant::now();
        source.read(&mut self.samples);
        let level = self.scale.amplitude(&self.samples);
        self.history.pop_back();
        self.history.push_front(level);
        let elapsed = started.elapsed();
        self.last_update = Some(now);

        tracing::trace!("Volume level: {}", level);

        Some(AnalysisReport {
            elapsed,
            window: self.scale.bounds(),
            overrun: elapsed > self.update_interval,
        })
    }

    fn get(&self, index: usize, frac: u8) -> u16 {
        assert!(index < self.columns, "column {index} out of range");
        // Before the last tick, column `index` showed what is now one column older.
        interpolate(self.history[index + 1], self.history[index], frac)
    }

    fn blend_factor(&self, now: Instant) -> u8 {
        self.last_update.map_or(0, |last| {
            blend_factor(now.saturating_duration_since(last), self.update_interval)
        })
    }

    fn bucket_count(&self) -> usize {
        self.columns
    }

    fn last_update(&self) -> Option<Instant> {
        self.last_update
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::scale::{LogTable, MAX_VALUE};
    use crate::analyzer::source::SAMPLE_MIDPOINT;
    use crate::config::LedspecConfig;

    /// Square wave whose peak-to-peak amplitude changes on every read.
    struct Swing {
        peaks: Vec<u16>,
        read: usize,
    }

    impl SampleSource for Swing {
        fn size(&self) -> usize {
            128
        }

        fn sample_rate(&self) -> u32 {
            9600
        }

        fn read(&mut self, out: &mut [u16]) {
            let half = self.peaks[self.read % self.peaks.len()] / 2;
            for (i, slot) in out.iter_mut().enumerate() {
                *slot = if i % 2 == 0 {
                    SAMPLE_MIDPOINT - half
                } else {
                    SAMPLE_MIDPOINT + half
                };
            }
            self.read += 1;
        }
    }

    fn analyzer(columns: usize) -> (VolumeAnalyzer, Settings) {
        let mut config = LedspecConfig::default();
        config.display.columns = columns;
        let settings = Settings::new(&config, 9600).unwrap();
        (VolumeAnalyzer::new(&settings), settings)
    }

    #[test]
    fn test_newest_value_is_in_first_column() {
        let (mut analyzer, settings) = analyzer(8);
        let mut source = Swing {
            peaks: vec![2000, 0, 1000, 2000],
            read: 0,
        };
        let start = Instant::now();
        for tick in 0..4 {
            analyzer
                .tick(start + settings.update_interval * tick, &mut source)
                .unwrap();
        }

        let middle = LogTable::new().get(1000 * 255 / 2000);
        assert_eq!(analyzer.get(0, 255), MAX_VALUE);
        assert_eq!(analyzer.get(1, 255), middle);
        assert_eq!(analyzer.get(2, 255), 0);
        assert_eq!(analyzer.get(3, 255), 0);
        assert_eq!(analyzer.get(7, 255), 0);
    }

    #[test]
    fn test_columns_scroll_smoothly() {
        let (mut analyzer, settings) = analyzer(4);
        let mut source = Swing {
            peaks: vec![2000, 0, 2000],
            read: 0,
        };
        let start = Instant::now();
        for tick in 0..3 {
            analyzer.tick(start + settings.update_interval * tick, &mut source);
        }

        // Before blending, column 0 still shows what column 1 shows now.
        assert_eq!(analyzer.get(0, 0), analyzer.get(1, 255));
        assert_eq!(analyzer.get(0, 0), 0);
        assert_eq!(analyzer.get(0, 255), MAX_VALUE);
    }

    #[test]
    fn test_silence_stays_dark() {
        let (mut analyzer, settings) = analyzer(6);
        let mut source = Swing {
            peaks: vec![0],
            read: 0,
        };
        let start = Instant::now();
        for tick in 0..10 {
            let report = analyzer
                .tick(start + settings.update_interval * tick, &mut source)
                .unwrap();
            assert_eq!(report.window, Some((0, 0)));
            for column in 0..analyzer.bucket_count() {
                assert_eq!(analyzer.get(column, 128), 0);
            }
        }
    }

    #[test]
    fn test_waits_for_update_interval() {
        let (mut analyzer, settings) = analyzer(4);
        let mut source = Swing {
            peaks: vec![1000],
            read: 0,
        };
        let start = Instant::now();
        assert!(analyzer.tick(start, &mut source).is_some());
        assert!(analyzer
            .tick(start + settings.update_interval - Duration::from_millis(1), &mut source)
            .is_none());
        assert_eq!(source.read, 1);
    }

    #[test]
    #[should_panic]
    fn test_rejects_column_out_of_range() {
        let (analyzer, _) = analyzer(4);
        analyzer.get(4, 0);
    }
}
