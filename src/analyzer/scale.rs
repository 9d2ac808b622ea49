//! Logarithmic amplitude compression with adaptive auto-gain.
//!
//! Values are normalized against the rolling min/max of recent frames and mapped
//! through a `log10` table, so quiet and loud passages both use the full
//! `0..=MAX_VALUE` range after a few seconds of adaptation.

use super::window::GainTracker;

/// Number of entries in the log table.
pub const LOG_COUNT: usize = 256;

/// Upper bound of every compressed value.
pub const MAX_VALUE: u16 = 4096;

/// Precomputed `log10(1 + 9·i/(K-1))·MAX_VALUE` for `i in 0..K`.
#[derive(Debug, Clone)]
pub struct LogTable {
    values: [u16; LOG_COUNT],
}

impl LogTable {
    pub fn new() -> Self {
        let last = (LOG_COUNT - 1) as f32;
        let values = std::array::from_fn(|i| {
            let value = (1.0 + 9.0 * i as f32 / last).log10() * MAX_VALUE as f32;
            (value.round() as u16).min(MAX_VALUE)
        });
        Self { values }
    }

    #[inline]
    pub fn get(&self, index: usize) -> u16 {
        self.values[index.min(LOG_COUNT - 1)]
    }
}

impl Default for LogTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Compresses `data` in place into `0..=MAX_VALUE` relative to `[window_min, window_max]`.
///
/// Does nothing when the window has no width.
pub fn compress(table: &LogTable, data: &mut [u16], window_min: u16, window_max: u16) {
    if window_max <= window_min {
        return;
    }

    let width = (window_max - window_min) as u32;
    let top = (LOG_COUNT - 1) as u32;
    for value in data.iter_mut() {
        let signal = value.saturating_sub(window_min) as u32;
        let rel = (signal * top / width).min(top);
        *value = table.get(rel as usize);
    }
}

/// Auto-gain state shared by the spectrum and volume analyzers.
pub struct LogScale {
    table: LogTable,
    tracker: GainTracker<u16>,
}

impl LogScale {
    /// `window` is the number of analysis ticks the gain adapts over.
    pub fn new(window: usize) -> Self {
        Self {
            table: LogTable::new(),
            tracker: GainTracker::new(window),
        }
    }

    /// Current auto-gain bounds, `None` before anything was tracked.
    pub fn bounds(&self) -> Option<(u16, u16)> {
        self.tracker.bounds()
    }

    /// Tracks this frame's extremes and compresses it against the window.
    ///
    /// Returns the window bounds that were applied.
    pub fn scale(&mut self, data: &mut [u16]) -> Option<(u16, u16)> {
        let frame_min = data.iter().copied().min()?;
        let frame_max = data.iter().copied().max()?;
        tracing::trace!("LogScale input: {}..{}", frame_min, frame_max);

        self.tracker.add_range(frame_min, frame_max);
        let (min, max) = self.tracker.bounds()?;
        tracing::trace!("LogScale window: {}..{}", min, max);

        compress(&self.table, data, min, max);
        Some((min, max))
    }

    /// Peak-to-peak amplitude of `samples`, auto-gained and log-compressed.
    ///
    /// Returns 0 while the window has no width.
    pub fn amplitude(&mut self, samples: &[u16]) -> u16 {
        let (Some(low), Some(high)) = (samples.iter().min(), samples.iter().max()) else {
            return 0;
        };
        let peak_to_peak = high - low;

        self.tracker.add(peak_to_peak);
        match self.tracker.bounds() {
            Some((min, max)) if max > min => {
                let mut value = [peak_to_peak];
                compress(&self.table, &mut value, min, max);
                value[0]
            }
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_table_endpoints_and_monotonic() {
        let table = LogTable::new();
        assert_eq!(table.get(0), 0);
        assert_eq!(table.get(LOG_COUNT - 1), MAX_VALUE);
        assert_eq!(table.get(LOG_COUNT + 10), MAX_VALUE);
        for i in 1..LOG_COUNT {
            assert!(table.get(i - 1) <= table.get(i), "table dips at {i}");
        }
    }

    #[test]
    fn test_compress_is_monotonic() {
        let table = LogTable::new();
        let mut data: Vec<u16> = (0..3000).step_by(7).collect();
        let original = data.clone();
        compress(&table, &mut data, 400, 2200);

        for pair in original.windows(2).zip(data.windows(2)) {
            let (before, after) = pair;
            assert!(before[0] < before[1]);
            assert!(after[0] <= after[1]);
        }
        assert!(data.iter().all(|&v| v <= MAX_VALUE));
    }

    #[test]
    fn test_compress_clamps_outside_window() {
        let table = LogTable::new();
        let mut data = [0u16, 100, 1000, 60000];
        compress(&table, &mut data, 100, 1000);
        assert_eq!(data, [0, 0, MAX_VALUE, MAX_VALUE]);
    }

    #[test]
    fn test_compress_is_noop_on_collapsed_window() {
        let table = LogTable::new();
        let mut data = [5u16, 700, 3, 4095];
        compress(&table, &mut data, 42, 42);
        assert_eq!(data, [5, 700, 3, 4095]);
    }

    #[test]
    fn test_scale_adapts_to_recent_frames() {
        let mut scale = LogScale::new(2);
        let mut loud = [0u16, 1000, 2000];
        assert_eq!(scale.scale(&mut loud), Some((0, 2000)));
        assert_eq!(loud[2], MAX_VALUE);

        let mut quiet = [10u16, 20];
        assert_eq!(scale.scale(&mut quiet), Some((0, 2000)));
        assert!(quiet[1] < MAX_VALUE / 4);

        let mut quiet_again = [10u16, 20];
        assert_eq!(scale.scale(&mut quiet_again), Some((10, 20)));
        assert_eq!(quiet_again, [0, MAX_VALUE]);
    }

    #[test]
    fn test_scale_leaves_flat_spectrum_untouched() {
        let mut scale = LogScale::new(3);
        for _ in 0..5 {
            let mut silent = [0u16; 16];
            assert_eq!(scale.scale(&mut silent), Some((0, 0)));
            assert!(silent.iter().all(|&v| v == 0));
        }
    }

    #[test]
    fn test_amplitude_tracks_peak_to_peak() {
        let mut scale = LogScale::new(4);
        assert_eq!(scale.amplitude(&[2048; 8]), 0);
        assert_eq!(scale.amplitude(&[1048, 3048, 2048]), MAX_VALUE);
        let half = scale.amplitude(&[1548, 2548]);
        assert!(half > 0 && half < MAX_VALUE);
        assert_eq!(scale.amplitude(&[]), 0);
    }
}
