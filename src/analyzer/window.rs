//! Sliding-window minimum and maximum for auto-gain.
//!
//! Each window is a monotonic deque of `(value, insertion index)` pairs. Expired
//! entries leave from the front, dominated entries from the back, so the front is
//! always the extremum of the last `capacity` additions and `add` is O(1) amortized.

use std::collections::VecDeque;

/// Which extremum a [`SlidingWindow`] tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Min,
    Max,
}

/// Minimum or maximum of the last `capacity` values added.
#[derive(Debug, Clone)]
pub struct SlidingWindow<T> {
    mode: Extremum,
    capacity: usize,
    entries: VecDeque<(T, u64)>,
    added: u64,
}

impl<T: Copy + Ord> SlidingWindow<T> {
    /// Creates an empty window. A capacity of 0 is treated as 1.
    pub fn new(mode: Extremum, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            mode,
            capacity,
            entries: VecDeque::with_capacity(capacity),
            added: 0,
        }
    }

    pub fn add(&mut self, value: T) {
        let index = self.added;
        self.added += 1;

        while let Some(&(_, inserted)) = self.entries.front() {
            if inserted + self.capacity as u64 <= index {
                self.entries.pop_front();
            } else {
                break;
            }
        }

        while let Some(&(back, _)) = self.entries.back() {
            if self.dominates(value, back) {
                self.entries.pop_back();
            } else {
                break;
            }
        }

        self.entries.push_back((value, index));
    }

    /// Current extremum, `None` until the first `add`.
    pub fn get(&self) -> Option<T> {
        self.entries.front().map(|&(value, _)| value)
    }

    fn dominates(&self, incoming: T, existing: T) -> bool {
        match self.mode {
            Extremum::Min => incoming <= existing,
            Extremum::Max => incoming >= existing,
        }
    }
}

/// Rolling minimum and maximum over the same trailing window.
#[derive(Debug, Clone)]
pub struct GainTracker<T> {
    min: SlidingWindow<T>,
    max: SlidingWindow<T>,
}

impl<T: Copy + Ord> GainTracker<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            min: SlidingWindow::new(Extremum::Min, capacity),
            max: SlidingWindow::new(Extremum::Max, capacity),
        }
    }

    pub fn add(&mut self, value: T) {
        self.min.add(value);
        self.max.add(value);
    }

    /// Feeds one frame's extremes: `low` into the minimum window, `high` into the maximum.
    pub fn add_range(&mut self, low: T, high: T) {
        self.min.add(low);
        self.max.add(high);
    }

    pub fn min(&self) -> Option<T> {
        self.min.get()
    }

    pub fn max(&self) -> Option<T> {
        self.max.get()
    }

    /// `(min, max)` once anything has been added.
    pub fn bounds(&self) -> Option<(T, T)> {
        Some((self.min()?, self.max()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive(history: &[u16], capacity: usize) -> (u16, u16) {
        let start = history.len().saturating_sub(capacity);
        let window = &history[start..];
        (*window.iter().min().unwrap(), *window.iter().max().unwrap())
    }

    #[test]
    fn test_empty_window_has_no_extremum() {
        let tracker: GainTracker<u16> = GainTracker::new(4);
        assert_eq!(tracker.min(), None);
        assert_eq!(tracker.max(), None);
        assert_eq!(tracker.bounds(), None);
    }

    #[test]
    fn test_zero_capacity_behaves_as_one() {
        let mut tracker = GainTracker::new(0);
        tracker.add(9u16);
        tracker.add(3);
        assert_eq!(tracker.bounds(), Some((3, 3)));
    }

    #[test]
    fn test_matches_naive_rescan() {
        let mut seed: u32 = 0x1234_5678;
        for capacity in [1, 2, 3, 7, 15] {
            let mut tracker = GainTracker::new(capacity);
            let mut history = Vec::new();
            for _ in 0..500 {
                seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                let value = (seed >> 20) as u16;
                tracker.add(value);
                history.push(value);

                let (min, max) = tracker.bounds().unwrap();
                assert_eq!((min, max), naive(&history, capacity));
                assert!(min <= max);
            }
        }
    }

    #[test]
    fn test_old_extremes_expire() {
        let mut tracker = GainTracker::new(3);
        for value in [100u16, 5, 50, 60, 70] {
            tracker.add(value);
        }
        assert_eq!(tracker.bounds(), Some((50, 70)));
    }

    #[test]
    fn test_constant_run_collapses_window() {
        let capacity = 5;
        let mut tracker = GainTracker::new(capacity);
        for value in [0u16, 4000, 17, 3999, 2] {
            tracker.add(value);
        }
        for _ in 0..capacity {
            tracker.add(1234);
        }
        assert_eq!(tracker.min(), tracker.max());
        assert_eq!(tracker.min(), Some(1234));
    }

    #[test]
    fn test_add_range_feeds_separate_windows() {
        let mut tracker = GainTracker::new(2);
        tracker.add_range(10u16, 900);
        tracker.add_range(20, 300);
        assert_eq!(tracker.bounds(), Some((10, 900)));
        tracker.add_range(30, 200);
        assert_eq!(tracker.bounds(), Some((20, 300)));
    }

    #[test]
    fn test_deque_stays_bounded() {
        let mut window = SlidingWindow::new(Extremum::Max, 8);
        for value in (0u32..1000).rev() {
            window.add(value);
            assert!(window.entries.len() <= 8);
        }
        assert_eq!(window.get(), Some(7));
    }
}
