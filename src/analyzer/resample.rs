//! Logarithmic frequency bucketing.
//!
//! Maps display columns onto octave-spaced ranges of magnitude bins so that low
//! frequencies get as much screen space as high ones.

use std::ops::RangeInclusive;

/// Boundary indices of each display bucket into a magnitude spectrum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketIndex {
    boundaries: Box<[usize]>,
}

impl BucketIndex {
    /// Builds the table for `bucket_count` buckets over `input_size` bins.
    ///
    /// `boundary[i] = floor(input_size · min_freq · step^i / max_freq)` with
    /// `step = (max_freq / min_freq)^(1 / bucket_count)`; the first entry is 0 and
    /// the last is `input_size - 1`. Inner entries are clamped so the table never
    /// decreases.
    ///
    /// # Panics
    /// If `bucket_count < 2`, `input_size == 0`, or the frequency bounds are not
    /// positive and increasing.
    pub fn new(min_freq: f32, max_freq: f32, bucket_count: usize, input_size: usize) -> Self {
        assert!(bucket_count > 1, "need at least two buckets, got {bucket_count}");
        assert!(input_size > 0, "cannot bucket an empty spectrum");
        assert!(
            min_freq > 0.0 && max_freq > min_freq,
            "invalid frequency range {min_freq}..{max_freq}"
        );

        let last = input_size - 1;
        let step = (max_freq / min_freq).powf(1.0 / bucket_count as f32);

        let mut boundaries = vec![0usize; bucket_count];
        let mut freq = min_freq;
        for i in 1..bucket_count - 1 {
            freq *= step;
            let index = (input_size as f32 * freq / max_freq).floor() as usize;
            boundaries[i] = index.clamp(boundaries[i - 1], last);
        }
        boundaries[bucket_count - 1] = last;

        Self {
            boundaries: boundaries.into_boxed_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    /// Upper boundary (inclusive) of bucket `index`.
    #[cfg(test)]
    pub fn boundary(&self, index: usize) -> usize {
        self.boundaries[index]
    }

    /// Bins averaged into bucket `index`: from the previous boundary to this one.
    pub fn range(&self, index: usize) -> RangeInclusive<usize> {
        let start = if index > 0 {
            self.boundaries[index - 1]
        } else {
            0
        };
        start..=self.boundaries[index]
    }

    #[cfg(test)]
    pub fn as_slice(&self) -> &[usize] {
        &self.boundaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_well_formed(table: &BucketIndex, bucket_count: usize, input_size: usize) {
        assert_eq!(table.len(), bucket_count);
        assert_eq!(table.boundary(0), 0);
        assert_eq!(table.boundary(bucket_count - 1), input_size - 1);
        for pair in table.as_slice().windows(2) {
            assert!(pair[0] <= pair[1], "table decreases: {:?}", table.as_slice());
        }
    }

    #[test]
    fn test_default_matrix_layout() {
        // 9200 Hz, 128-sample transform, 32 columns
        let sample_rate = 9200.0;
        let table = BucketIndex::new(sample_rate / 64.0, sample_rate, 32, 64);
        assert_well_formed(&table, 32, 64);

        // Octave spacing: low buckets are narrow, high buckets are wide.
        let low = table.range(2);
        let high = table.range(30);
        assert!(high.end() - high.start() > low.end() - low.start());
    }

    #[test]
    fn test_many_shapes_are_well_formed() {
        for bucket_count in [2, 3, 8, 16, 32, 64] {
            for input_size in [4, 32, 64, 128] {
                for (min_freq, max_freq) in [(20.0, 20000.0), (143.75, 9200.0), (1.0, 1.5)] {
                    let table = BucketIndex::new(min_freq, max_freq, bucket_count, input_size);
                    assert_well_formed(&table, bucket_count, input_size);
                }
            }
        }
    }

    #[test]
    fn test_first_range_starts_at_zero() {
        let table = BucketIndex::new(100.0, 8000.0, 8, 64);
        assert_eq!(*table.range(0).start(), 0);
        assert_eq!(table.range(0), 0..=0);
        assert_eq!(*table.range(3).start(), table.boundary(2));
    }

    #[test]
    #[should_panic]
    fn test_rejects_single_bucket() {
        BucketIndex::new(100.0, 8000.0, 1, 64);
    }
}
