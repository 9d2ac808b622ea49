//! Mono downmix and integer-factor decimation of interleaved PCM.

/// Averages interleaved frames to mono, then averages every `factor` mono
/// samples into one output sample.
///
/// Averaging before dropping samples acts as a crude low-pass filter, which keeps
/// most of the aliasing out of the analysis band.
#[derive(Debug, Clone)]
pub struct Decimator {
    channels: usize,
    factor: usize,
    accumulated: i64,
    count: usize,
}

impl Decimator {
    pub fn new(channels: usize, factor: usize) -> Self {
        Self {
            channels: channels.max(1),
            factor: factor.max(1),
            accumulated: 0,
            count: 0,
        }
    }

    /// Factor that brings `device_rate` closest to `target_rate` from above.
    pub fn factor_for(device_rate: u32, target_rate: u32) -> usize {
        if target_rate == 0 {
            return 1;
        }
        (device_rate / target_rate).max(1) as usize
    }

    /// Feeds interleaved `frames`, calling `emit` for every finished output sample.
    ///
    /// A trailing partial frame is ignored.
    pub fn push(&mut self, frames: &[i16], mut emit: impl FnMut(i16)) {
        for frame in frames.chunks_exact(self.channels) {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            self.accumulated += (sum / self.channels as i32) as i64;
            self.count += 1;

            if self.count == self.factor {
                emit((self.accumulated / self.factor as i64) as i16);
                self.accumulated = 0;
                self.count = 0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::source::{pcm_to_sample, SampleRing, SAMPLE_MIDPOINT};

    fn collect(decimator: &mut Decimator, frames: &[i16]) -> Vec<i16> {
        let mut out = Vec::new();
        decimator.push(frames, |s| out.push(s));
        out
    }

    #[test]
    fn test_factor_for_rates() {
        assert_eq!(Decimator::factor_for(48000, 9600), 5);
        assert_eq!(Decimator::factor_for(44100, 9600), 4);
        assert_eq!(Decimator::factor_for(8000, 9600), 1);
        assert_eq!(Decimator::factor_for(48000, 0), 1);
    }

    #[test]
    fn test_passthrough_mono() {
        let mut decimator = Decimator::new(1, 1);
        assert_eq!(collect(&mut decimator, &[1, -2, 300]), vec![1, -2, 300]);
    }

    #[test]
    fn test_stereo_downmix_and_average() {
        let mut decimator = Decimator::new(2, 2);
        // Frames: (10, 30) (0, 40) | (-100, -100) (i16::MAX, i16::MAX)
        let out = collect(&mut decimator, &[10, 30, 0, 40, -100, -100, i16::MAX, i16::MAX]);
        assert_eq!(out, vec![20, ((-100 + i16::MAX as i32) / 2) as i16]);
    }

    #[test]
    fn test_partial_groups_carry_across_calls() {
        let mut decimator = Decimator::new(1, 3);
        assert!(collect(&mut decimator, &[3, 6]).is_empty());
        assert_eq!(collect(&mut decimator, &[9, 1, 1]), vec![6]);
        assert_eq!(collect(&mut decimator, &[1]), vec![1]);
    }

    #[test]
    fn test_zero_channels_and_factor_are_raised() {
        let mut decimator = Decimator::new(0, 0);
        assert_eq!(collect(&mut decimator, &[5, -5]), vec![5, -5]);
    }

    #[test]
    fn test_downmix_feeds_ring_in_sample_range() {
        let mut decimator = Decimator::new(2, 1);
        let mut ring = SampleRing::new(2);
        decimator.push(&[i16::MIN, i16::MIN, 1000, -1000], |s| {
            ring.push(pcm_to_sample(s))
        });
        let mut out = [0u16; 2];
        ring.copy_ordered(&mut out);
        assert_eq!(out, [0, SAMPLE_MIDPOINT]);
    }

    #[test]
    fn test_large_factor_does_not_overflow() {
        let factor = Decimator::factor_for(192_000, 1);
        assert_eq!(factor, 192_000);
        let mut decimator = Decimator::new(1, factor);
        let out = collect(&mut decimator, &vec![i16::MAX; factor]);
        assert_eq!(out, vec![i16::MAX]);

        let out = collect(&mut decimator, &vec![i16::MIN; factor]);
        assert_eq!(out, vec![i16::MIN]);
    }
}
