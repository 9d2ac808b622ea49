//! Sample sources feeding the analyzers.
//!
//! Samples are unsigned with 12 meaningful bits (`0..=4095`), the range of the
//! ADC the pipeline was tuned for. Signed PCM from a sound card is converted with
//! [`pcm_to_sample`].

/// Largest sample value.
pub const SAMPLE_MAX: u16 = 4095;

/// Sample value of silence.
pub const SAMPLE_MIDPOINT: u16 = 2048;

/// Produces a window of `size()` samples on demand.
pub trait SampleSource {
    /// Number of samples written by `read`.
    fn size(&self) -> usize;

    /// Rate the samples were taken at, in Hz.
    fn sample_rate(&self) -> u32;

    /// Fills `out` (of length `size()`) with the most recent samples, oldest first.
    fn read(&mut self, out: &mut [u16]);
}

/// Converts a signed 16-bit PCM sample to the unsigned 12-bit range.
#[inline]
pub fn pcm_to_sample(pcm: i16) -> u16 {
    ((pcm as i32 + 32768) >> 4) as u16
}

/// Fixed-capacity ring of samples, overwritten oldest first.
#[derive(Debug, Clone)]
pub struct SampleRing {
    data: Box<[u16]>,
    next: usize,
}

impl SampleRing {
    /// Creates a ring of `size` samples filled with silence.
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "SampleRing size must be greater than zero");
        Self {
            data: vec![SAMPLE_MIDPOINT; size].into_boxed_slice(),
            next: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn push(&mut self, sample: u16) {
        self.data[self.next] = sample;
        self.next += 1;
        if self.next == self.data.len() {
            self.next = 0;
        }
    }

    /// Copies the ring into `out`, oldest sample first.
    pub fn copy_ordered(&self, out: &mut [u16]) {
        assert_eq!(out.len(), self.data.len(), "output size mismatch");
        let (newer, older) = self.data.split_at(self.next);
        out[..older.len()].copy_from_slice(older);
        out[older.len()..].copy_from_slice(newer);
    }
}

/// Synthetic cosine tone, continuous across reads.
#[derive(Debug, Clone)]
pub struct ToneSource {
    size: usize,
    sample_rate: u32,
    frequency: f32,
    amplitude: f32,
    position: u64,
}

impl ToneSource {
    pub fn new(size: usize, sample_rate: u32, frequency: f32, amplitude: u16) -> Self {
        Self {
            size,
            sample_rate,
            frequency,
            amplitude: amplitude.min(SAMPLE_MIDPOINT) as f32,
            position: 0,
        }
    }

    /// A source that only ever produces silence.
    pub fn silence(size: usize, sample_rate: u32) -> Self {
        Self::new(size, sample_rate, 0.0, 0)
    }
}

impl SampleSource for ToneSource {
    fn size(&self) -> usize {
        self.size
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn read(&mut self, out: &mut [u16]) {
        let step = 2.0 * std::f64::consts::PI * self.frequency as f64 / self.sample_rate as f64;
        for slot in out.iter_mut() {
            let phase = (step * self.position as f64) % (2.0 * std::f64::consts::PI);
            let value = SAMPLE_MIDPOINT as f64 + self.amplitude as f64 * phase.cos();
            *slot = value.round().clamp(0.0, SAMPLE_MAX as f64) as u16;
            self.position += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pcm_conversion_range() {
        assert_eq!(pcm_to_sample(i16::MIN), 0);
        assert_eq!(pcm_to_sample(0), SAMPLE_MIDPOINT);
        assert_eq!(pcm_to_sample(i16::MAX), SAMPLE_MAX);
    }

    #[test]
    fn test_ring_reads_oldest_first_after_wrap() {
        let mut ring = SampleRing::new(4);
        for sample in 1..=6 {
            ring.push(sample);
        }
        let mut out = [0u16; 4];
        ring.copy_ordered(&mut out);
        assert_eq!(out, [3, 4, 5, 6]);
    }

    #[test]
    fn test_ring_starts_silent() {
        let ring = SampleRing::new(3);
        let mut out = [0u16; 3];
        ring.copy_ordered(&mut out);
        assert_eq!(out, [SAMPLE_MIDPOINT; 3]);
    }

    #[test]
    fn test_tone_is_continuous_and_bounded() {
        let mut tone = ToneSource::new(8, 8000, 1000.0, 5000);
        let mut first = [0u16; 8];
        let mut second = [0u16; 8];
        tone.read(&mut first);
        tone.read(&mut second);
        // 1 kHz at 8 kHz repeats every 8 samples
        assert_eq!(first, second);
        assert_eq!(first[0], SAMPLE_MAX);
        assert!(first.iter().all(|&v| v <= SAMPLE_MAX));
    }

    #[test]
    fn test_silence_is_flat() {
        let mut silence = ToneSource::silence(16, 8000);
        let mut out = [0u16; 16];
        silence.read(&mut out);
        assert!(out.iter().all(|&v| v == SAMPLE_MIDPOINT));
    }
}
