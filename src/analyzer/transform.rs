//! Fixed-point magnitude spectrum built on a cosine-only correlation.
//!
//! Each bin is the absolute value of the real part of the DFT, computed with an
//! integer cosine table. Dropping the sine term halves the multiply-accumulate work,
//! which is fine for a visualizer that only needs a magnitude-like energy curve.

use crate::config::TransformKind;

/// Amplitude of the integer cosine table.
pub const COS_AMOUNT: i64 = 4096;

/// Largest transform size still computed with the direct form under `TransformKind::Auto`.
pub const DIRECT_FORM_LIMIT: usize = 128;

/// Integer cosine samples at `size` equally spaced phase points.
///
/// The table is built from its first quadrant and mirrored, so
/// `cos[j + size / 2] == -cos[j]` holds exactly and constant input cancels to zero.
#[derive(Debug, Clone)]
pub struct CosineTable {
    values: Box<[i16]>,
}

impl CosineTable {
    pub fn new(size: usize) -> Self {
        assert!(
            size >= 4 && size.is_power_of_two(),
            "cosine table size must be a power of two >= 4, got {size}"
        );

        let step = 2.0 * std::f64::consts::PI / size as f64;
        let mut values = vec![0i16; size];
        for i in 0..=size / 4 {
            let q = ((step * i as f64).cos() * COS_AMOUNT as f64).round() as i16;
            values[i] = q;
            values[(size - i) % size] = q;
            values[size / 2 - i] = -q;
            values[size / 2 + i] = -q;
        }

        Self {
            values: values.into_boxed_slice(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `cos(2π·index/size)·COS_AMOUNT`, index taken modulo the table size.
    #[inline]
    pub fn cos(&self, index: usize) -> i64 {
        self.values[index % self.values.len()] as i64
    }

    /// `sin(2π·index/size)·COS_AMOUNT`, read from the same table a quarter period back.
    #[inline]
    pub fn sin(&self, index: usize) -> i64 {
        let len = self.values.len();
        self.values[(index % len + len - len / 4) % len] as i64
    }
}

/// Complex partial sum used by the fast form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Partial {
    re: i64,
    im: i64,
}

/// Converts `size` unsigned samples into `size / 2` magnitude bins.
///
/// Both strategies compute the same quantity:
/// `|Σ samples[i]·cos[(f·i) mod size]| / COS_AMOUNT · gain / (size / 2)`.
/// Accumulation is done in 64 bits; a 32-bit accumulator overflows at size 256
/// with 12-bit samples.
pub struct Transform {
    cos_table: CosineTable,
    gain: u32,
    kind: TransformKind,
    scratch: Box<[Partial]>,
    raw: Box<[i64]>,
}

impl Transform {
    /// Creates a transform for `size` samples.
    ///
    /// `TransformKind::Auto` resolves to the direct form up to [`DIRECT_FORM_LIMIT`]
    /// samples and to the fast form above it.
    ///
    /// # Panics
    /// If `size` is not a power of two or is smaller than 4.
    pub fn new(size: usize, gain: u32, kind: TransformKind) -> Self {
        let kind = match kind {
            TransformKind::Auto if size <= DIRECT_FORM_LIMIT => TransformKind::Direct,
            TransformKind::Auto => TransformKind::Fast,
            other => other,
        };

        Self {
            cos_table: CosineTable::new(size),
            gain,
            kind,
            scratch: vec![Partial::default(); size].into_boxed_slice(),
            raw: vec![0i64; size / 2].into_boxed_slice(),
        }
    }

    /// Number of input samples.
    pub fn size(&self) -> usize {
        self.cos_table.len()
    }

    /// Number of output bins.
    pub fn spectrum_size(&self) -> usize {
        self.cos_table.len() / 2
    }

    /// The resolved strategy, never `Auto`.
    pub fn kind(&self) -> TransformKind {
        self.kind
    }

    /// Runs the transform, writing `spectrum_size()` bins into `out`.
    ///
    /// Bin 0 carries the DC offset of the unsigned input and is replaced by bin 1.
    pub fn transform(&mut self, samples: &[u16], out: &mut [u16]) {
        assert_eq!(samples.len(), self.size(), "sample buffer size mismatch");
        assert_eq!(out.len(), self.spectrum_size(), "spectrum buffer size mismatch");

        match self.kind {
            TransformKind::Fast => self.fast(samples),
            _ => self.direct(samples),
        }

        self.raw[0] = self.raw[1];

        let bins = self.spectrum_size() as u64;
        for (slot, &value) in out.iter_mut().zip(self.raw.iter()) {
            let scaled = value.unsigned_abs() * self.gain as u64 / bins;
            *slot = scaled.min(u16::MAX as u64) as u16;
        }
    }

    /// O(N²) correlation, independent per bin.
    fn direct(&mut self, samples: &[u16]) {
        let table = &self.cos_table;
        for (freq, slot) in self.raw.iter_mut().enumerate() {
            let mut acc: i64 = 0;
            for (i, &sample) in samples.iter().enumerate() {
                acc += sample as i64 * table.cos(freq * i);
            }
            *slot = acc / COS_AMOUNT;
        }
    }

    /// O(N log N) radix-2 decimation in time over the shared cosine table.
    fn fast(&mut self, samples: &[u16]) {
        let Self {
            cos_table,
            scratch,
            raw,
            ..
        } = self;

        split_radix2(cos_table, samples, scratch, 0, 1);

        for (slot, partial) in raw.iter_mut().zip(scratch.iter()) {
            *slot = partial.re;
        }
    }
}

/// Recursive even/odd split by stride.
///
/// `out` receives the spectrum of `samples[start], samples[start + stride], ...`
/// (`out.len()` values). Twiddles `cos - i·sin` are read at `j·period`, where
/// `period = size / out.len()`.
fn split_radix2(
    table: &CosineTable,
    samples: &[u16],
    out: &mut [Partial],
    start: usize,
    stride: usize,
) {
    let length = out.len();
    if length == 1 {
        out[0] = Partial {
            re: samples[start] as i64,
            im: 0,
        };
        return;
    }

    let half = length / 2;
    let (even, odd) = out.split_at_mut(half);
    split_radix2(table, samples, even, start, stride * 2);
    split_radix2(table, samples, odd, start + stride, stride * 2);

    let period = table.len() / length;
    for j in 0..half {
        let (c, s) = (table.cos(j * period), table.sin(j * period));
        let o = odd[j];
        let t = Partial {
            re: rescale(o.re * c + o.im * s),
            im: rescale(o.im * c - o.re * s),
        };

        let e = even[j];
        even[j] = Partial {
            re: e.re + t.re,
            im: e.im + t.im,
        };
        odd[j] = Partial {
            re: e.re - t.re,
            im: e.im - t.im,
        };
    }
}

/// Divides a twiddle product by `COS_AMOUNT`, rounding half away from zero.
#[inline]
fn rescale(value: i64) -> i64 {
    let half = COS_AMOUNT / 2;
    if value >= 0 {
        (value + half) / COS_AMOUNT
    } else {
        (value - half) / COS_AMOUNT
    }
}
