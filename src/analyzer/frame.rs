//! Double-buffered spectra and render-time interpolation.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    A,
    B,
}

/// Two equally sized spectra whose "current" and "previous" roles alternate.
///
/// Swapping flips a role flag; the buffers themselves are never copied.
#[derive(Debug, Clone)]
pub struct DoubleBuffer {
    a: Box<[u16]>,
    b: Box<[u16]>,
    current: Slot,
}

impl DoubleBuffer {
    pub fn new(len: usize) -> Self {
        Self {
            a: vec![0u16; len].into_boxed_slice(),
            b: vec![0u16; len].into_boxed_slice(),
            current: Slot::A,
        }
    }

    /// Makes the current frame the previous one; the old previous frame becomes
    /// the slot the next analysis writes into.
    pub fn swap(&mut self) {
        self.current = match self.current {
            Slot::A => Slot::B,
            Slot::B => Slot::A,
        };
    }

    pub fn current(&self) -> &[u16] {
        match self.current {
            Slot::A => &self.a,
            Slot::B => &self.b,
        }
    }

    pub fn current_mut(&mut self) -> &mut [u16] {
        match self.current {
            Slot::A => &mut self.a,
            Slot::B => &mut self.b,
        }
    }

    pub fn previous(&self) -> &[u16] {
        match self.current {
            Slot::A => &self.b,
            Slot::B => &self.a,
        }
    }

    /// Bin `index` blended from the previous towards the current frame by `k / 255`.
    pub fn blended(&self, index: usize, k: u8) -> u16 {
        interpolate(self.previous()[index], self.current()[index], k)
    }
}

/// `prev - (prev - curr) · k / 255`: `prev` at `k = 0`, `curr` at `k = 255`.
#[inline]
pub fn interpolate(prev: u16, curr: u16, k: u8) -> u16 {
    let prev = prev as i32;
    let curr = curr as i32;
    (prev - (prev - curr) * k as i32 / 255) as u16
}

/// Fraction of the update interval elapsed since the last analysis, in `0..=255`.
pub fn blend_factor(elapsed: Duration, update_interval: Duration) -> u8 {
    let interval = update_interval.as_micros();
    if interval == 0 {
        return u8::MAX;
    }
    (elapsed.as_micros() * 255 / interval).min(255) as u8
}
