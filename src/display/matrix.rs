//! In-memory LED framebuffer.

use super::Renderer;
use std::io;

/// A grid of single-color LEDs addressed by column height.
///
/// Row 0 is the top row. Columns fill upwards from the bottom, or downwards from
/// the top when `invert` is set.
#[derive(Debug, Clone)]
pub struct LedMatrix {
    rows: usize,
    invert: bool,
    heights: Box<[usize]>,
}

impl LedMatrix {
    pub fn new(columns: usize, rows: usize, invert: bool) -> Self {
        Self {
            rows,
            invert,
            heights: vec![0; columns].into_boxed_slice(),
        }
    }

    pub fn columns(&self) -> usize {
        self.heights.len()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of lit LEDs in column `x`.
    #[cfg(test)]
    pub fn height(&self, x: usize) -> usize {
        self.heights[x]
    }

    #[cfg(test)]
    pub fn heights(&self) -> &[usize] {
        &self.heights
    }

    /// Whether the LED at column `x`, row `y` is lit.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        let height = self.heights[x];
        if self.invert {
            y < height
        } else {
            y >= self.rows - height
        }
    }

    /// Number of LEDs lit by `value` out of `max_value`.
    pub fn column_height(&self, value: u16, max_value: u16) -> usize {
        if max_value == 0 {
            return 0;
        }
        value.min(max_value) as usize * self.rows / max_value as usize
    }
}

impl Renderer for LedMatrix {
    fn clear(&mut self) {
        self.heights.fill(0);
    }

    fn draw_column(&mut self, x: usize, value: u16, max_value: u16) {
        let height = self.column_height(value, max_value);
        if let Some(column) = self.heights.get_mut(x) {
            *column = height;
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_heights() {
        let mut matrix = LedMatrix::new(4, 8, false);
        matrix.draw_column(0, 0, 4096);
        matrix.draw_column(1, 2048, 4096);
        matrix.draw_column(2, 4096, 4096);
        matrix.draw_column(3, 511, 4096);
        assert_eq!(matrix.heights(), &[0, 4, 8, 0]);

        matrix.draw_column(3, 512, 4096);
        assert_eq!(matrix.height(3), 1);
    }

    #[test]
    fn test_values_are_clamped() {
        let mut matrix = LedMatrix::new(2, 8, false);
        matrix.draw_column(0, u16::MAX, 4096);
        matrix.draw_column(1, 100, 0);
        assert_eq!(matrix.heights(), &[8, 0]);
    }

    #[test]
    fn test_columns_fill_from_bottom() {
        let mut matrix = LedMatrix::new(1, 4, false);
        matrix.draw_column(0, 2, 4);
        let lit: Vec<bool> = (0..4).map(|y| matrix.pixel(0, y)).collect();
        assert_eq!(lit, [false, false, true, true]);
    }

    #[test]
    fn test_inverted_columns_fill_from_top() {
        let mut matrix = LedMatrix::new(1, 4, true);
        matrix.draw_column(0, 3, 4);
        let lit: Vec<bool> = (0..4).map(|y| matrix.pixel(0, y)).collect();
        assert_eq!(lit, [true, true, true, false]);
    }

    #[test]
    fn test_clear_and_out_of_range_column() {
        let mut matrix = LedMatrix::new(2, 8, false);
        matrix.draw_column(0, 4096, 4096);
        matrix.draw_column(5, 4096, 4096);
        assert_eq!(matrix.heights(), &[8, 0]);
        matrix.clear();
        assert_eq!(matrix.heights(), &[0, 0]);
        assert!(matrix.flush().is_ok());
    }
}
