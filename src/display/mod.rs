//! Output side of the pipeline.
//!
//! Analyzers hand each column's value to a [`Renderer`]. [`LedMatrix`] turns
//! values into lit LEDs; [`MatrixView`] shows a matrix in the terminal.

pub mod matrix;
pub mod view;

pub use matrix::LedMatrix;
pub use view::{MatrixView, Status, ViewCommand};

use std::io;

/// Sink for one rendered frame.
pub trait Renderer {
    /// Turns every LED off.
    fn clear(&mut self);

    /// Lights column `x` proportionally to `value / max_value`.
    fn draw_column(&mut self, x: usize, value: u16, max_value: u16);

    /// Pushes the frame to the output device.
    fn flush(&mut self) -> io::Result<()>;
}
