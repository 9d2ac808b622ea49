//! Configuration violations.
//!
//! All of these are fatal at startup: they are checked once before any lookup table
//! is built and never during steady-state processing.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("transform size must be a power of two of at least 4, got {0}")]
    TransformSize(usize),
    #[error("display needs at least two columns, got {0}")]
    BucketCount(usize),
    #[error("display needs at least one row")]
    Rows,
    #[error("sample rate must be greater than zero")]
    SampleRate,
    #[error("update interval must be greater than zero")]
    UpdateInterval,
    #[error("render interval ({render_ms} ms) must be between 1 ms and the update interval ({update_ms} ms)")]
    RenderInterval { render_ms: u64, update_ms: u64 },
    #[error("frequency range must be positive and increasing, got {min}..{max} Hz")]
    FrequencyRange { min: f32, max: f32 },
}
