//! Configuration management for ledspec.
//!
//! Loads the TOML configuration file from the user's config directory and defines
//! the typed errors raised when a configuration cannot drive the analyzer.

pub mod error;
pub mod file;

pub use error::ConfigError;
pub use file::{
    config_path, AnalyzerConfig, AudioConfig, DisplayConfig, DisplayMode, LedspecConfig,
    TransformKind,
};
