//! Configuration file management for ledspec.
//!
//! The configuration lives in `~/.config/ledspec/ledspec.toml`. Every field has a
//! default, so a partial file (or an empty one) is valid.

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// What the matrix shows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Log-frequency spectrum, one column per bucket
    #[default]
    Spectrum,
    /// Scrolling peak-to-peak volume, newest column on the left
    Volume,
}

impl std::fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spectrum => write!(f, "spectrum"),
            Self::Volume => write!(f, "volume"),
        }
    }
}

/// Strategy used by the transform engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransformKind {
    /// Direct form up to 128 samples, fast form above
    #[default]
    Auto,
    /// O(N²) correlation
    Direct,
    /// O(N log N) radix-2 recursion
    Fast,
}

impl std::fmt::Display for TransformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Direct => write!(f, "direct"),
            Self::Fast => write!(f, "fast"),
        }
    }
}

/// Audio input configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Audio device to use. Options:
    /// - "default" for system default device
    /// - numeric index (0, 1, 2, etc.) from `ledspec list-devices`
    /// - device name from `ledspec list-devices`
    pub device: String,
    /// Target analysis sample rate in Hz. Capture is decimated from the device rate
    /// towards this value.
    pub sample_rate: u32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: "default".to_string(),
            sample_rate: 9600,
        }
    }
}

/// Signal-processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Samples per transform, a power of two
    pub transform_size: usize,
    /// Transform strategy: "auto", "direct" or "fast"
    pub transform: TransformKind,
    /// Integer gain applied to every magnitude bin
    pub gain: u32,
    /// Bins quieter than this are left out of bucket averages
    pub gate: u16,
    /// Milliseconds between analysis ticks
    pub update_interval_ms: u64,
    /// Milliseconds between render ticks, at most the update interval
    pub render_interval_ms: u64,
    /// Milliseconds of history the auto-gain adapts over
    pub window_duration_ms: u64,
    /// Lower frequency bound for bucket spacing, defaults to one bin width
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_freq: Option<f32>,
    /// Upper frequency bound for bucket spacing, defaults to the sample rate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_freq: Option<f32>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            transform_size: 128,
            transform: TransformKind::Auto,
            gain: 10,
            gate: 1,
            update_interval_ms: 1000 / 15,
            render_interval_ms: 1000 / 30,
            window_duration_ms: 3000,
            min_freq: None,
            max_freq: None,
        }
    }
}

/// LED matrix configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Number of columns (display buckets)
    pub columns: usize,
    /// Number of LEDs per column
    pub rows: usize,
    /// "spectrum" or "volume"
    pub mode: DisplayMode,
    /// Light columns from the top instead of the bottom
    pub invert: bool,
    /// LED color as "#rrggbb"
    pub color: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            columns: 32,
            rows: 8,
            mode: DisplayMode::Spectrum,
            invert: false,
            color: "#ff3b1f".to_string(),
        }
    }
}

impl DisplayConfig {
    /// Parses `color`, falling back to the default red on malformed input.
    pub fn rgb(&self) -> (u8, u8, u8) {
        parse_hex_color(&self.color).unwrap_or_else(|| {
            tracing::warn!("Invalid display color '{}', using default", self.color);
            (0xff, 0x3b, 0x1f)
        })
    }
}

fn parse_hex_color(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.trim().strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedspecConfig {
    /// Written by setup; compared against the binary version on startup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_version: Option<String>,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl LedspecConfig {
    /// Loads configuration from the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the config file cannot be read
    /// - If the TOML is malformed
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path()?)
    }

    /// Loads configuration from an explicit path.
    ///
    /// # Errors
    /// - If the file cannot be read
    /// - If the TOML is malformed
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read {}: {e}", path.display()))?;
        let config: LedspecConfig = toml::from_str(&content)
            .map_err(|e| anyhow!("Invalid configuration in {}: {e}", path.display()))?;
        Ok(config)
    }
}

/// Path to the config file, creating its directory if needed.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the config directory cannot be created
pub fn config_path() -> anyhow::Result<PathBuf> {
    let config_dir = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".config")
        .join("ledspec");

    fs::create_dir_all(&config_dir)
        .map_err(|e| anyhow!("Failed to create config directory: {e}"))?;

    Ok(config_dir.join("ledspec.toml"))
}
