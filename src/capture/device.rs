//! Input device lookup.

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait};

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// An input device as shown by `ledspec list-devices`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub index: usize,
    pub name: String,
    pub is_default: bool,
    /// Native sample rate and channel count, if the device reports them
    pub config: Option<(u32, u16)>,
}

impl DeviceInfo {
    /// One-line description, e.g. `Built-in Microphone [DEFAULT] (48000Hz, 2 ch)`.
    pub fn summary(&self) -> String {
        let default = if self.is_default { " [DEFAULT]" } else { "" };
        let config = match self.config {
            Some((rate, channels)) => format!(" ({rate}Hz, {channels} ch)"),
            None => " (configuration unavailable)".to_string(),
        };
        format!("{}{default}{config}", self.name)
    }

    /// Decimation factor capture would use on this device for `target_rate`.
    pub fn decimation(&self, target_rate: u32) -> Option<usize> {
        self.config
            .map(|(rate, _)| super::Decimator::factor_for(rate, target_rate))
    }
}

/// Enumerates input devices, skipping any whose name cannot be read.
///
/// # Errors
/// - If the audio host cannot enumerate devices
pub fn list_input_devices() -> Result<Vec<DeviceInfo>> {
    suppress_alsa_warnings(|| {
        let host = cpal::default_host();
        let default_name = host.default_input_device().and_then(|d| d.name().ok());

        let devices = host
            .input_devices()
            .map_err(|e| anyhow!("Failed to enumerate audio devices: {e}"))?
            .filter_map(|device| {
                let name = device.name().ok()?;
                let config = device
                    .default_input_config()
                    .ok()
                    .map(|c| (c.sample_rate().0, c.channels()));
                Some((name, config))
            })
            .enumerate()
            .map(|(index, (name, config))| DeviceInfo {
                index,
                is_default: default_name.as_deref() == Some(name.as_str()),
                name,
                config,
            })
            .collect();

        Ok(devices)
    })
}

/// Resolves `"default"`, a numeric index, or a device name to an input device.
///
/// # Errors
/// - If no input device matches
pub fn find_input_device(device_spec: &str) -> Result<cpal::Device> {
    suppress_alsa_warnings(|| {
        let host = cpal::default_host();

        if device_spec == "default" {
            return host
                .default_input_device()
                .ok_or_else(|| anyhow!("No audio input device available"));
        }

        let mut devices = host
            .input_devices()
            .map_err(|e| anyhow!("Failed to enumerate devices: {e}"))?;

        if let Ok(index) = device_spec.parse::<usize>() {
            let devices: Vec<_> = devices.collect();
            let count = devices.len();
            return devices.into_iter().nth(index).ok_or_else(|| {
                anyhow!(
                    "Device index {} is out of range (0-{})",
                    index,
                    count.saturating_sub(1)
                )
            });
        }

        devices
            .find(|device| device.name().map(|n| n == device_spec).unwrap_or(false))
            .ok_or_else(|| {
                anyhow!(
                    "Audio input device '{device_spec}' not found. Use 'ledspec list-devices' to see available devices."
                )
            })
    })
}

/// Runs `f` with stderr redirected to /dev/null, hiding ALSA's chatter about
/// unusable PCM plugins.
#[cfg(target_os = "linux")]
pub fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let dev_null = OpenOptions::new()
        .write(true)
        .open("/dev/null")
        .map_err(|e| anyhow!("Failed to open /dev/null: {e}"))?;

    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return Err(anyhow!("Failed to duplicate stderr"));
    }

    if unsafe { libc::dup2(dev_null.as_raw_fd(), libc::STDERR_FILENO) } == -1 {
        unsafe { libc::close(old_stderr) };
        return Err(anyhow!("Failed to redirect stderr"));
    }

    let result = f();

    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

#[cfg(not(target_os = "linux"))]
pub fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let mut info = DeviceInfo {
            index: 0,
            name: "USB Mic".to_string(),
            is_default: true,
            config: Some((48000, 1)),
        };
        assert_eq!(info.summary(), "USB Mic [DEFAULT] (48000Hz, 1 ch)");
        assert_eq!(info.decimation(9600), Some(5));

        info.is_default = false;
        info.config = None;
        assert_eq!(info.summary(), "USB Mic (configuration unavailable)");
        assert_eq!(info.decimation(9600), None);
    }
}
