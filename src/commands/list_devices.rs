//! List available audio input devices.

use crate::capture::list_input_devices;
use crate::config::LedspecConfig;

/// Prints every input device with its index, native format, and the decimation
/// capture would apply for the configured sample rate.
///
/// # Errors
/// - If the audio host cannot enumerate devices
pub fn handle_list_devices() -> anyhow::Result<()> {
    let devices = list_input_devices()?;

    if devices.is_empty() {
        println!("No audio input devices found on this system.");
        return Ok(());
    }

    let target_rate = LedspecConfig::load()
        .map(|c| c.audio.sample_rate)
        .unwrap_or_else(|_| LedspecConfig::default().audio.sample_rate);

    println!("Available audio input devices:");
    println!();

    for device in &devices {
        println!("  ID: {}", device.index);
        println!("    {}", device.summary());
        if let Some(factor) = device.decimation(target_rate) {
            if factor > 1 {
                println!("    Decimated by {factor} for a {target_rate}Hz analysis rate");
            }
        }
        println!();
    }

    println!("Set [audio] device in ledspec.toml to an ID or a name, or pass --device.");
    Ok(())
}
