//! Host audio inputs: live capture and WAV playback.

pub mod decimate;
pub mod device;
pub mod microphone;
pub mod wav;

pub use decimate::Decimator;
pub use device::{list_input_devices, DeviceInfo};
pub use microphone::Microphone;
pub use wav::WavSource;
