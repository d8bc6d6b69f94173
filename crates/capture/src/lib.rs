//! Evidence capture from the phone camera server.
//!
//! Used by the push-capture deployment, where the server pulls a photo and
//! short video/audio clips from the device as soon as a sensor alert arrives.

pub mod config;
pub mod device;

pub use config::DeviceConfig;
pub use device::{CaptureError, DeviceCapture};
