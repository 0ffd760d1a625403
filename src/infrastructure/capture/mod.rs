//! Capture device adapters

mod cpal_device;

pub use cpal_device::{CpalCaptureDevice, CpalDeviceFactory};
