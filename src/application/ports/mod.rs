//! Port interfaces (traits) for the capture hardware boundary
//!
//! These traits define the seams between the recording engine and the
//! platform: a raw PCM capture device for the WAV path, and a
//! codec-backed recorder for the encoded path.

pub mod capture;
pub mod codec;

// Re-export common types
pub use capture::{CaptureDevice, CaptureDeviceFactory, PcmSpec};
pub use codec::{CodecRecorder, CodecRecorderFactory, EncodedSpec};
