//! Raw PCM capture device port

use crate::domain::RecorderError;

/// Requested capture configuration for the raw PCM path.
///
/// The PCM pipeline is 16-bit signed throughout; the WAV path records
/// mono.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmSpec {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Channel count after the adapter's downmix
    pub channels: u16,
}

impl PcmSpec {
    pub const fn mono(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            channels: 1,
        }
    }
}

/// An open microphone handle delivering signed 16-bit samples.
///
/// The device is confined to the capture worker thread: the factory opens
/// it inside the worker, so implementations do not need to be `Send`.
pub trait CaptureDevice {
    /// Pull up to `buf.len()` samples into `buf`, returning how many were
    /// written. `Ok(0)` is a transient empty read and must not be treated
    /// as a failure; `Err` is a hard device failure and aborts capture.
    ///
    /// Implementations should return promptly (at most a few
    /// milliseconds) so a stop request is observed within one cycle.
    fn read(&mut self, buf: &mut [i16]) -> Result<usize, RecorderError>;

    /// Device-reported minimum transfer size in samples; the capture loop
    /// sizes its buffer from this.
    fn transfer_buffer_len(&self) -> usize;

    /// Release the OS handle. Called exactly once, after the loop exits.
    fn close(&mut self);
}

/// Opens capture devices. Shared with the worker thread, which performs
/// the actual open so the (non-`Send`) device never crosses threads.
pub trait CaptureDeviceFactory: Send + Sync {
    fn open(&self, spec: &PcmSpec) -> Result<Box<dyn CaptureDevice>, RecorderError>;
}
