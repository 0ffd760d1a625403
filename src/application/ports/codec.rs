//! Codec-backed recorder port
//!
//! Models a platform's encoded capture capability: a recorder that owns
//! its device, encodes with a given codec, and streams the containerized
//! result straight to the output path.

use std::path::Path;

use async_trait::async_trait;

use crate::domain::{AudioCodec, ContainerKind, RecorderError};

/// Full configuration handed to a codec recorder at start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSpec {
    pub codec: AudioCodec,
    /// Container implied by the codec (see [`AudioCodec::container`])
    pub container: ContainerKind,
    /// Encoder bit rate, bits per second
    pub bit_rate: u32,
    /// Sample rate in Hz
    pub sample_rate: u32,
    pub channels: u16,
}

/// A codec-backed recorder with start/stop/pause/resume and a raw
/// peak-amplitude accessor.
#[async_trait]
pub trait CodecRecorder: Send + std::fmt::Debug {
    /// Configure and start encoding to `path`.
    ///
    /// On failure the implementation must release everything it
    /// configured; a failed recorder is never left attached to the
    /// device. Invalid bit rates or unsupported sample rates are
    /// [`RecorderError::Device`].
    async fn start(&mut self, spec: &EncodedSpec, path: &Path) -> Result<(), RecorderError>;

    /// Stop and release. Always safe to call, including before `start`
    /// or after a previous `stop`.
    async fn stop(&mut self) -> Result<(), RecorderError>;

    /// Whether the backend can pause mid-stream. When false, pause and
    /// resume fail with [`RecorderError::Unsupported`] at the session
    /// level and are never delegated.
    fn supports_pause(&self) -> bool;

    fn pause(&mut self) -> Result<(), RecorderError>;

    fn resume(&mut self) -> Result<(), RecorderError>;

    /// Raw peak magnitude (0..=32768) observed since the previous poll;
    /// 0 when not recording.
    fn peak_amplitude(&self) -> i32;
}

/// Creates codec recorders. Fails with [`RecorderError::Device`] when no
/// encoder for the codec exists on this platform.
pub trait CodecRecorderFactory: Send + Sync {
    fn create(&self, codec: AudioCodec) -> Result<Box<dyn CodecRecorder>, RecorderError>;
}
