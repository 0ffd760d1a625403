//! Recording defaults, optionally overridden by a config file

use serde::{Deserialize, Serialize};

use crate::domain::codec::AudioCodec;

/// Built-in default bit rate for encoded capture, bits per second.
pub const DEFAULT_BIT_RATE: u32 = 128_000;

/// Built-in default sample rate, Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Defaults applied when the caller omits a recording parameter.
///
/// Loaded from the user's config file when present; every field is
/// optional there, and unset fields fall back to the built-ins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecorderDefaults {
    /// Codec name, e.g. "wav" or "opus"
    pub codec: Option<String>,
    /// Bit rate for encoded capture, bits per second
    pub bit_rate: Option<u32>,
    /// Sample rate, Hz
    pub sample_rate: Option<u32>,
}

impl RecorderDefaults {
    pub fn codec_or_default(&self) -> AudioCodec {
        self.codec
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    pub fn bit_rate_or_default(&self) -> u32 {
        self.bit_rate.unwrap_or(DEFAULT_BIT_RATE)
    }

    pub fn sample_rate_or_default(&self) -> u32 {
        self.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE)
    }
}
