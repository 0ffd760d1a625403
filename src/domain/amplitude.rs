//! Decibel amplitude math and the shared amplitude cell
//!
//! Amplitude is reported as a `{current, max}` pair of dBFS values. Silence
//! (and an idle recorder) reads as the floor sentinel rather than a
//! logarithm of zero.

use std::sync::Mutex;

/// Sentinel reported for silence or an idle recorder, in dB.
pub const DB_FLOOR: f64 = -160.0;

/// Full-scale reference for 16-bit samples.
const FULL_SCALE: f64 = 32768.0;

/// Peak level of one sample buffer, in dB relative to full scale.
///
/// Empty and all-zero buffers report [`DB_FLOOR`]; anything else is
/// `20·log10(max|s| / 32768)`, which is never above zero.
pub fn buffer_decibels(samples: &[i16]) -> f64 {
    let max_abs = samples
        .iter()
        .map(|&s| (s as i32).unsigned_abs())
        .max()
        .unwrap_or(0);
    peak_decibels(max_abs as i32)
}

/// Convert a raw peak magnitude (0..=32768) to dB relative to full scale.
///
/// Zero (the value codec recorders report when idle) maps to [`DB_FLOOR`].
pub fn peak_decibels(peak: i32) -> f64 {
    if peak > 0 {
        20.0 * (peak as f64 / FULL_SCALE).log10()
    } else {
        DB_FLOOR
    }
}

/// A current/max decibel reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Amplitude {
    pub current: f64,
    pub max: f64,
}

impl Amplitude {
    /// The reading of an idle or silent recorder.
    pub const fn silent() -> Self {
        Self {
            current: DB_FLOOR,
            max: DB_FLOOR,
        }
    }
}

impl Default for Amplitude {
    fn default() -> Self {
        Self::silent()
    }
}

/// Shared amplitude cell: the capture worker publishes at buffer cadence,
/// the query path reads at any time.
///
/// The pair is guarded by one mutex so a reader can never observe a
/// `current` from one update paired with a `max` from another.
#[derive(Debug)]
pub struct AmplitudeTracker {
    inner: Mutex<Amplitude>,
}

impl AmplitudeTracker {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Amplitude::silent()),
        }
    }

    /// Fold one captured buffer into the reading.
    ///
    /// `max` only ever rises within a tracker's lifetime.
    pub fn update(&self, samples: &[i16]) {
        let current = buffer_decibels(samples);
        let mut amp = self.inner.lock().unwrap();
        amp.current = current;
        if current > amp.max {
            amp.max = current;
        }
    }

    /// Publish a raw peak polled from a codec recorder.
    pub fn update_peak(&self, peak: i32) {
        let current = peak_decibels(peak);
        let mut amp = self.inner.lock().unwrap();
        amp.current = current;
        if current > amp.max {
            amp.max = current;
        }
    }

    /// The last published pair. A fresh tracker reads silent.
    pub fn reading(&self) -> Amplitude {
        *self.inner.lock().unwrap()
    }
}

impl Default for AmplitudeTracker {
    fn default() -> Self {
        Self::new()
    }
}
