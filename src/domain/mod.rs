//! Domain layer - Core capture logic
//!
//! Decibel math, codec/container mapping, the session state machine, and
//! the WAV header layout. This layer has no dependencies on devices or
//! the filesystem.

pub mod amplitude;
pub mod codec;
pub mod config;
pub mod error;
pub mod state;
pub mod wav;

// Re-export common types
pub use amplitude::{buffer_decibels, peak_decibels, Amplitude, AmplitudeTracker, DB_FLOOR};
pub use codec::{AudioCodec, ContainerKind};
pub use config::RecorderDefaults;
pub use error::{ConfigError, InvalidCodecError, RecorderError};
pub use state::{RecorderState, StateCell};
