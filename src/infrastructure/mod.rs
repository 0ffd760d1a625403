//! Infrastructure layer - Adapter implementations
//!
//! Concrete implementations of the port interfaces: cpal capture
//! devices, codec recorder backends, and the config store.

pub mod capture;
pub mod codec;
pub mod config;

use std::sync::Arc;

use crate::application::Recorder;

// Re-export adapters
pub use capture::CpalDeviceFactory;
pub use codec::SystemCodecFactory;
pub use config::XdgDefaultsStore;

/// Create a recorder wired to the platform adapters.
pub fn create_recorder() -> Recorder {
    Recorder::new(Arc::new(CpalDeviceFactory), Arc::new(SystemCodecFactory))
}
