//! Application layer - The recording engine
//!
//! Port interfaces for the capture hardware, the two session types (raw
//! PCM into a WAV container, codec-backed encoded capture), and the
//! facade that the command surface talks to.

pub mod encoded_session;
pub mod ports;
pub mod recorder;
pub mod wav_session;
pub mod wav_sink;

// Re-export common types
pub use encoded_session::{EncodedRequest, EncodedSession};
pub use recorder::{Recorder, RecordingRequest};
pub use wav_session::WavSession;
pub use wav_sink::WavSink;
