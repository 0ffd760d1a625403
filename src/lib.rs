//! micrec - microphone capture engine
//!
//! Records microphone audio either as raw PCM wrapped in a WAV container
//! or through a codec-backed recorder, while exposing a thread-safe
//! current/max decibel amplitude reading.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: decibel math, codec/container mapping, the session state
//!   machine, the WAV header layout
//! - **Application**: port interfaces (traits) for the capture hardware,
//!   the two session types, and the `Recorder` facade
//! - **Infrastructure**: adapter implementations (cpal devices, the Opus
//!   codec backend, config store)
//! - **CLI**: command-line interface and the live amplitude meter

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
