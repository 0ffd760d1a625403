//! Recording session state machine
//!
//! State machine:
//!   IDLE -> RECORDING (begin)
//!   RECORDING <-> PAUSED (pause / resume)
//!   RECORDING | PAUSED -> STOPPED (stop)
//!
//! Transitions that don't apply to the current state are no-ops, not
//! errors: the caller may race with device teardown, so `pause` while
//! already paused or `stop` after stop must stay quiet.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle states of a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecorderState {
    #[default]
    Idle,
    Recording,
    Paused,
    Stopped,
}

impl RecorderState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        }
    }

    const fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Recording,
            2 => Self::Paused,
            3 => Self::Stopped,
            _ => Self::Idle,
        }
    }
}

impl fmt::Display for RecorderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lock-free state cell shared between the command path and the capture
/// worker. The worker polls it before every device read, so a `stop` is
/// observed within one buffer cycle.
#[derive(Debug, Default)]
pub struct StateCell(AtomicU8);

impl StateCell {
    pub fn new() -> Self {
        Self(AtomicU8::new(RecorderState::Idle as u8))
    }

    pub fn get(&self) -> RecorderState {
        RecorderState::from_u8(self.0.load(Ordering::SeqCst))
    }

    /// Recording or paused: the session holds the device.
    pub fn is_active(&self) -> bool {
        matches!(self.get(), RecorderState::Recording | RecorderState::Paused)
    }

    pub fn is_paused(&self) -> bool {
        self.get() == RecorderState::Paused
    }

    /// IDLE -> RECORDING. Returns false if the session already left idle.
    pub fn begin(&self) -> bool {
        self.transition(RecorderState::Idle, RecorderState::Recording)
    }

    /// RECORDING -> PAUSED. No-op (false) in any other state.
    pub fn pause(&self) -> bool {
        self.transition(RecorderState::Recording, RecorderState::Paused)
    }

    /// PAUSED -> RECORDING. No-op (false) in any other state.
    pub fn resume(&self) -> bool {
        self.transition(RecorderState::Paused, RecorderState::Recording)
    }

    /// Any state -> STOPPED. Returns true the first time only.
    pub fn stop(&self) -> bool {
        self.0.swap(RecorderState::Stopped as u8, Ordering::SeqCst)
            != RecorderState::Stopped as u8
    }

    fn transition(&self, from: RecorderState, to: RecorderState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}
