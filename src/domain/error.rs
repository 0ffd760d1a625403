//! Engine error taxonomy

use thiserror::Error;

/// Errors surfaced by recording operations.
///
/// Transient conditions (zero-length device reads) are handled internally
/// and never reach the caller. A failed `start` leaves the recorder idle;
/// there are no automatic retries.
#[derive(Debug, Error)]
pub enum RecorderError {
    /// Microphone unavailable, unsupported configuration, or a codec
    /// backend failed to prepare/start.
    #[error("capture device error: {0}")]
    Device(String),

    /// Output path not writable, or the raw capture file could not be
    /// read back during finalization.
    #[error("recording I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The operation is not available on this backend (e.g. mid-stream
    /// pause on a recorder without pause capability). Non-fatal.
    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

impl RecorderError {
    /// Shorthand for a `Device` error from any displayable cause.
    pub fn device(cause: impl std::fmt::Display) -> Self {
        Self::Device(cause.to_string())
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }
}

/// Error when loading the optional defaults file.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),
}

/// Error when an unknown codec name is given.
#[derive(Debug, Clone, Error)]
#[error("Invalid codec: \"{input}\". Valid codecs are: aac, aac-eld, he-aac, amr-nb, amr-wb, opus, wav")]
pub struct InvalidCodecError {
    pub input: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_error_display() {
        let err = RecorderError::device("microphone busy");
        assert!(err.to_string().contains("microphone busy"));
        assert!(!err.is_unsupported());
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: RecorderError = io.into();
        assert!(matches!(err, RecorderError::Io(_)));
    }

    #[test]
    fn unsupported_is_flagged() {
        let err = RecorderError::Unsupported("pause".into());
        assert!(err.is_unsupported());
    }

    #[test]
    fn invalid_codec_lists_valid_names() {
        let err = InvalidCodecError { input: "mp3".into() };
        let msg = err.to_string();
        assert!(msg.contains("mp3"));
        assert!(msg.contains("opus"));
    }
}
