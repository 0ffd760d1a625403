//! Recording facade
//!
//! Single entry point for the command surface: routes a start request to
//! the raw-PCM path or the encoded path based on the codec, owns at most
//! one live session, and unifies the status/amplitude queries of the two
//! paths.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::encoded_session::{EncodedRequest, EncodedSession};
use crate::application::ports::{CaptureDeviceFactory, CodecRecorderFactory, PcmSpec};
use crate::application::wav_session::WavSession;
use crate::domain::config::{DEFAULT_BIT_RATE, DEFAULT_SAMPLE_RATE};
use crate::domain::{Amplitude, AudioCodec, RecorderError};

/// Parameters for [`Recorder::start`]. With no `path` the recording goes
/// to a fresh temp file named after the codec's extension.
#[derive(Debug, Clone)]
pub struct RecordingRequest {
    pub path: Option<PathBuf>,
    pub codec: AudioCodec,
    /// Bits per second; only meaningful for encoded codecs
    pub bit_rate: u32,
    pub sample_rate: u32,
    /// Channel count for the encoded path; the raw-PCM path records mono
    pub channels: u16,
}

impl Default for RecordingRequest {
    fn default() -> Self {
        Self {
            path: None,
            codec: AudioCodec::default(),
            bit_rate: DEFAULT_BIT_RATE,
            sample_rate: DEFAULT_SAMPLE_RATE,
            channels: 1,
        }
    }
}

enum Session {
    Wav(WavSession),
    Encoded(EncodedSession),
}

impl Session {
    async fn stop(&mut self) -> Result<PathBuf, RecorderError> {
        match self {
            Session::Wav(s) => s.stop().await,
            Session::Encoded(s) => s.stop().await,
        }
    }
}

/// The recording engine facade.
///
/// Owns at most one live session; starting a new recording tears the
/// previous one down completely (device closed, worker joined) before
/// the new device opens, so two capture loops never hold the microphone
/// at once.
pub struct Recorder {
    devices: Arc<dyn CaptureDeviceFactory>,
    codecs: Arc<dyn CodecRecorderFactory>,
    session: Option<Session>,
    last_path: Option<PathBuf>,
}

impl Recorder {
    pub fn new(
        devices: Arc<dyn CaptureDeviceFactory>,
        codecs: Arc<dyn CodecRecorderFactory>,
    ) -> Self {
        Self {
            devices,
            codecs,
            session: None,
            last_path: None,
        }
    }

    /// Start a recording, replacing any session already running.
    ///
    /// Resolves once the device is confirmed open. On failure the
    /// recorder is left idle and retrying is the caller's decision.
    pub async fn start(&mut self, request: RecordingRequest) -> Result<(), RecorderError> {
        if let Some(mut previous) = self.session.take() {
            // Full teardown before the new device opens.
            match previous.stop().await {
                Ok(path) => warn!("start replaced a live session, kept {}", path.display()),
                Err(e) => warn!("start discarded a failed session: {e}"),
            }
        }

        let path = match request.path {
            Some(path) => path,
            None => temp_output_path(request.codec)?,
        };
        debug!(codec = %request.codec, path = %path.display(), "starting recording");

        let session = if request.codec.is_raw_pcm() {
            let spec = PcmSpec::mono(request.sample_rate);
            Session::Wav(WavSession::start(Arc::clone(&self.devices), spec, path.clone()).await?)
        } else {
            let encoded = EncodedRequest {
                codec: request.codec,
                bit_rate: request.bit_rate,
                sample_rate: request.sample_rate,
                channels: request.channels,
            };
            Session::Encoded(EncodedSession::start(self.codecs.as_ref(), encoded, path.clone()).await?)
        };

        self.last_path = Some(path);
        self.session = Some(session);
        Ok(())
    }

    /// Stop the live session and return its output path.
    ///
    /// Idempotent: with nothing running this returns the last known
    /// output path (or `None` if nothing was ever recorded).
    pub async fn stop(&mut self) -> Result<Option<PathBuf>, RecorderError> {
        match self.session.take() {
            Some(mut session) => {
                let path = session.stop().await?;
                self.last_path = Some(path.clone());
                Ok(Some(path))
            }
            None => Ok(self.last_path.clone()),
        }
    }

    /// No-op without a live session. The encoded path may report
    /// [`RecorderError::Unsupported`] when its backend cannot pause.
    pub fn pause(&mut self) -> Result<(), RecorderError> {
        match &mut self.session {
            Some(Session::Wav(s)) => {
                s.pause();
                Ok(())
            }
            Some(Session::Encoded(s)) => s.pause(),
            None => Ok(()),
        }
    }

    /// Counterpart of [`pause`](Self::pause), same no-op rules.
    pub fn resume(&mut self) -> Result<(), RecorderError> {
        match &mut self.session {
            Some(Session::Wav(s)) => {
                s.resume();
                Ok(())
            }
            Some(Session::Encoded(s)) => s.resume(),
            None => Ok(()),
        }
    }

    /// True while a session holds the device, including while paused.
    pub fn is_recording(&self) -> bool {
        match &self.session {
            Some(Session::Wav(s)) => s.is_active(),
            Some(Session::Encoded(s)) => s.is_active(),
            None => false,
        }
    }

    pub fn is_paused(&self) -> bool {
        match &self.session {
            Some(Session::Wav(s)) => s.is_paused(),
            Some(Session::Encoded(s)) => s.is_paused(),
            None => false,
        }
    }

    /// Current/max amplitude of the live session; silent when idle.
    pub fn amplitude(&self) -> Amplitude {
        match &self.session {
            Some(Session::Wav(s)) => s.amplitude(),
            Some(Session::Encoded(s)) => s.amplitude(),
            None => Amplitude::silent(),
        }
    }

    /// Stop and release everything. Safe to call any number of times.
    pub async fn dispose(&mut self) {
        if let Err(e) = self.stop().await {
            warn!("dispose: session ended with error: {e}");
        }
    }
}

/// Fresh `audio*.<ext>` file in the system temp directory, used when the
/// caller provides no output path.
fn temp_output_path(codec: AudioCodec) -> Result<PathBuf, RecorderError> {
    let file = tempfile::Builder::new()
        .prefix("audio")
        .suffix(&format!(".{}", codec.extension()))
        .tempfile()?;
    let (_, path) = file
        .keep()
        .map_err(|e| RecorderError::Io(e.error))?;
    Ok(path)
}
