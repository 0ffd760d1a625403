//! Codec-backed capture session
//!
//! Wraps a [`CodecRecorder`] backend: the backend owns the device and
//! streams encoded bytes straight to the output path, so there is no
//! intermediate raw file here. The session keeps the state machine, maps
//! the codec to its container, and turns the backend's raw peak readings
//! into the dB pair.

use std::path::PathBuf;

use tracing::debug;

use crate::application::ports::{CodecRecorder, CodecRecorderFactory, EncodedSpec};
use crate::domain::{Amplitude, AmplitudeTracker, RecorderError};
use crate::domain::{AudioCodec, StateCell};

/// Parameters for an encoded capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedRequest {
    pub codec: AudioCodec,
    pub bit_rate: u32,
    pub sample_rate: u32,
    pub channels: u16,
}

/// A live encoded-capture session.
#[derive(Debug)]
pub struct EncodedSession {
    backend: Box<dyn CodecRecorder>,
    state: StateCell,
    tracker: AmplitudeTracker,
    path: PathBuf,
}

impl EncodedSession {
    /// Create the backend for the codec and start it on `path`.
    ///
    /// On any failure the partially-configured backend is dropped and
    /// therefore released; it is never left attached to the device.
    pub async fn start(
        codecs: &dyn CodecRecorderFactory,
        request: EncodedRequest,
        path: PathBuf,
    ) -> Result<Self, RecorderError> {
        let spec = EncodedSpec {
            codec: request.codec,
            container: request.codec.container(),
            bit_rate: request.bit_rate,
            sample_rate: request.sample_rate,
            channels: request.channels,
        };

        let mut backend = codecs.create(request.codec)?;
        backend.start(&spec, &path).await?;

        let state = StateCell::new();
        state.begin();
        debug!(codec = %request.codec, container = %spec.container, path = %path.display(),
            "encoded capture started");

        Ok(Self {
            backend,
            state,
            tracker: AmplitudeTracker::new(),
            path,
        })
    }

    /// Pause the backend. Fails with `Unsupported` when the backend has
    /// no mid-stream pause capability; otherwise a no-op unless
    /// recording.
    pub fn pause(&mut self) -> Result<(), RecorderError> {
        if !self.backend.supports_pause() {
            return Err(RecorderError::Unsupported(
                "mid-stream pause is not available on this codec backend".into(),
            ));
        }
        if self.state.pause() {
            self.backend.pause()?;
            debug!("encoded capture paused");
        }
        Ok(())
    }

    /// Resume the backend; same capability gate as [`pause`](Self::pause).
    pub fn resume(&mut self) -> Result<(), RecorderError> {
        if !self.backend.supports_pause() {
            return Err(RecorderError::Unsupported(
                "mid-stream resume is not available on this codec backend".into(),
            ));
        }
        if self.state.resume() {
            self.backend.resume()?;
            debug!("encoded capture resumed");
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn is_paused(&self) -> bool {
        self.state.is_paused()
    }

    /// Poll the backend's peak accessor and fold it into the session's
    /// running pair. The backend reports 0 when it is not encoding,
    /// which maps to the dB floor.
    pub fn amplitude(&self) -> Amplitude {
        if self.state.is_active() {
            self.tracker.update_peak(self.backend.peak_amplitude());
        }
        self.tracker.reading()
    }

    /// Stop and release the backend. Safe to call repeatedly; returns
    /// the output path either way.
    pub async fn stop(&mut self) -> Result<PathBuf, RecorderError> {
        if self.state.stop() {
            self.backend.stop().await?;
            debug!(path = %self.path.display(), "encoded capture stopped");
        }
        Ok(self.path.clone())
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use crate::domain::{ContainerKind, DB_FLOOR};

    #[derive(Default)]
    #[derive(Debug)]
    struct MockState {
        started: Mutex<Option<EncodedSpec>>,
        pauses: AtomicUsize,
        resumes: AtomicUsize,
        stops: AtomicUsize,
        peak: AtomicI32,
    }

    #[derive(Debug)]
    struct MockCodecRecorder {
        state: Arc<MockState>,
        supports_pause: bool,
        fail_start: bool,
    }

    #[async_trait]
    impl CodecRecorder for MockCodecRecorder {
        async fn start(&mut self, spec: &EncodedSpec, _path: &Path) -> Result<(), RecorderError> {
            if self.fail_start {
                return Err(RecorderError::device("prepare failed"));
            }
            *self.state.started.lock().unwrap() = Some(spec.clone());
            Ok(())
        }

        async fn stop(&mut self) -> Result<(), RecorderError> {
            self.state.stops.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn supports_pause(&self) -> bool {
            self.supports_pause
        }

        fn pause(&mut self) -> Result<(), RecorderError> {
            self.state.pauses.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn resume(&mut self) -> Result<(), RecorderError> {
            self.state.resumes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn peak_amplitude(&self) -> i32 {
            self.state.peak.swap(0, Ordering::SeqCst)
        }
    }

    struct MockFactory {
        state: Arc<MockState>,
        supports_pause: bool,
        fail_start: bool,
    }

    impl MockFactory {
        fn new() -> Self {
            Self {
                state: Arc::new(MockState::default()),
                supports_pause: true,
                fail_start: false,
            }
        }
    }

    impl CodecRecorderFactory for MockFactory {
        fn create(&self, _codec: AudioCodec) -> Result<Box<dyn CodecRecorder>, RecorderError> {
            Ok(Box::new(MockCodecRecorder {
                state: Arc::clone(&self.state),
                supports_pause: self.supports_pause,
                fail_start: self.fail_start,
            }))
        }
    }

    fn request(codec: AudioCodec) -> EncodedRequest {
        EncodedRequest {
            codec,
            bit_rate: 128_000,
            sample_rate: 44_100,
            channels: 1,
        }
    }

    #[tokio::test]
    async fn backend_receives_container_from_codec() {
        let factory = MockFactory::new();
        let session = EncodedSession::start(&factory, request(AudioCodec::AmrNb), "/tmp/a.amr".into())
            .await
            .unwrap();
        assert!(session.is_active());

        let spec = factory.state.started.lock().unwrap().clone().unwrap();
        assert_eq!(spec.container, ContainerKind::ThreeGpp);
        assert_eq!(spec.bit_rate, 128_000);
    }

    #[tokio::test]
    async fn start_failure_propagates() {
        let mut factory = MockFactory::new();
        factory.fail_start = true;
        let err = EncodedSession::start(&factory, request(AudioCodec::AacLc), "/tmp/a.m4a".into())
            .await
            .unwrap_err();
        assert!(matches!(err, RecorderError::Device(_)));
    }

    #[tokio::test]
    async fn pause_without_capability_is_unsupported() {
        let mut factory = MockFactory::new();
        factory.supports_pause = false;
        let mut session =
            EncodedSession::start(&factory, request(AudioCodec::AacLc), "/tmp/a.m4a".into())
                .await
                .unwrap();

        let err = session.pause().unwrap_err();
        assert!(err.is_unsupported());
        let err = session.resume().unwrap_err();
        assert!(err.is_unsupported());
        // The backend was never asked to pause.
        assert_eq!(factory.state.pauses.load(Ordering::SeqCst), 0);
        assert!(!session.is_paused());
    }

    #[tokio::test]
    async fn pause_delegates_once_and_is_idempotent() {
        let factory = MockFactory::new();
        let mut session =
            EncodedSession::start(&factory, request(AudioCodec::Opus), "/tmp/a.opus".into())
                .await
                .unwrap();

        session.pause().unwrap();
        session.pause().unwrap();
        assert!(session.is_paused());
        assert_eq!(factory.state.pauses.load(Ordering::SeqCst), 1);

        session.resume().unwrap();
        session.resume().unwrap();
        assert!(!session.is_paused());
        assert_eq!(factory.state.resumes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn amplitude_converts_peaks_and_tracks_max() {
        let factory = MockFactory::new();
        let session =
            EncodedSession::start(&factory, request(AudioCodec::Opus), "/tmp/a.opus".into())
                .await
                .unwrap();

        factory.state.peak.store(32_768, Ordering::SeqCst);
        let amp = session.amplitude();
        assert_eq!(amp.current, 0.0);
        assert_eq!(amp.max, 0.0);

        // Backend reports 0 between bursts: current falls to the floor,
        // max stays.
        let amp = session.amplitude();
        assert_eq!(amp.current, DB_FLOOR);
        assert_eq!(amp.max, 0.0);
    }

    #[tokio::test]
    async fn stop_releases_backend_once_and_returns_path() {
        let factory = MockFactory::new();
        let mut session =
            EncodedSession::start(&factory, request(AudioCodec::AacLc), "/tmp/out.m4a".into())
                .await
                .unwrap();

        let first = session.stop().await.unwrap();
        let second = session.stop().await.unwrap();
        assert_eq!(first, PathBuf::from("/tmp/out.m4a"));
        assert_eq!(first, second);
        assert_eq!(factory.state.stops.load(Ordering::SeqCst), 1);
        assert!(!session.is_active());
    }
}
