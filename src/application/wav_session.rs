//! Raw PCM capture session
//!
//! One background worker thread owns the capture device and runs the
//! blocking read loop; commands only touch the shared state cell and the
//! amplitude tracker. The device is opened inside the worker (device
//! handles are not `Send`) and `start` resolves once the open is
//! confirmed through a oneshot, so a successful start always means a
//! live device.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::application::ports::{CaptureDevice, CaptureDeviceFactory, PcmSpec};
use crate::application::wav_sink::WavSink;
use crate::domain::{Amplitude, AmplitudeTracker, RecorderError, RecorderState, StateCell};

/// Sleep while paused before re-checking the state cell.
const PAUSE_POLL: Duration = Duration::from_millis(10);

/// A live raw-capture session writing to a WAV file.
#[derive(Debug)]
pub struct WavSession {
    state: Arc<StateCell>,
    tracker: Arc<AmplitudeTracker>,
    worker: Option<thread::JoinHandle<Result<PathBuf, RecorderError>>>,
    path: PathBuf,
}

impl WavSession {
    /// Open the device and begin capturing to `path`.
    ///
    /// Resolves `Ok` only after the worker confirmed the device is open
    /// and the raw stream is writable; any earlier failure surfaces here
    /// and leaves nothing running.
    pub async fn start(
        devices: Arc<dyn CaptureDeviceFactory>,
        spec: PcmSpec,
        path: PathBuf,
    ) -> Result<Self, RecorderError> {
        let state = Arc::new(StateCell::new());
        let tracker = Arc::new(AmplitudeTracker::new());
        let (ready_tx, ready_rx) = oneshot::channel();

        let worker = {
            let state = Arc::clone(&state);
            let tracker = Arc::clone(&tracker);
            let path = path.clone();
            thread::spawn(move || capture_worker(devices, spec, path, state, tracker, ready_tx))
        };

        match ready_rx.await {
            Ok(Ok(())) => {
                debug!(path = %path.display(), rate = spec.sample_rate, "wav capture started");
                Ok(Self {
                    state,
                    tracker,
                    worker: Some(worker),
                    path,
                })
            }
            Ok(Err(e)) => {
                join_worker(worker).await;
                Err(e)
            }
            Err(_) => {
                join_worker(worker).await;
                Err(RecorderError::device(
                    "capture worker exited before opening the device",
                ))
            }
        }
    }

    /// Stop persisting buffers. The device stays open; reads are skipped
    /// until `resume`. No-op unless currently recording.
    pub fn pause(&self) {
        if self.state.pause() {
            debug!("wav capture paused");
        }
    }

    /// No-op unless currently paused.
    pub fn resume(&self) {
        if self.state.resume() {
            debug!("wav capture resumed");
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn is_paused(&self) -> bool {
        self.state.is_paused()
    }

    /// Last published reading; while paused this stays at the value from
    /// the final buffer before the pause.
    pub fn amplitude(&self) -> Amplitude {
        self.tracker.reading()
    }

    /// Signal the loop, join the worker, finalize the container.
    ///
    /// Idempotent: a second stop returns the same path without touching
    /// anything.
    pub async fn stop(&mut self) -> Result<PathBuf, RecorderError> {
        self.state.stop();
        match self.worker.take() {
            Some(worker) => tokio::task::spawn_blocking(move || worker.join())
                .await
                .map_err(|e| RecorderError::device(format!("stop task failed: {e}")))?
                .map_err(|_| RecorderError::device("capture worker panicked"))?,
            None => Ok(self.path.clone()),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl Drop for WavSession {
    fn drop(&mut self) {
        // A dropped session must not leave a live worker holding the
        // microphone; the loop observes the stop within one read cycle.
        self.state.stop();
        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.join().unwrap_or_else(|_| {
                Err(RecorderError::device("capture worker panicked"))
            }) {
                warn!("capture worker ended with error on drop: {e}");
            }
        }
    }
}

/// Worker body: open device, open raw stream, confirm readiness, loop,
/// then tear down and finalize (or discard on device failure).
fn capture_worker(
    devices: Arc<dyn CaptureDeviceFactory>,
    spec: PcmSpec,
    path: PathBuf,
    state: Arc<StateCell>,
    tracker: Arc<AmplitudeTracker>,
    ready_tx: oneshot::Sender<Result<(), RecorderError>>,
) -> Result<PathBuf, RecorderError> {
    let mut device = match devices.open(&spec) {
        Ok(device) => device,
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return Err(RecorderError::device("device open failed"));
        }
    };

    let mut sink = match WavSink::begin(&path) {
        Ok(sink) => sink,
        Err(e) => {
            device.close();
            let _ = ready_tx.send(Err(e));
            return Err(RecorderError::device("raw stream open failed"));
        }
    };

    state.begin();
    let _ = ready_tx.send(Ok(()));

    let mut buf = vec![0i16; device.transfer_buffer_len().max(1)];
    let outcome = read_loop(device.as_mut(), &mut buf, &state, &tracker, &mut sink);
    state.stop();
    device.close();

    match outcome {
        Ok(()) => sink.finalize(spec.sample_rate),
        Err(e) => {
            if matches!(e, RecorderError::Device(_)) {
                // Nothing worth keeping after a hard device failure.
                sink.discard();
            }
            warn!("wav capture aborted: {e}");
            Err(e)
        }
    }
}

/// Pull buffers until stopped. Paused: skip the read entirely so the
/// loop never blocks on device buffers that nobody is draining.
fn read_loop(
    device: &mut dyn CaptureDevice,
    buf: &mut [i16],
    state: &StateCell,
    tracker: &AmplitudeTracker,
    sink: &mut WavSink,
) -> Result<(), RecorderError> {
    loop {
        match state.get() {
            RecorderState::Recording => {}
            RecorderState::Paused => {
                thread::sleep(PAUSE_POLL);
                continue;
            }
            _ => return Ok(()),
        }

        let read = device.read(buf)?;
        if read == 0 {
            // Transient empty read; the device will have data shortly.
            continue;
        }
        tracker.update(&buf[..read]);
        sink.append(&buf[..read])?;
    }
}

async fn join_worker(worker: thread::JoinHandle<Result<PathBuf, RecorderError>>) {
    let _ = tokio::task::spawn_blocking(move || worker.join()).await;
}
