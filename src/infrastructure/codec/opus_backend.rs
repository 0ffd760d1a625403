//! Software Opus codec recorder
//!
//! Encoded-capture backend for the Opus codec: captures mono PCM from
//! the default input device, encodes 20 ms frames with libopus, and
//! streams the Ogg encapsulation straight to the output file. `.opus`
//! files are Ogg streams, so the container written here is the Ogg kind.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;
use std::thread;

use async_trait::async_trait;
use ogg::writing::{PacketWriteEndInfo, PacketWriter};
use tokio::sync::oneshot;
use tracing::debug;

use crate::application::ports::{
    CaptureDevice, CaptureDeviceFactory, CodecRecorder, EncodedSpec, PcmSpec,
};
use crate::domain::RecorderError;
use crate::infrastructure::capture::CpalDeviceFactory;

/// Sample rates libopus accepts.
const OPUS_SAMPLE_RATES: [u32; 5] = [8_000, 12_000, 16_000, 24_000, 48_000];

/// Bit-rate range libopus accepts, bits per second.
const OPUS_BIT_RATES: std::ops::RangeInclusive<u32> = 500..=512_000;

/// Granule positions count 48 kHz samples; one 20 ms frame is 960.
const GRANULE_PER_FRAME: u64 = 960;

/// Upper bound on one encoded Opus packet.
const MAX_PACKET: usize = 4000;

#[derive(Debug)]
struct SharedFlags {
    stop: AtomicBool,
    paused: AtomicBool,
    /// Raw peak magnitude since the last poll.
    peak: AtomicI32,
}

/// Codec recorder encoding Opus-in-Ogg on a background worker thread.
#[derive(Debug)]
pub struct OpusCodecRecorder {
    shared: Arc<SharedFlags>,
    worker: Option<thread::JoinHandle<Result<(), RecorderError>>>,
}

impl OpusCodecRecorder {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(SharedFlags {
                stop: AtomicBool::new(false),
                paused: AtomicBool::new(false),
                peak: AtomicI32::new(0),
            }),
            worker: None,
        }
    }

    fn validate(spec: &EncodedSpec) -> Result<(), RecorderError> {
        if !OPUS_SAMPLE_RATES.contains(&spec.sample_rate) {
            return Err(RecorderError::device(format!(
                "opus does not support {} Hz (use one of 8000, 12000, 16000, 24000, 48000)",
                spec.sample_rate
            )));
        }
        if !OPUS_BIT_RATES.contains(&spec.bit_rate) {
            return Err(RecorderError::device(format!(
                "opus bit rate {} is out of range {}..={}",
                spec.bit_rate,
                OPUS_BIT_RATES.start(),
                OPUS_BIT_RATES.end()
            )));
        }
        if spec.channels != 1 {
            return Err(RecorderError::device(
                "the opus backend records mono; request 1 channel",
            ));
        }
        Ok(())
    }
}

impl Default for OpusCodecRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CodecRecorder for OpusCodecRecorder {
    async fn start(&mut self, spec: &EncodedSpec, path: &Path) -> Result<(), RecorderError> {
        if self.worker.is_some() {
            return Err(RecorderError::device("codec recorder is already started"));
        }
        Self::validate(spec)?;

        let (ready_tx, ready_rx) = oneshot::channel();
        let shared = Arc::clone(&self.shared);
        shared.stop.store(false, Ordering::SeqCst);
        shared.paused.store(false, Ordering::SeqCst);
        shared.peak.store(0, Ordering::SeqCst);

        let sample_rate = spec.sample_rate;
        let bit_rate = spec.bit_rate;
        let out_path: PathBuf = path.to_path_buf();
        let worker =
            thread::spawn(move || encode_worker(sample_rate, bit_rate, out_path, shared, ready_tx));

        match ready_rx.await {
            Ok(Ok(())) => {
                debug!(rate = sample_rate, bit_rate, "opus capture started");
                self.worker = Some(worker);
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = worker.join();
                Err(e)
            }
            Err(_) => {
                let _ = worker.join();
                Err(RecorderError::device(
                    "opus worker exited before opening the device",
                ))
            }
        }
    }

    async fn stop(&mut self) -> Result<(), RecorderError> {
        self.shared.stop.store(true, Ordering::SeqCst);
        match self.worker.take() {
            Some(worker) => tokio::task::spawn_blocking(move || worker.join())
                .await
                .map_err(|e| RecorderError::device(format!("stop task failed: {e}")))?
                .map_err(|_| RecorderError::device("opus worker panicked"))?,
            None => Ok(()),
        }
    }

    fn supports_pause(&self) -> bool {
        true
    }

    fn pause(&mut self) -> Result<(), RecorderError> {
        self.shared.paused.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn resume(&mut self) -> Result<(), RecorderError> {
        self.shared.paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn peak_amplitude(&self) -> i32 {
        self.shared.peak.swap(0, Ordering::SeqCst)
    }
}

impl Drop for OpusCodecRecorder {
    fn drop(&mut self) {
        self.shared.stop.store(true, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Worker body: open device and output file, confirm readiness, then
/// encode 20 ms frames until stopped. Frames arriving while paused are
/// discarded rather than encoded.
fn encode_worker(
    sample_rate: u32,
    bit_rate: u32,
    path: PathBuf,
    shared: Arc<SharedFlags>,
    ready_tx: oneshot::Sender<Result<(), RecorderError>>,
) -> Result<(), RecorderError> {
    let mut device = match CpalDeviceFactory.open(&PcmSpec::mono(sample_rate)) {
        Ok(device) => device,
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return Err(RecorderError::device("device open failed"));
        }
    };

    let file = match File::create(&path) {
        Ok(file) => file,
        Err(e) => {
            device.close();
            let _ = ready_tx.send(Err(e.into()));
            return Err(RecorderError::device("output open failed"));
        }
    };

    let mut encoder =
        match opus::Encoder::new(sample_rate, opus::Channels::Mono, opus::Application::Audio) {
            Ok(encoder) => encoder,
            Err(e) => {
                device.close();
                let _ = ready_tx.send(Err(RecorderError::device(e)));
                return Err(RecorderError::device("encoder init failed"));
            }
        };
    if let Err(e) = encoder.set_bitrate(opus::Bitrate::Bits(bit_rate as i32)) {
        device.close();
        let _ = ready_tx.send(Err(RecorderError::device(e)));
        return Err(RecorderError::device("encoder bitrate rejected"));
    }

    let _ = ready_tx.send(Ok(()));

    let outcome = encode_loop(device.as_mut(), &mut encoder, sample_rate, file, &shared);
    device.close();
    outcome
}

fn encode_loop(
    device: &mut dyn CaptureDevice,
    encoder: &mut opus::Encoder,
    sample_rate: u32,
    file: File,
    shared: &SharedFlags,
) -> Result<(), RecorderError> {
    let frame_len = (sample_rate / 50) as usize; // 20 ms
    let serial = stream_serial();
    let mut writer = PacketWriter::new(BufWriter::new(file));
    write_opus_headers(&mut writer, serial, sample_rate)?;

    let mut granule: u64 = 0;
    let mut pending: Vec<i16> = Vec::with_capacity(frame_len * 2);
    let mut transfer = vec![0i16; device.transfer_buffer_len().max(frame_len)];
    let mut packet = vec![0u8; MAX_PACKET];

    while !shared.stop.load(Ordering::SeqCst) {
        let read = device.read(&mut transfer)?;
        if read == 0 {
            continue;
        }
        if shared.paused.load(Ordering::SeqCst) {
            // Audio during pause is discarded, not buffered for later.
            pending.clear();
            continue;
        }

        for &sample in &transfer[..read] {
            shared
                .peak
                .fetch_max((sample as i32).abs(), Ordering::SeqCst);
        }
        pending.extend_from_slice(&transfer[..read]);

        while pending.len() >= frame_len {
            let frame: Vec<i16> = pending.drain(..frame_len).collect();
            let len = encoder
                .encode(&frame, &mut packet)
                .map_err(RecorderError::device)?;
            granule += GRANULE_PER_FRAME;
            writer
                .write_packet(
                    packet[..len].to_vec(),
                    serial,
                    PacketWriteEndInfo::NormalPacket,
                    granule,
                )
                .map_err(ogg_write_error)?;
        }
    }

    // Close the stream with one final (zero-padded) frame.
    pending.resize(frame_len, 0);
    let len = encoder
        .encode(&pending, &mut packet)
        .map_err(RecorderError::device)?;
    granule += GRANULE_PER_FRAME;
    writer
        .write_packet(
            packet[..len].to_vec(),
            serial,
            PacketWriteEndInfo::EndStream,
            granule,
        )
        .map_err(ogg_write_error)?;

    writer.into_inner().flush()?;
    Ok(())
}

/// Opus identification and comment headers, one Ogg page each.
fn write_opus_headers<W: Write>(
    writer: &mut PacketWriter<W>,
    serial: u32,
    sample_rate: u32,
) -> Result<(), RecorderError> {
    let mut id = Vec::with_capacity(19);
    id.extend_from_slice(b"OpusHead");
    id.push(1); // version
    id.push(1); // channel count
    id.extend_from_slice(&0u16.to_le_bytes()); // pre-skip
    id.extend_from_slice(&sample_rate.to_le_bytes()); // input sample rate
    id.extend_from_slice(&0i16.to_le_bytes()); // output gain
    id.push(0); // channel mapping family
    writer
        .write_packet(id, serial, PacketWriteEndInfo::EndPage, 0)
        .map_err(ogg_write_error)?;

    let vendor = b"micrec";
    let mut tags = Vec::new();
    tags.extend_from_slice(b"OpusTags");
    tags.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    tags.extend_from_slice(vendor);
    tags.extend_from_slice(&0u32.to_le_bytes()); // no user comments
    writer
        .write_packet(tags, serial, PacketWriteEndInfo::EndPage, 0)
        .map_err(ogg_write_error)?;

    Ok(())
}

/// Ogg page writes fail with ordinary I/O errors; keep them in the
/// `Io` bucket whatever the wrapper type.
fn ogg_write_error(e: impl std::fmt::Display) -> RecorderError {
    RecorderError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
}

/// Pseudo-random serial for the Ogg stream, mixed from the clock.
fn stream_serial() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    (now.as_secs() as u32) ^ now.subsec_nanos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AudioCodec, ContainerKind};

    fn spec(sample_rate: u32, bit_rate: u32, channels: u16) -> EncodedSpec {
        EncodedSpec {
            codec: AudioCodec::Opus,
            container: ContainerKind::Ogg,
            bit_rate,
            sample_rate,
            channels,
        }
    }

    #[test]
    fn accepts_opus_rates() {
        for rate in OPUS_SAMPLE_RATES {
            assert!(OpusCodecRecorder::validate(&spec(rate, 24_000, 1)).is_ok());
        }
    }

    #[test]
    fn rejects_cd_sample_rate() {
        let err = OpusCodecRecorder::validate(&spec(44_100, 24_000, 1)).unwrap_err();
        assert!(matches!(err, RecorderError::Device(_)));
        assert!(err.to_string().contains("44100"));
    }

    #[test]
    fn rejects_out_of_range_bit_rate() {
        assert!(OpusCodecRecorder::validate(&spec(48_000, 0, 1)).is_err());
        assert!(OpusCodecRecorder::validate(&spec(48_000, 600_000, 1)).is_err());
    }

    #[test]
    fn rejects_stereo() {
        assert!(OpusCodecRecorder::validate(&spec(48_000, 24_000, 2)).is_err());
    }

    #[test]
    fn fresh_recorder_reports_no_peak() {
        let recorder = OpusCodecRecorder::new();
        assert_eq!(recorder.peak_amplitude(), 0);
        assert!(recorder.supports_pause());
    }
}
