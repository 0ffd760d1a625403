//! cpal-backed capture device
//!
//! cpal delivers audio by callback; the capture loop wants a pull API.
//! The adapter bridges the two with a bounded sample queue: the callback
//! pushes converted mono i16 samples, `read` drains them. When nobody
//! drains (the session is paused and skipping reads) the queue caps out
//! and the oldest samples are dropped, which is exactly the
//! device-buffer behavior the pause semantics rely on.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig, SupportedBufferSize};

use crate::application::ports::{CaptureDevice, CaptureDeviceFactory, PcmSpec};
use crate::domain::RecorderError;

/// How many transfer buffers the queue may hold before dropping the
/// oldest samples.
const QUEUE_DEPTH: usize = 32;

/// Sleep before reporting a transient empty read.
const EMPTY_READ_WAIT: Duration = Duration::from_millis(2);

/// Opens the host's default input device.
pub struct CpalDeviceFactory;

impl CaptureDeviceFactory for CpalDeviceFactory {
    fn open(&self, spec: &PcmSpec) -> Result<Box<dyn CaptureDevice>, RecorderError> {
        Ok(Box::new(CpalCaptureDevice::open(spec)?))
    }
}

struct Shared {
    queue: Mutex<VecDeque<i16>>,
    error: Mutex<Option<String>>,
}

/// An open cpal input stream delivering mono i16 samples.
pub struct CpalCaptureDevice {
    stream: Option<cpal::Stream>,
    shared: Arc<Shared>,
    transfer_len: usize,
}

impl CpalCaptureDevice {
    fn open(spec: &PcmSpec) -> Result<Self, RecorderError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| RecorderError::device("no input device available"))?;

        let (config, sample_format, transfer_len) = select_input_config(&device, spec)?;
        let channels = config.channels;

        let shared = Arc::new(Shared {
            queue: Mutex::new(VecDeque::new()),
            error: Mutex::new(None),
        });
        let queue_cap = transfer_len * QUEUE_DEPTH;

        let data_shared = Arc::clone(&shared);
        let err_shared = Arc::clone(&shared);
        let err_fn = move |e: cpal::StreamError| {
            *err_shared.error.lock().unwrap() = Some(e.to_string());
        };

        let stream = match sample_format {
            SampleFormat::I16 => device
                .build_input_stream(
                    &config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        push_samples(&data_shared, &downmix_to_mono(data, channels), queue_cap);
                    },
                    err_fn,
                    None,
                )
                .map_err(RecorderError::device)?,

            SampleFormat::F32 => device
                .build_input_stream(
                    &config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        let converted: Vec<i16> =
                            data.iter().map(|&s| float_to_i16(s)).collect();
                        push_samples(&data_shared, &downmix_to_mono(&converted, channels), queue_cap);
                    },
                    err_fn,
                    None,
                )
                .map_err(RecorderError::device)?,

            other => {
                return Err(RecorderError::device(format!(
                    "unsupported input sample format {other:?}"
                )))
            }
        };

        stream.play().map_err(RecorderError::device)?;

        Ok(Self {
            stream: Some(stream),
            shared,
            transfer_len,
        })
    }
}

impl CaptureDevice for CpalCaptureDevice {
    fn read(&mut self, buf: &mut [i16]) -> Result<usize, RecorderError> {
        if let Some(message) = self.shared.error.lock().unwrap().take() {
            return Err(RecorderError::Device(message));
        }

        let mut queue = self.shared.queue.lock().unwrap();
        if queue.is_empty() {
            drop(queue);
            thread::sleep(EMPTY_READ_WAIT);
            return Ok(0);
        }

        let n = buf.len().min(queue.len());
        for (slot, sample) in buf.iter_mut().zip(queue.drain(..n)) {
            *slot = sample;
        }
        Ok(n)
    }

    fn transfer_buffer_len(&self) -> usize {
        self.transfer_len
    }

    fn close(&mut self) {
        // Dropping the stream stops capture and releases the OS handle.
        self.stream.take();
    }
}

/// Pick an i16/f32 input config covering the requested sample rate,
/// preferring the fewest channels, and derive the transfer buffer size
/// from the device-reported minimum.
fn select_input_config(
    device: &cpal::Device,
    spec: &PcmSpec,
) -> Result<(StreamConfig, SampleFormat, usize), RecorderError> {
    let supported = device
        .supported_input_configs()
        .map_err(|e| RecorderError::device(format!("failed to query input configs: {e}")))?;

    let mut best: Option<cpal::SupportedStreamConfigRange> = None;
    for range in supported {
        if range.sample_format() != SampleFormat::I16 && range.sample_format() != SampleFormat::F32
        {
            continue;
        }
        if range.min_sample_rate().0 > spec.sample_rate
            || range.max_sample_rate().0 < spec.sample_rate
        {
            continue;
        }
        let better = match &best {
            None => true,
            Some(current) => range.channels() < current.channels(),
        };
        if better {
            best = Some(range);
        }
    }

    let range = best.ok_or_else(|| {
        RecorderError::device(format!(
            "no input config supports {} Hz 16-bit capture",
            spec.sample_rate
        ))
    })?;

    let transfer_len = match range.buffer_size() {
        SupportedBufferSize::Range { min, .. } => (*min as usize).max(256),
        SupportedBufferSize::Unknown => 1024,
    };
    let sample_format = range.sample_format();
    let config = StreamConfig {
        channels: range.channels(),
        sample_rate: SampleRate(spec.sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };

    Ok((config, sample_format, transfer_len))
}

fn push_samples(shared: &Shared, samples: &[i16], cap: usize) {
    let mut queue = shared.queue.lock().unwrap();
    queue.extend(samples.iter().copied());
    // Overflow drops the oldest audio, like a hardware ring buffer.
    let len = queue.len();
    if len > cap {
        queue.drain(..len - cap);
    }
}

/// Average interleaved frames down to one channel.
fn downmix_to_mono(samples: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks_exact(channels as usize)
        .map(|frame| {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            (sum / channels as i32) as i16
        })
        .collect()
}

fn float_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}
