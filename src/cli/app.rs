//! CLI runner for the record and codecs commands

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use tokio::time::{interval, Instant};

use crate::application::RecordingRequest;
use crate::domain::AudioCodec;
use crate::infrastructure::create_recorder;

use super::presenter::Presenter;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Cadence of amplitude polls driving the live meter.
const METER_TICK: Duration = Duration::from_millis(100);

/// Fully-resolved options for one recording run.
#[derive(Debug, Clone)]
pub struct RecordOptions {
    pub output: Option<PathBuf>,
    pub codec: AudioCodec,
    pub bit_rate: u32,
    pub sample_rate: u32,
    pub duration_secs: Option<u64>,
    pub json: bool,
}

/// Run one recording until Ctrl-C or the duration elapses.
pub async fn run_record(options: RecordOptions) -> ExitCode {
    let mut presenter = Presenter::new();
    let mut recorder = create_recorder();

    let request = RecordingRequest {
        path: options.output.clone(),
        codec: options.codec,
        bit_rate: options.bit_rate,
        sample_rate: options.sample_rate,
        channels: 1,
    };

    if let Err(e) = recorder.start(request).await {
        presenter.error(&format!("Could not start recording: {e}"));
        return ExitCode::from(EXIT_ERROR);
    }

    presenter.info(&match options.duration_secs {
        Some(secs) => format!("Recording {} for {secs}s (Ctrl-C stops early)", options.codec),
        None => format!("Recording {} until Ctrl-C", options.codec),
    });
    presenter.start_meter("recording");

    let deadline = options
        .duration_secs
        .map(|secs| Instant::now() + Duration::from_secs(secs));
    let mut ticker = interval(METER_TICK);

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    presenter.stop_meter();
                    presenter.error(&format!("Signal handler failed: {e}"));
                    recorder.dispose().await;
                    return ExitCode::from(EXIT_ERROR);
                }
                break;
            }
            tick = ticker.tick() => {
                if let Some(deadline) = deadline {
                    if tick >= deadline {
                        break;
                    }
                }
                let amp = recorder.amplitude();
                presenter.update_meter(amp.current, amp.max);
            }
        }
    }

    presenter.stop_meter();
    let peak = recorder.amplitude().max;

    match recorder.stop().await {
        Ok(Some(path)) => {
            if options.json {
                presenter.output(
                    &serde_json::json!({
                        "path": path,
                        "codec": options.codec.as_str(),
                        "peak_db": peak,
                    })
                    .to_string(),
                );
            } else {
                presenter.success(&format!("Saved {}", path.display()));
                presenter.output(&path.display().to_string());
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        Ok(None) => {
            presenter.error("Recording produced no output");
            ExitCode::from(EXIT_ERROR)
        }
        Err(e) => {
            presenter.error(&format!("Recording failed: {e}"));
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// List the supported codecs.
pub fn run_codecs() -> ExitCode {
    let presenter = Presenter::new();
    for codec in AudioCodec::ALL {
        presenter.key_value(
            codec.as_str(),
            &format!("container {}, .{}", codec.container(), codec.extension()),
        );
    }
    ExitCode::from(EXIT_SUCCESS)
}
