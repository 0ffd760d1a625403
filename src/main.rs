//! micrec CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use micrec::cli::{run_codecs, run_record, Cli, Commands, Presenter, RecordOptions};
use micrec::domain::AudioCodec;
use micrec::infrastructure::XdgDefaultsStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let presenter = Presenter::new();

    match cli.command {
        Commands::Codecs => run_codecs(),
        Commands::Record(args) => {
            // File defaults fill whatever the flags leave unset.
            let defaults = match XdgDefaultsStore::new().load() {
                Ok(defaults) => defaults,
                Err(e) => {
                    presenter.warn(&format!("Ignoring config file: {e}"));
                    Default::default()
                }
            };

            let codec = match args.codec {
                Some(name) => match name.parse::<AudioCodec>() {
                    Ok(codec) => codec,
                    Err(e) => {
                        presenter.error(&e.to_string());
                        return ExitCode::from(micrec::cli::app::EXIT_USAGE_ERROR);
                    }
                },
                None => defaults.codec_or_default(),
            };

            let options = RecordOptions {
                output: args.output,
                codec,
                bit_rate: args.bit_rate.unwrap_or_else(|| defaults.bit_rate_or_default()),
                sample_rate: args
                    .sample_rate
                    .unwrap_or_else(|| defaults.sample_rate_or_default()),
                duration_secs: args.duration,
                json: args.json,
            };

            run_record(options).await
        }
    }
}
