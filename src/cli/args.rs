//! CLI argument definitions

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "micrec",
    version,
    about = "Record from the microphone to WAV or an encoded format",
    long_about = "Records microphone audio to a WAV container (raw PCM) or through a \
codec backend, with a live amplitude meter. Stop with Ctrl-C or --duration."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record from the default input device
    Record(RecordArgs),
    /// List supported codecs with their containers and file extensions
    Codecs,
}

#[derive(Debug, Args)]
pub struct RecordArgs {
    /// Output file; a temp file named after the codec is used when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Codec: aac, aac-eld, he-aac, amr-nb, amr-wb, opus, wav
    #[arg(short, long, env = "MICREC_CODEC")]
    pub codec: Option<String>,

    /// Encoder bit rate in bits per second (encoded codecs only)
    #[arg(long)]
    pub bit_rate: Option<u32>,

    /// Sample rate in Hz
    #[arg(long)]
    pub sample_rate: Option<u32>,

    /// Stop automatically after this many seconds
    #[arg(short, long)]
    pub duration: Option<u64>,

    /// Print the result as JSON instead of plain text
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn record_parses_flags() {
        let cli = Cli::parse_from([
            "micrec", "record", "-o", "out.wav", "--codec", "wav", "--sample-rate", "16000",
            "--duration", "5",
        ]);
        match cli.command {
            Commands::Record(args) => {
                assert_eq!(args.output, Some(PathBuf::from("out.wav")));
                assert_eq!(args.codec.as_deref(), Some("wav"));
                assert_eq!(args.sample_rate, Some(16_000));
                assert_eq!(args.duration, Some(5));
                assert!(!args.json);
            }
            _ => panic!("expected record subcommand"),
        }
    }

    #[test]
    fn codecs_parses() {
        let cli = Cli::parse_from(["micrec", "codecs"]);
        assert!(matches!(cli.command, Commands::Codecs));
    }
}
