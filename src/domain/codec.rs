//! Codec identifiers and container/extension mapping

use std::fmt;
use std::str::FromStr;

use crate::domain::error::InvalidCodecError;

/// Output codec requested for a recording session.
///
/// `Wav` is the reserved raw-capture codec: it selects the PCM path (raw
/// samples in a WAV container) instead of a codec-backed recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AudioCodec {
    /// AAC-LC, the general-purpose default
    #[default]
    AacLc,
    /// AAC enhanced low delay
    AacEld,
    /// High-efficiency AAC
    HeAac,
    /// AMR narrowband (8 kHz telephony)
    AmrNb,
    /// AMR wideband (16 kHz telephony)
    AmrWb,
    /// Opus
    Opus,
    /// Raw PCM wrapped in a WAV container
    Wav,
}

/// Container written by the encoded path (or the WAV wrapper for raw PCM).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// 3GPP, used by the AMR telephony codecs
    ThreeGpp,
    /// MPEG-4, used by the AAC family
    Mpeg4,
    /// Ogg encapsulation, used by Opus (`.opus` files are Ogg streams)
    Ogg,
    /// RIFF/WAVE wrapper around raw PCM
    Wave,
}

impl AudioCodec {
    pub const ALL: [AudioCodec; 7] = [
        AudioCodec::AacLc,
        AudioCodec::AacEld,
        AudioCodec::HeAac,
        AudioCodec::AmrNb,
        AudioCodec::AmrWb,
        AudioCodec::Opus,
        AudioCodec::Wav,
    ];

    /// Whether this codec selects the raw-PCM capture path.
    pub const fn is_raw_pcm(&self) -> bool {
        matches!(self, Self::Wav)
    }

    /// Container implied by the codec. The telephony codecs use 3GPP,
    /// everything else its general-purpose container.
    pub const fn container(&self) -> ContainerKind {
        match self {
            Self::AmrNb | Self::AmrWb => ContainerKind::ThreeGpp,
            Self::Opus => ContainerKind::Ogg,
            Self::Wav => ContainerKind::Wave,
            Self::AacLc | Self::AacEld | Self::HeAac => ContainerKind::Mpeg4,
        }
    }

    /// File extension (without the dot) for output files of this codec.
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::AmrNb | Self::AmrWb => "amr",
            Self::Opus => "opus",
            Self::AacLc | Self::AacEld | Self::HeAac => "m4a",
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AacLc => "aac",
            Self::AacEld => "aac-eld",
            Self::HeAac => "he-aac",
            Self::AmrNb => "amr-nb",
            Self::AmrWb => "amr-wb",
            Self::Opus => "opus",
            Self::Wav => "wav",
        }
    }
}

impl fmt::Display for AudioCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AudioCodec {
    type Err = InvalidCodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aac" | "aac-lc" => Ok(Self::AacLc),
            "aac-eld" => Ok(Self::AacEld),
            "he-aac" => Ok(Self::HeAac),
            "amr-nb" => Ok(Self::AmrNb),
            "amr-wb" => Ok(Self::AmrWb),
            "opus" => Ok(Self::Opus),
            "wav" | "pcm" => Ok(Self::Wav),
            _ => Err(InvalidCodecError {
                input: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ThreeGpp => "3gpp",
            Self::Mpeg4 => "mpeg-4",
            Self::Ogg => "ogg",
            Self::Wave => "wave",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telephony_codecs_use_three_gpp() {
        assert_eq!(AudioCodec::AmrNb.container(), ContainerKind::ThreeGpp);
        assert_eq!(AudioCodec::AmrWb.container(), ContainerKind::ThreeGpp);
    }

    #[test]
    fn aac_family_uses_mpeg4() {
        assert_eq!(AudioCodec::AacLc.container(), ContainerKind::Mpeg4);
        assert_eq!(AudioCodec::AacEld.container(), ContainerKind::Mpeg4);
        assert_eq!(AudioCodec::HeAac.container(), ContainerKind::Mpeg4);
    }

    #[test]
    fn opus_uses_ogg() {
        assert_eq!(AudioCodec::Opus.container(), ContainerKind::Ogg);
    }

    #[test]
    fn only_wav_is_raw_pcm() {
        for codec in AudioCodec::ALL {
            assert_eq!(codec.is_raw_pcm(), codec == AudioCodec::Wav);
        }
    }

    #[test]
    fn extensions() {
        assert_eq!(AudioCodec::Wav.extension(), "wav");
        assert_eq!(AudioCodec::AmrNb.extension(), "amr");
        assert_eq!(AudioCodec::AmrWb.extension(), "amr");
        assert_eq!(AudioCodec::Opus.extension(), "opus");
        assert_eq!(AudioCodec::AacLc.extension(), "m4a");
    }

    #[test]
    fn parse_round_trips_display() {
        for codec in AudioCodec::ALL {
            assert_eq!(codec.as_str().parse::<AudioCodec>().unwrap(), codec);
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("OPUS".parse::<AudioCodec>().unwrap(), AudioCodec::Opus);
        assert_eq!("  Wav ".parse::<AudioCodec>().unwrap(), AudioCodec::Wav);
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "mp3".parse::<AudioCodec>().unwrap_err();
        assert_eq!(err.input, "mp3");
    }

    #[test]
    fn default_is_aac() {
        assert_eq!(AudioCodec::default(), AudioCodec::AacLc);
    }
}
