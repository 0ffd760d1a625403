//! Codec recorder adapters
//!
//! The factory maps codec identifiers to whatever encoders this build
//! carries. Codecs without an encoder fail at `create` time with a
//! device error, before anything touches the microphone.

#[cfg(feature = "opus-codec")]
mod opus_backend;

#[cfg(feature = "opus-codec")]
pub use opus_backend::OpusCodecRecorder;

use crate::application::ports::{CodecRecorder, CodecRecorderFactory};
use crate::domain::{AudioCodec, RecorderError};

/// Platform codec factory.
pub struct SystemCodecFactory;

impl CodecRecorderFactory for SystemCodecFactory {
    fn create(&self, codec: AudioCodec) -> Result<Box<dyn CodecRecorder>, RecorderError> {
        match codec {
            AudioCodec::Wav => Err(RecorderError::device(
                "raw PCM capture does not use a codec recorder",
            )),
            #[cfg(feature = "opus-codec")]
            AudioCodec::Opus => Ok(Box::new(OpusCodecRecorder::new())),
            other => Err(RecorderError::device(format!(
                "no system encoder available for {other} on this platform"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aac_and_amr_have_no_encoder_here() {
        for codec in [
            AudioCodec::AacLc,
            AudioCodec::AacEld,
            AudioCodec::HeAac,
            AudioCodec::AmrNb,
            AudioCodec::AmrWb,
        ] {
            let err = SystemCodecFactory.create(codec).unwrap_err();
            assert!(matches!(err, RecorderError::Device(_)));
            assert!(err.to_string().contains(codec.as_str()));
        }
    }

    #[test]
    fn wav_is_rejected_by_the_codec_factory() {
        assert!(SystemCodecFactory.create(AudioCodec::Wav).is_err());
    }

    #[cfg(feature = "opus-codec")]
    #[test]
    fn opus_backend_is_available() {
        assert!(SystemCodecFactory.create(AudioCodec::Opus).is_ok());
    }
}
