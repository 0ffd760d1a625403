//! RIFF/WAVE header layout for 16-bit PCM
//!
//! The container is assembled post-capture: raw samples stream to a
//! sibling file during recording and the header is built once the final
//! data size is known, so no seek-and-patch pass is needed.

/// Size of the canonical PCM WAV header.
pub const HEADER_LEN: usize = 44;

/// Bits per sample; the capture pipeline is 16-bit throughout.
pub const BITS_PER_SAMPLE: u16 = 16;

/// Build the 44-byte header for a PCM WAV file.
///
/// All multi-byte fields are little-endian. `data_size` is the byte length
/// of the sample data chunk; the RIFF chunk size is `36 + data_size`.
pub fn header(sample_rate: u32, channels: u16, data_size: u32) -> [u8; HEADER_LEN] {
    let byte_rate = sample_rate * channels as u32 * (BITS_PER_SAMPLE as u32 / 8);
    let block_align = channels * (BITS_PER_SAMPLE / 8);
    let riff_size = 36 + data_size;

    let mut buf = [0u8; HEADER_LEN];
    buf[0..4].copy_from_slice(b"RIFF");
    buf[4..8].copy_from_slice(&riff_size.to_le_bytes());
    buf[8..12].copy_from_slice(b"WAVE");

    buf[12..16].copy_from_slice(b"fmt ");
    buf[16..20].copy_from_slice(&16u32.to_le_bytes()); // fmt chunk size
    buf[20..22].copy_from_slice(&1u16.to_le_bytes()); // format code: PCM
    buf[22..24].copy_from_slice(&channels.to_le_bytes());
    buf[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    buf[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    buf[32..34].copy_from_slice(&block_align.to_le_bytes());
    buf[34..36].copy_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    buf[36..40].copy_from_slice(b"data");
    buf[40..44].copy_from_slice(&data_size.to_le_bytes());
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_u32(buf: &[u8], at: usize) -> u32 {
        u32::from_le_bytes(buf[at..at + 4].try_into().unwrap())
    }

    fn field_u16(buf: &[u8], at: usize) -> u16 {
        u16::from_le_bytes(buf[at..at + 2].try_into().unwrap())
    }

    #[test]
    fn magic_bytes() {
        let h = header(44100, 1, 0);
        assert_eq!(&h[0..4], b"RIFF");
        assert_eq!(&h[8..12], b"WAVE");
        assert_eq!(&h[12..16], b"fmt ");
        assert_eq!(&h[36..40], b"data");
    }

    #[test]
    fn riff_size_is_36_plus_data() {
        let h = header(44100, 1, 2000);
        assert_eq!(field_u32(&h, 4), 2036);
        assert_eq!(field_u32(&h, 40), 2000);
    }

    #[test]
    fn mono_44100_fields() {
        let h = header(44100, 1, 0);
        assert_eq!(field_u16(&h, 20), 1); // PCM
        assert_eq!(field_u16(&h, 22), 1); // mono
        assert_eq!(field_u32(&h, 24), 44100);
        assert_eq!(field_u32(&h, 28), 88200); // 44100 * 1 * 2
        assert_eq!(field_u16(&h, 32), 2); // block align
        assert_eq!(field_u16(&h, 34), 16);
    }

    #[test]
    fn stereo_byte_rate_doubles() {
        let h = header(16000, 2, 0);
        assert_eq!(field_u32(&h, 28), 64000);
        assert_eq!(field_u16(&h, 32), 4);
    }

    #[test]
    fn zero_data_is_still_a_valid_header() {
        let h = header(8000, 1, 0);
        assert_eq!(h.len(), HEADER_LEN);
        assert_eq!(field_u32(&h, 4), 36);
        assert_eq!(field_u32(&h, 40), 0);
    }
}
