//! Streaming WAV container assembly
//!
//! During capture, raw little-endian PCM streams to a sibling `.pcm`
//! file. Finalization reads the raw bytes back, prepends the 44-byte
//! header, writes the final file, and removes the raw one. When
//! finalization fails the raw file is left in place for diagnostics
//! instead of being silently lost.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::domain::{wav, RecorderError};

/// Streams PCM samples to disk and assembles the WAV container at stop.
#[derive(Debug)]
pub struct WavSink {
    raw_path: PathBuf,
    final_path: PathBuf,
    writer: BufWriter<File>,
}

impl WavSink {
    /// Open (truncating) the raw sibling file next to the final path.
    pub fn begin(path: &Path) -> Result<Self, RecorderError> {
        let raw_path = raw_sibling(path);
        let file = File::create(&raw_path)?;
        Ok(Self {
            raw_path,
            final_path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    /// Append one captured buffer, low byte first regardless of host
    /// endianness.
    pub fn append(&mut self, samples: &[i16]) -> io::Result<()> {
        for &sample in samples {
            self.writer.write_all(&sample.to_le_bytes())?;
        }
        Ok(())
    }

    /// Assemble the final WAV file and delete the raw one.
    ///
    /// Zero captured samples still produce a valid 44-byte file.
    pub fn finalize(self, sample_rate: u32) -> Result<PathBuf, RecorderError> {
        let Self {
            raw_path,
            final_path,
            mut writer,
        } = self;
        writer.flush()?;
        drop(writer);

        let pcm = fs::read(&raw_path)?;
        let mut wav_bytes = Vec::with_capacity(wav::HEADER_LEN + pcm.len());
        wav_bytes.extend_from_slice(&wav::header(sample_rate, 1, pcm.len() as u32));
        wav_bytes.extend_from_slice(&pcm);
        fs::write(&final_path, wav_bytes)?;

        let _ = fs::remove_file(&raw_path);
        Ok(final_path)
    }

    /// Drop the stream and best-effort remove the raw file. Used when
    /// capture aborts on a device failure and there is nothing worth
    /// finalizing.
    pub fn discard(self) {
        let Self {
            raw_path, writer, ..
        } = self;
        drop(writer);
        let _ = fs::remove_file(&raw_path);
    }

    pub fn final_path(&self) -> &Path {
        &self.final_path
    }
}

/// `<path>.pcm`, the temporary raw-data file.
fn raw_sibling(path: &Path) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(".pcm");
    PathBuf::from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_through_independent_parser() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("take.wav");
        let samples: Vec<i16> = (0..4410).map(|i| (i % 7) as i16 * 1000 - 3000).collect();

        let mut sink = WavSink::begin(&path).unwrap();
        sink.append(&samples[..2000]).unwrap();
        sink.append(&samples[2000..]).unwrap();
        let written = sink.finalize(44_100).unwrap();
        assert_eq!(written, path);

        let mut reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 44_100);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);
        let read: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(read, samples);
    }

    #[test]
    fn header_sizes_match_sample_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sized.wav");
        let n = 1234usize;

        let mut sink = WavSink::begin(&path).unwrap();
        sink.append(&vec![42i16; n]).unwrap();
        sink.finalize(16_000).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(bytes.len(), wav::HEADER_LEN + 2 * n);
        let riff_size = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
        let data_size = u32::from_le_bytes(bytes[40..44].try_into().unwrap());
        assert_eq!(riff_size as usize, 36 + 2 * n);
        assert_eq!(data_size as usize, 2 * n);
    }

    #[test]
    fn zero_samples_still_write_a_valid_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.wav");

        let sink = WavSink::begin(&path).unwrap();
        sink.finalize(8_000).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(bytes.len(), wav::HEADER_LEN);
        assert_eq!(&bytes[0..4], b"RIFF");
        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.len(), 0);
    }

    #[test]
    fn finalize_removes_the_raw_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clean.wav");
        let raw = raw_sibling(&path);

        let mut sink = WavSink::begin(&path).unwrap();
        assert!(raw.exists());
        sink.append(&[1, 2, 3]).unwrap();
        sink.finalize(44_100).unwrap();
        assert!(!raw.exists());
        assert!(path.exists());
    }

    #[test]
    fn failed_finalize_preserves_the_raw_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doomed.wav");
        // Occupy the final path with a directory so the final write fails.
        fs::create_dir(&path).unwrap();

        let mut sink = WavSink::begin(&path).unwrap();
        sink.append(&[7; 100]).unwrap();
        let raw = raw_sibling(&path);

        assert!(sink.finalize(44_100).is_err());
        assert!(raw.exists());
    }

    #[test]
    fn begin_fails_on_unwritable_path() {
        let err = WavSink::begin(Path::new("/nonexistent-dir/take.wav")).unwrap_err();
        assert!(matches!(err, RecorderError::Io(_)));
    }

    #[test]
    fn raw_sibling_appends_suffix() {
        assert_eq!(
            raw_sibling(Path::new("/tmp/a.wav")),
            PathBuf::from("/tmp/a.wav.pcm")
        );
    }
}
