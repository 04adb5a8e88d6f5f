//! Materializes audio parts as temporary WAV files.

use std::fs;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};

use super::AudioError;

/// A part written to disk. The file is deleted when this handle drops, so a
/// part lives exactly as long as its ASR call, on success and failure alike.
#[derive(Debug)]
pub struct PartAudio {
    path: PathBuf,
}

impl PartAudio {
    /// Write `samples` (16 kHz mono f32) as a 16-bit PCM WAV.
    pub fn write(path: PathBuf, samples: &[f32], sample_rate: u32) -> Result<Self, AudioError> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let mut writer = WavWriter::create(&path, spec)?;
        for &sample in samples {
            let clamped = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer.write_sample(clamped)?;
        }
        writer.finalize()?;

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PartAudio {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("failed to remove part file {}: {e}", self.path.display());
            }
        }
    }
}
