//! Audio loading, silence detection and part splitting.

pub mod decode;
pub mod parts;
pub mod silence;
pub mod splitter;

use thiserror::Error;

pub use decode::{load_audio, PcmTrack, TARGET_SAMPLE_RATE};
pub use parts::PartAudio;
pub use silence::{detect_silence, SilenceSpan};
pub use splitter::{plan_for_track, plan_parts, write_part, AudioPart, SilenceRef, SplitConfig};

#[derive(Error, Debug)]
pub enum AudioError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("decode failed: {0}")]
    Decode(String),

    #[error("WAV write failed: {0}")]
    Wav(#[from] hound::Error),

    #[error("empty audio track: {0}")]
    EmptyTrack(String),
}
