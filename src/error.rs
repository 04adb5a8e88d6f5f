use thiserror::Error;

use crate::asr::AsrError;
use crate::audio::AudioError;
use crate::chunking::ChunkingError;
use crate::embed::EmbedError;
use crate::index::IndexError;

/// Unified pipeline errors.
///
/// Collaborator failures (ASR, embedding, index) pass through unmodified;
/// retry policy belongs to whoever drives the pipeline, not to the engine.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("configuration: {0}")]
    Config(String),

    #[error("audio: {0}")]
    Audio(#[from] AudioError),

    #[error("chunking: {0}")]
    Chunking(#[from] ChunkingError),

    #[error("ASR: {0}")]
    Asr(#[from] AsrError),

    #[error("embedding: {0}")]
    Embed(#[from] EmbedError),

    #[error("index: {0}")]
    Index(#[from] IndexError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization: {0}")]
    Json(#[from] serde_json::Error),
}
