//! Regrouping of ordered segments into paragraphs and retrieval chunks.

pub mod paragraphs;
pub mod window;

use thiserror::Error;

use crate::embed::EmbedError;
use crate::transcript::Millis;

pub use paragraphs::{group_paragraphs, ParagraphConfig};
pub use window::{chunk_segments, ChunkingConfig};

#[derive(Error, Debug)]
pub enum ChunkingError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("embedding: {0}")]
    Embed(#[from] EmbedError),
}

/// A sentence-level input unit for paragraph grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct SentenceUnit {
    pub text: String,
    pub start: Millis,
    /// End time of the unit within the recording.
    pub end: Millis,
}

/// A semantically coherent paragraph.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub text: String,
    /// Start time of the first unit folded into the paragraph.
    pub start: Millis,
    /// End time of the last unit folded into the paragraph; this is the
    /// paragraph's representative timestamp.
    pub end: Millis,
}

/// An overlapping window of consecutive segments, ready for indexing.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Deterministic identifier derived from title, time range and text.
    pub id: String,
    pub audio_title: String,
    pub start: Millis,
    pub end: Millis,
    pub timestamp_range: String,
    pub segment_indices: Vec<usize>,
    pub text: String,
}

impl Chunk {
    pub fn segments_in_chunk(&self) -> usize {
        self.segment_indices.len()
    }
}
