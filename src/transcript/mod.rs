//! Transcript data model: word tokens, segments and per-recording results.

pub mod document;
pub mod grouper;
pub mod merger;
pub mod time;

pub use document::TranscriptDocument;
pub use grouper::{group_words, GroupingConfig};
pub use merger::merge_parts;
pub use time::{format_range, Millis};

/// One recognized word with its time span.
///
/// `end` is `None` for malformed ASR output; such a token is treated as
/// zero-width (`end == start`) wherever a concrete end time is needed.
#[derive(Debug, Clone, PartialEq)]
pub struct WordToken {
    pub text: String,
    pub start: Millis,
    pub end: Option<Millis>,
}

impl WordToken {
    pub fn new(text: impl Into<String>, start: Millis, end: Option<Millis>) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// End time, falling back to `start` for zero-width tokens.
    pub fn effective_end(&self) -> Millis {
        self.end.unwrap_or(self.start)
    }
}

/// A phrase-level unit of transcript with its own time span.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// 0-based position within one transcript.
    pub id: usize,
    pub start: Millis,
    pub end: Millis,
    pub text: String,
    pub words: Vec<WordToken>,
}

/// A whole transcript: one per audio part, or one per recording after merging.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptResult {
    pub full_text: String,
    pub segments: Vec<Segment>,
    pub source: String,
}

impl TranscriptResult {
    pub fn word_count(&self) -> usize {
        self.segments.iter().map(|s| s.words.len()).sum()
    }

    /// End time of the last segment, or zero for an empty transcript.
    pub fn duration(&self) -> Millis {
        self.segments.last().map(|s| s.end).unwrap_or(Millis::ZERO)
    }
}
