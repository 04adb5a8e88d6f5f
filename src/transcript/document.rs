//! On-disk transcript artifact.
//!
//! This is the JSON shape downstream tooling reads; field names and nesting
//! are part of the contract and must not change.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

use super::{Millis, Segment, TranscriptResult, WordToken};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptDocument {
    pub audio_file: String,
    /// Track duration in seconds.
    pub duration: f64,
    pub segments: Vec<SegmentRecord>,
    pub words_total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub id: usize,
    /// Seconds.
    pub start: f64,
    /// Seconds.
    pub end: f64,
    pub start_timestamp: String,
    pub end_timestamp: String,
    pub text: String,
    pub words: Vec<WordRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordRecord {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

impl TranscriptDocument {
    pub fn from_result(result: &TranscriptResult) -> Self {
        let segments: Vec<SegmentRecord> = result.segments.iter().map(SegmentRecord::from).collect();
        Self {
            audio_file: result.source.clone(),
            duration: result.duration().as_secs_f64(),
            words_total: result.word_count(),
            segments,
        }
    }

    /// Rebuild the in-memory transcript from a saved document.
    pub fn into_result(self) -> TranscriptResult {
        let full_text = self
            .segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        let segments = self
            .segments
            .into_iter()
            .map(|record| Segment {
                id: record.id,
                start: Millis::from_secs_f64(record.start),
                end: Millis::from_secs_f64(record.end),
                text: record.text,
                words: record
                    .words
                    .into_iter()
                    .map(|w| {
                        WordToken::new(
                            w.word,
                            Millis::from_secs_f64(w.start),
                            Some(Millis::from_secs_f64(w.end)),
                        )
                    })
                    .collect(),
            })
            .collect();

        TranscriptResult {
            full_text,
            segments,
            source: self.audio_file,
        }
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

impl From<&Segment> for SegmentRecord {
    fn from(segment: &Segment) -> Self {
        Self {
            id: segment.id,
            start: segment.start.as_secs_f64(),
            end: segment.end.as_secs_f64(),
            start_timestamp: segment.start.format_timestamp(),
            end_timestamp: segment.end.format_timestamp(),
            text: segment.text.clone(),
            words: segment
                .words
                .iter()
                .map(|w| WordRecord {
                    word: w.text.clone(),
                    start: w.start.as_secs_f64(),
                    end: w.effective_end().as_secs_f64(),
                })
                .collect(),
        }
    }
}
