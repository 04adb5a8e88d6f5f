//! Sliding overlapping windows over ordered segments.

use serde::{Deserialize, Serialize};

use super::{Chunk, ChunkingError};
use crate::index::stable_id;
use crate::transcript::{format_range, Segment};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Segments per chunk.
    pub chunk_size: usize,
    /// Fraction of the window shared with the next chunk, in `[0, 1)`.
    pub overlap: f32,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 3,
            overlap: 0.5,
        }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<(), ChunkingError> {
        if self.chunk_size == 0 {
            return Err(ChunkingError::InvalidConfig(
                "chunk_size must be positive".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.overlap) {
            return Err(ChunkingError::InvalidConfig(format!(
                "overlap must be in [0, 1), got {}",
                self.overlap
            )));
        }
        Ok(())
    }

    /// Window advance per chunk; never zero so iteration always terminates.
    pub fn step(&self) -> usize {
        ((self.chunk_size as f32 * (1.0 - self.overlap)).ceil() as usize).max(1)
    }
}

/// Slide an overlapping window over `segments` and produce one chunk per
/// window.
///
/// Segments are stably sorted by start time first; merged multi-part
/// transcripts can interleave at part boundaries. Chunk text is the
/// newline-joined segment texts, the time span covers first to last segment,
/// and `segment_indices` carries the segment ids in window order. The chunk
/// id is the stable content hash used for idempotent upsert.
pub fn chunk_segments(
    segments: &[Segment],
    audio_title: &str,
    config: &ChunkingConfig,
) -> Result<Vec<Chunk>, ChunkingError> {
    config.validate()?;

    if segments.is_empty() {
        return Ok(Vec::new());
    }

    let mut ordered: Vec<&Segment> = segments.iter().collect();
    ordered.sort_by_key(|s| s.start);

    let step = config.step();
    let mut chunks = Vec::new();
    let mut window_start = 0usize;

    while window_start < ordered.len() {
        let window = &ordered[window_start..(window_start + config.chunk_size).min(ordered.len())];

        let text = window
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let start = window[0].start;
        let end = window[window.len() - 1].end;

        chunks.push(Chunk {
            id: stable_id(audio_title, start, end, &text),
            audio_title: audio_title.to_string(),
            start,
            end,
            timestamp_range: format_range(start, end),
            segment_indices: window.iter().map(|s| s.id).collect(),
            text,
        });

        window_start += step;
    }

    log::debug!(
        "chunked {} segment(s) into {} chunk(s) (size {}, step {})",
        segments.len(),
        chunks.len(),
        config.chunk_size,
        step
    );

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_formula() {
        let c = ChunkingConfig {
            chunk_size: 3,
            overlap: 0.5,
        };
        assert_eq!(c.step(), 2);

        let no_overlap = ChunkingConfig {
            chunk_size: 4,
            overlap: 0.0,
        };
        assert_eq!(no_overlap.step(), 4);

        let heavy_overlap = ChunkingConfig {
            chunk_size: 2,
            overlap: 0.9,
        };
        assert_eq!(heavy_overlap.step(), 1);
    }

    #[test]
    fn invalid_config_rejected() {
        assert!(ChunkingConfig {
            chunk_size: 0,
            overlap: 0.5
        }
        .validate()
        .is_err());
        assert!(ChunkingConfig {
            chunk_size: 3,
            overlap: 1.0
        }
        .validate()
        .is_err());
        assert!(ChunkingConfig {
            chunk_size: 3,
            overlap: -0.1
        }
        .validate()
        .is_err());
    }
}
