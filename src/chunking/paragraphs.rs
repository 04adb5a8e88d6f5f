//! Groups sentence units into semantically coherent paragraphs.
//!
//! A paragraph breaks where adjacent units drift apart in embedding space,
//! but only once the buffer is substantial enough; size caps force a break
//! regardless of similarity so no paragraph grows unbounded.

use serde::{Deserialize, Serialize};

use super::{ChunkingError, Paragraph, SentenceUnit};
use crate::embed::{cosine_similarity, EmbeddingProvider};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParagraphConfig {
    /// Adjacent-pair cosine similarity below this marks a topic shift.
    pub threshold: f32,
    pub min_units: usize,
    pub max_units: usize,
    pub min_words: usize,
    pub max_words: usize,
}

impl Default for ParagraphConfig {
    fn default() -> Self {
        Self {
            threshold: 0.7,
            min_units: 2,
            max_units: 8,
            min_words: 15,
            max_words: 150,
        }
    }
}

/// Fold ordered units into paragraphs using adjacent-pair similarity.
///
/// One embedding is computed per unit through the injected provider; only
/// consecutive pairs are compared. After appending unit `i` the buffer
/// flushes when similarity to the next unit falls under the threshold and
/// the buffer is long enough, or unconditionally when a size cap is hit.
/// Whatever remains at end of input flushes as the final paragraph, so a
/// single unit always yields exactly one paragraph.
pub fn group_paragraphs(
    units: &[SentenceUnit],
    embedder: &dyn EmbeddingProvider,
    config: &ParagraphConfig,
) -> Result<Vec<Paragraph>, ChunkingError> {
    if units.is_empty() {
        return Ok(Vec::new());
    }

    let texts: Vec<String> = units.iter().map(|u| u.text.clone()).collect();
    let embeddings = embedder.embed(&texts)?;

    let mut paragraphs = Vec::new();
    let mut buffer: Vec<&SentenceUnit> = Vec::new();
    let mut buffer_words = 0usize;

    for (i, unit) in units.iter().enumerate() {
        buffer.push(unit);
        buffer_words += unit.text.split_whitespace().count();

        let semantic_break = i + 1 < units.len()
            && cosine_similarity(&embeddings[i], &embeddings[i + 1]) < config.threshold;
        let long_enough = buffer.len() >= config.min_units || buffer_words >= config.min_words;
        let too_long = buffer.len() >= config.max_units || buffer_words >= config.max_words;

        if (semantic_break && long_enough) || too_long {
            paragraphs.push(flush(&mut buffer));
            buffer_words = 0;
        }
    }

    if !buffer.is_empty() {
        paragraphs.push(flush(&mut buffer));
    }

    log::debug!("grouped {} unit(s) into {} paragraph(s)", units.len(), paragraphs.len());
    Ok(paragraphs)
}

fn flush(buffer: &mut Vec<&SentenceUnit>) -> Paragraph {
    let text = buffer
        .iter()
        .map(|u| u.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let start = buffer.first().map(|u| u.start).unwrap_or_default();
    let end = buffer.last().map(|u| u.end).unwrap_or_default();
    buffer.clear();
    Paragraph { text, start, end }
}
