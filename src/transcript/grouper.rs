//! Groups a flat word-token stream into phrase segments.
//!
//! The ASR collaborator returns word-level timestamps only; sentence structure
//! is reconstructed here by breaking on pauses and capping segment length.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::{Millis, Segment, WordToken};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// A pause longer than this between adjacent words starts a new segment.
    pub max_gap: Millis,
    /// Hard cap on words per segment, applied regardless of pauses.
    pub max_words_per_segment: usize,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            max_gap: Millis(900),
            max_words_per_segment: 40,
        }
    }
}

/// Convert ordered word tokens into ordered, non-fragmented segments.
///
/// Tokens are accumulated until either the inter-word gap exceeds
/// `max_gap` or the accumulator reaches `max_words_per_segment`; the
/// accumulator is then flushed as one segment. A trailing accumulator always
/// flushes, so no token is dropped except corrupt ones. Empty input yields an
/// empty list.
pub fn group_words(tokens: &[WordToken], config: &GroupingConfig) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut current: Vec<WordToken> = Vec::new();

    for token in tokens {
        if token.text.trim().is_empty() {
            log::debug!("dropping empty word token at {}", token.start);
            continue;
        }

        if let Some(prev) = current.last() {
            let gap = token.start.saturating_sub(prev.effective_end());
            if gap > config.max_gap || current.len() >= config.max_words_per_segment {
                flush(&mut segments, &mut current);
            }
        }

        current.push(token.clone());
    }

    flush(&mut segments, &mut current);
    segments
}

fn flush(segments: &mut Vec<Segment>, current: &mut Vec<WordToken>) {
    if current.is_empty() {
        return;
    }

    let words = std::mem::take(current);
    let first = &words[0];
    let last = &words[words.len() - 1];

    let joined = words
        .iter()
        .map(|w| w.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    segments.push(Segment {
        id: segments.len(),
        start: first.start,
        end: last.effective_end(),
        text: normalize_text(&joined),
        words,
    });
}

/// Collapse whitespace runs and drop whitespace that precedes punctuation.
pub fn normalize_text(text: &str) -> String {
    static WS_RUN: OnceLock<Regex> = OnceLock::new();
    static WS_BEFORE_PUNCT: OnceLock<Regex> = OnceLock::new();

    let ws_run = WS_RUN.get_or_init(|| Regex::new(r"\s{2,}").unwrap());
    let ws_punct = WS_BEFORE_PUNCT.get_or_init(|| Regex::new(r"\s+([.,!?;:%)\]])").unwrap());

    let collapsed = ws_run.replace_all(text.trim(), " ");
    ws_punct.replace_all(&collapsed, "$1").into_owned()
}
