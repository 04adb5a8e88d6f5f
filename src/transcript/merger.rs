//! Merges per-part transcripts into one globally time-consistent transcript.

use super::{Millis, Segment, TranscriptResult};

/// Combine per-part results (ordered by part index) into a single transcript.
///
/// Every segment and nested word is shifted by a running offset. The offset
/// advances to the end of the last appended segment rather than the nominal
/// part duration, so trimming and silence consumed during splitting never
/// desynchronize the global timeline. Parts with zero segments leave the
/// offset unchanged. Segment ids are renumbered across the merged list.
///
/// This is a pure function of its input: merging the same ordered part list
/// twice yields identical output.
pub fn merge_parts(parts: &[TranscriptResult], source: impl Into<String>) -> TranscriptResult {
    let mut segments: Vec<Segment> = Vec::new();
    let mut full_text = String::new();
    let mut offset = Millis::ZERO;

    for (part_index, part) in parts.iter().enumerate() {
        for segment in &part.segments {
            let mut shifted = segment.clone();
            shifted.id = segments.len();
            shifted.start += offset;
            shifted.end += offset;
            for word in &mut shifted.words {
                word.start += offset;
                if let Some(end) = word.end.as_mut() {
                    *end += offset;
                }
            }
            segments.push(shifted);
        }

        let fragment = part.full_text.trim();
        if !fragment.is_empty() {
            if !full_text.is_empty() {
                full_text.push(' ');
            }
            full_text.push_str(fragment);
        }

        if !part.segments.is_empty() {
            if let Some(last) = segments.last() {
                offset = last.end;
            }
        }

        log::debug!(
            "merged part {}: {} segments, offset now {}",
            part_index,
            part.segments.len(),
            offset
        );
    }

    TranscriptResult {
        full_text,
        segments,
        source: source.into(),
    }
}
