//! End-to-end orchestration of one recording.
//!
//! Split → per-part ASR → word grouping → merge → optional paragraph
//! grouping → window chunking → embed + upsert. The engine stages are pure;
//! this module owns the file side effects and the collaborator calls.

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;

use crate::asr::AsrProvider;
use crate::audio::{load_audio, plan_for_track, write_part};
use crate::chunking::{chunk_segments, group_paragraphs, Chunk, SentenceUnit};
use crate::config::PipelineConfig;
use crate::embed::EmbeddingProvider;
use crate::error::PipelineError;
use crate::index::{ChunkMetadata, ChunkRecord, VectorIndex};
use crate::transcript::{
    group_words, merge_parts, Segment, TranscriptDocument, TranscriptResult,
};

/// Prefix applied to indexed documents; queries use [`QUERY_PREFIX`]. E5-style
/// embedding models distinguish the two roles.
pub const PASSAGE_PREFIX: &str = "passage: ";
pub const QUERY_PREFIX: &str = "query: ";

/// What one pipeline run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub audio_title: String,
    pub parts: usize,
    pub segments: usize,
    pub paragraphs: Option<usize>,
    pub chunks: usize,
    pub count_indexed: usize,
    pub collection: String,
    pub transcript_path: PathBuf,
}

/// Transcribe one recording: split on silence, run ASR per part in index
/// order, group words into segments, merge with a running offset, and write
/// the transcript JSON artifact.
///
/// Each part's temp WAV is dropped right after its ASR call, before the next
/// part is written, so peak disk use stays at one part.
pub fn transcribe_recording(
    audio_path: &Path,
    audio_title: &str,
    config: &PipelineConfig,
    asr: &dyn AsrProvider,
    out_dir: &Path,
) -> Result<(TranscriptResult, PathBuf, usize), PipelineError> {
    let started = Instant::now();
    let track = load_audio(audio_path)?;
    let parts = plan_for_track(&track, &config.split)?;
    let part_count = parts.len();

    std::fs::create_dir_all(out_dir)?;

    let mut part_results: Vec<TranscriptResult> = Vec::with_capacity(parts.len());
    for part in &parts {
        let part_audio = write_part(&track, part, out_dir)?;
        let raw = asr.transcribe(part_audio.path());
        drop(part_audio);
        let raw = raw?;

        let tokens = raw.tokens();
        let segments = group_words(&tokens, &config.grouping);
        log::info!(
            "part {}: {} token(s) -> {} segment(s)",
            part.index,
            tokens.len(),
            segments.len()
        );

        part_results.push(TranscriptResult {
            full_text: raw.text.trim().to_string(),
            segments,
            source: format!("{}#part{}", audio_title, part.index),
        });
    }

    let merged = merge_parts(&part_results, audio_title);

    let transcript_path = out_dir.join(format!("{audio_title}.json"));
    let mut document = TranscriptDocument::from_result(&merged);
    document.duration = track.duration().as_secs_f64();
    document.save(&transcript_path)?;

    log::info!(
        "transcribed {} ({} part(s), {} segment(s)) in {:?}",
        audio_title,
        part_count,
        merged.segments.len(),
        started.elapsed()
    );

    Ok((merged, transcript_path, part_count))
}

/// Chunk a merged transcript, optionally grouping into paragraphs first.
pub fn chunk_transcript(
    transcript: &TranscriptResult,
    audio_title: &str,
    config: &PipelineConfig,
    embedder: &dyn EmbeddingProvider,
) -> Result<(Vec<Chunk>, Option<usize>), PipelineError> {
    if !config.paragraphs.enabled {
        let chunks = chunk_segments(&transcript.segments, audio_title, &config.chunking)?;
        return Ok((chunks, None));
    }

    let units: Vec<SentenceUnit> = transcript
        .segments
        .iter()
        .map(|s| SentenceUnit {
            text: s.text.clone(),
            start: s.start,
            end: s.end,
        })
        .collect();

    let paragraphs = group_paragraphs(&units, embedder, &config.paragraphs.config)?;

    // Paragraphs are re-expressed as segments so the window chunker sees one
    // ordered, time-spanned unit kind either way.
    let paragraph_segments: Vec<Segment> = paragraphs
        .iter()
        .enumerate()
        .map(|(id, p)| Segment {
            id,
            start: p.start,
            end: p.end,
            text: p.text.clone(),
            words: Vec::new(),
        })
        .collect();

    let chunks = chunk_segments(&paragraph_segments, audio_title, &config.chunking)?;
    Ok((chunks, Some(paragraphs.len())))
}

/// Embed chunk texts and upsert them into the index; idempotent because
/// chunk ids are stable content hashes.
pub fn index_chunks(
    chunks: &[Chunk],
    embedder: &dyn EmbeddingProvider,
    index: &dyn VectorIndex,
) -> Result<usize, PipelineError> {
    if chunks.is_empty() {
        return Ok(0);
    }

    let texts: Vec<String> = chunks
        .iter()
        .map(|c| format!("{PASSAGE_PREFIX}{}", c.text.trim()))
        .collect();
    let vectors = embedder.embed(&texts)?;

    let records: Vec<ChunkRecord> = chunks
        .iter()
        .zip(texts)
        .zip(vectors)
        .map(|((chunk, document), embedding)| ChunkRecord {
            id: chunk.id.clone(),
            embedding,
            document,
            metadata: ChunkMetadata::from_chunk(chunk),
        })
        .collect();

    index.upsert(&records)?;
    Ok(records.len())
}

/// Run the whole pipeline for one recording and write the ingest manifest.
#[allow(clippy::too_many_arguments)]
pub fn run_pipeline(
    audio_path: &Path,
    audio_title: &str,
    config: &PipelineConfig,
    asr: &dyn AsrProvider,
    embedder: &dyn EmbeddingProvider,
    index: &dyn VectorIndex,
    collection: &str,
    out_dir: &Path,
) -> Result<RunSummary, PipelineError> {
    config.validate()?;

    let (transcript, transcript_path, parts) =
        transcribe_recording(audio_path, audio_title, config, asr, out_dir)?;
    let (chunks, paragraphs) = chunk_transcript(&transcript, audio_title, config, embedder)?;
    let count_indexed = index_chunks(&chunks, embedder, index)?;

    let summary = RunSummary {
        audio_title: audio_title.to_string(),
        parts,
        segments: transcript.segments.len(),
        paragraphs,
        chunks: chunks.len(),
        count_indexed,
        collection: collection.to_string(),
        transcript_path,
    };

    let manifest_path = out_dir.join("ingest_manifest.json");
    std::fs::write(&manifest_path, serde_json::to_string_pretty(&summary)?)?;
    log::info!(
        "pipeline done for {}: {} chunk(s) indexed, manifest at {}",
        audio_title,
        count_indexed,
        manifest_path.display()
    );

    Ok(summary)
}
