use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

use audiorag::asr::{AsrError, AsrProvider, RawTranscript, RawWord};
use audiorag::embed::{EmbedError, EmbeddingProvider};
use audiorag::index::{ChunkRecord, IndexError, QueryHit, VectorIndex};
use audiorag::pipeline::run_pipeline;
use audiorag::transcript::{Millis, TranscriptDocument};
use audiorag::PipelineConfig;

const SR: u32 = 16_000;

/// A 3s recording: speech, a 600ms pause, speech. With a 1.5s part budget
/// the splitter cuts at the pause, giving two parts.
fn write_test_wav(path: &Path) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SR,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();

    let tone_len = (SR as usize * 12) / 10;
    let quiet_len = (SR as usize * 6) / 10;
    for i in 0..tone_len {
        let s = ((i as f32 * 0.1).sin() * 0.5 * i16::MAX as f32) as i16;
        writer.write_sample(s).unwrap();
    }
    for _ in 0..quiet_len {
        writer.write_sample(0i16).unwrap();
    }
    for i in 0..tone_len {
        let s = ((i as f32 * 0.1).sin() * 0.5 * i16::MAX as f32) as i16;
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
}

fn word(text: &str, start: f64, end: f64) -> RawWord {
    RawWord {
        word: text.to_string(),
        start: Some(start),
        end: Some(end),
    }
}

/// Scripted per-part transcripts, returned in call order.
struct FakeAsr {
    calls: Mutex<usize>,
    fail_on: Option<usize>,
}

impl FakeAsr {
    fn new() -> Self {
        Self {
            calls: Mutex::new(0),
            fail_on: None,
        }
    }

    fn failing_on(call: usize) -> Self {
        Self {
            calls: Mutex::new(0),
            fail_on: Some(call),
        }
    }
}

impl AsrProvider for FakeAsr {
    fn transcribe(&self, _audio: &Path) -> Result<RawTranscript, AsrError> {
        let mut calls = self.calls.lock().unwrap();
        let call = *calls;
        *calls += 1;
        drop(calls);

        if self.fail_on == Some(call % 2) {
            return Err(AsrError::Api {
                status: 503,
                body: "overloaded".to_string(),
            });
        }

        if call % 2 == 0 {
            Ok(RawTranscript {
                text: "hello world".to_string(),
                words: vec![word("hello", 0.1, 0.5), word("world", 0.6, 1.0)],
            })
        } else {
            Ok(RawTranscript {
                text: "second part".to_string(),
                words: vec![word("second", 0.2, 0.6), word("part", 0.7, 1.1)],
            })
        }
    }
}

struct FakeEmbedder;

impl EmbeddingProvider for FakeEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        Ok(texts.iter().map(|_| vec![1.0, 0.0, 0.0]).collect())
    }
}

/// In-memory index keyed by id, so repeated upserts overwrite like the real
/// store does.
#[derive(Default)]
struct FakeIndex {
    records: Mutex<BTreeMap<String, ChunkRecord>>,
}

impl VectorIndex for FakeIndex {
    fn upsert(&self, records: &[ChunkRecord]) -> Result<(), IndexError> {
        let mut stored = self.records.lock().unwrap();
        for record in records {
            stored.insert(record.id.clone(), record.clone());
        }
        Ok(())
    }

    fn query(
        &self,
        _vector: &[f32],
        _k: usize,
        _audio_title: Option<&str>,
    ) -> Result<Vec<QueryHit>, IndexError> {
        Ok(Vec::new())
    }
}

fn test_config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.split.part_budget = Millis(1_500);
    config.split.lookback = Millis(1_000);
    config.split.min_silence = Millis(300);
    config
}

fn part_files_in(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with("part-") && name.ends_with(".wav"))
        .collect()
}

#[test]
fn full_run_produces_transcript_chunks_and_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("talk.wav");
    write_test_wav(&audio);
    let out = dir.path().join("out");

    let index = FakeIndex::default();
    let summary = run_pipeline(
        &audio,
        "talk.wav",
        &test_config(),
        &FakeAsr::new(),
        &FakeEmbedder,
        &index,
        "audio_chunks",
        &out,
    )
    .unwrap();

    assert_eq!(summary.parts, 2);
    assert_eq!(summary.segments, 2);
    assert_eq!(summary.chunks, 1);
    assert_eq!(summary.count_indexed, 1);
    assert_eq!(summary.paragraphs, None);

    // Transcript artifact has the merged, globally shifted timeline.
    let document = TranscriptDocument::load(&summary.transcript_path).unwrap();
    assert_eq!(document.words_total, 4);
    assert_eq!(document.segments.len(), 2);
    let second = &document.segments[1];
    // Part 1 ends at 1.0s; part 2's raw 0.2s start lands at 1.2s globally.
    assert!((second.start - 1.2).abs() < 1e-9, "start {}", second.start);
    assert_eq!(second.start_timestamp, "00:00:01.200");

    // Manifest written next to the transcript.
    assert!(out.join("ingest_manifest.json").exists());

    // Part temp files were all released.
    assert!(part_files_in(&out).is_empty());

    // Indexed metadata carries the flattened chunk shape.
    let stored = index.records.lock().unwrap();
    let record = stored.values().next().unwrap();
    assert_eq!(record.metadata.audio_title, "talk.wav");
    assert_eq!(record.metadata.segment_indices, "0,1");
    assert_eq!(record.metadata.segments_in_chunk, 2);
    assert!(record.document.starts_with("passage: "));
}

#[test]
fn rerun_overwrites_instead_of_duplicating() {
    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("talk.wav");
    write_test_wav(&audio);
    let out = dir.path().join("out");

    let index = FakeIndex::default();
    let config = test_config();

    let first = run_pipeline(
        &audio,
        "talk.wav",
        &config,
        &FakeAsr::new(),
        &FakeEmbedder,
        &index,
        "audio_chunks",
        &out,
    )
    .unwrap();
    let second = run_pipeline(
        &audio,
        "talk.wav",
        &config,
        &FakeAsr::new(),
        &FakeEmbedder,
        &index,
        "audio_chunks",
        &out,
    )
    .unwrap();

    assert_eq!(first.chunks, second.chunks);
    // Same input, same stable ids; the index holds one copy.
    assert_eq!(index.records.lock().unwrap().len(), first.chunks);
}

#[test]
fn asr_failure_propagates_and_cleans_up_parts() {
    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("talk.wav");
    write_test_wav(&audio);
    let out = dir.path().join("out");

    let index = FakeIndex::default();
    let result = run_pipeline(
        &audio,
        "talk.wav",
        &test_config(),
        &FakeAsr::failing_on(1),
        &FakeEmbedder,
        &index,
        "audio_chunks",
        &out,
    );

    assert!(result.is_err());
    // The failing part's temp file is still released.
    assert!(part_files_in(&out).is_empty());
    assert!(index.records.lock().unwrap().is_empty());
}

#[test]
fn paragraph_stage_groups_before_chunking() {
    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("talk.wav");
    write_test_wav(&audio);
    let out = dir.path().join("out");

    let mut config = test_config();
    config.paragraphs.enabled = true;
    config.paragraphs.config.min_units = 1;
    config.paragraphs.config.min_words = 1;

    let index = FakeIndex::default();
    let summary = run_pipeline(
        &audio,
        "talk.wav",
        &config,
        &FakeAsr::new(),
        &FakeEmbedder,
        &index,
        "audio_chunks",
        &out,
    )
    .unwrap();

    // Identical fake embeddings keep both segments in one paragraph.
    assert_eq!(summary.paragraphs, Some(1));
    assert_eq!(summary.chunks, 1);
}

#[test]
fn invalid_chunking_config_fails_before_any_work() {
    let dir = tempfile::tempdir().unwrap();
    let audio = dir.path().join("talk.wav");
    write_test_wav(&audio);
    let out = dir.path().join("out");

    let mut config = test_config();
    config.chunking.overlap = 1.5;

    let index = FakeIndex::default();
    let result = run_pipeline(
        &audio,
        "talk.wav",
        &config,
        &FakeAsr::new(),
        &FakeEmbedder,
        &index,
        "audio_chunks",
        &out,
    );

    assert!(result.is_err());
    assert!(!out.exists());
}
