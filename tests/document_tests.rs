use audiorag::transcript::{
    group_words, GroupingConfig, Millis, TranscriptDocument, TranscriptResult, WordToken,
};

fn word(text: &str, start_ms: i64, end_ms: i64) -> WordToken {
    WordToken::new(text, Millis(start_ms), Some(Millis(end_ms)))
}

fn sample_transcript() -> TranscriptResult {
    let tokens = vec![
        word("hello", 100, 500),
        word("world", 600, 1_000),
        // Pause over the default gap starts a second segment.
        word("second", 2_200, 2_600),
        word("thought", 2_700, 3_100),
    ];
    let segments = group_words(&tokens, &GroupingConfig::default());

    TranscriptResult {
        full_text: "hello world second thought".to_string(),
        segments,
        source: "talk.wav".to_string(),
    }
}

#[test]
fn save_load_round_trip_rebuilds_transcript() {
    let original = sample_transcript();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("talk.wav.json");

    TranscriptDocument::from_result(&original).save(&path).unwrap();
    let restored = TranscriptDocument::load(&path).unwrap().into_result();

    assert_eq!(restored.source, "talk.wav");
    assert_eq!(restored.segments.len(), original.segments.len());
    for (a, b) in restored.segments.iter().zip(original.segments.iter()) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.start, b.start);
        assert_eq!(a.end, b.end);
        assert_eq!(a.text, b.text);
        assert_eq!(a.words.len(), b.words.len());
        for (wa, wb) in a.words.iter().zip(b.words.iter()) {
            assert_eq!(wa.text, wb.text);
            assert_eq!(wa.start, wb.start);
            assert_eq!(wa.effective_end(), wb.effective_end());
        }
    }
}

#[test]
fn round_trip_full_text_joins_segment_texts() {
    let original = sample_transcript();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("talk.wav.json");

    TranscriptDocument::from_result(&original).save(&path).unwrap();
    let restored = TranscriptDocument::load(&path).unwrap().into_result();

    // Rebuilt from segment texts rather than carried through the document.
    assert_eq!(restored.full_text, "hello world second thought");
}

#[test]
fn zero_width_word_survives_round_trip() {
    let tokens = vec![
        word("only", 0, 400),
        WordToken::new("tail", Millis(500), None),
    ];
    let segments = group_words(&tokens, &GroupingConfig::default());
    let original = TranscriptResult {
        full_text: "only tail".to_string(),
        segments,
        source: "talk.wav".to_string(),
    };

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("talk.wav.json");
    TranscriptDocument::from_result(&original).save(&path).unwrap();
    let restored = TranscriptDocument::load(&path).unwrap().into_result();

    let tail = &restored.segments[0].words[1];
    assert_eq!(tail.start, Millis(500));
    assert_eq!(tail.effective_end(), Millis(500));
}
