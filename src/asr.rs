//! Speech-to-text collaborator seam.
//!
//! The engine never runs model inference itself; it talks to an
//! [`AsrProvider`] that returns word-level timestamps. The HTTP
//! implementation targets OpenAI-compatible `audio/transcriptions`
//! endpoints (whisper servers, voxtral, open-asr-server).

use std::path::Path;
use std::time::Instant;

use serde::Deserialize;
use thiserror::Error;

use crate::transcript::{Millis, WordToken};

#[derive(Error, Debug)]
pub enum AsrError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Raw word as returned by the collaborator, timestamps in seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct RawWord {
    pub word: String,
    pub start: Option<f64>,
    pub end: Option<f64>,
}

/// Raw per-part transcription result.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTranscript {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub words: Vec<RawWord>,
}

impl RawTranscript {
    /// Convert to engine tokens. Words without a start timestamp are corrupt
    /// and dropped; a missing end makes the token zero-width.
    pub fn tokens(&self) -> Vec<WordToken> {
        self.words
            .iter()
            .filter_map(|w| {
                let start = match w.start {
                    Some(s) => Millis::from_secs_f64(s),
                    None => {
                        log::debug!("dropping word without start timestamp: {:?}", w.word);
                        return None;
                    }
                };
                Some(WordToken::new(
                    w.word.clone(),
                    start,
                    w.end.map(Millis::from_secs_f64),
                ))
            })
            .collect()
    }
}

pub trait AsrProvider {
    fn transcribe(&self, audio: &Path) -> Result<RawTranscript, AsrError>;
}

/// OpenAI-compatible transcription endpoint.
#[derive(Debug, Clone)]
pub struct HttpAsr {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
}

impl HttpAsr {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into().trim().to_string(),
            model: model.into(),
            api_key,
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl AsrProvider for HttpAsr {
    fn transcribe(&self, audio: &Path) -> Result<RawTranscript, AsrError> {
        let start = Instant::now();
        let bytes = std::fs::read(audio)?;
        let file_name = audio
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        let part = reqwest::blocking::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("audio/wav")?;

        let form = reqwest::blocking::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "word");

        let mut req = self.client.post(&self.endpoint).multipart(form);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send()?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            return Err(AsrError::Api { status, body });
        }

        let transcript: RawTranscript = response
            .json()
            .map_err(|e| AsrError::Malformed(e.to_string()))?;

        log::info!(
            "transcribed {} ({} words) in {:?}",
            audio.display(),
            transcript.words.len(),
            start.elapsed()
        );

        Ok(transcript)
    }
}
