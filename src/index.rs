//! Vector index collaborator seam and the stable chunk identifier.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::chunking::Chunk;
use crate::transcript::Millis;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Deterministic chunk identifier.
///
/// Hashing the title, the millisecond time range and the trimmed text means
/// re-running chunking and indexing on unchanged input produces the same ids,
/// so upserts overwrite instead of duplicating.
pub fn stable_id(audio_title: &str, start: Millis, end: Millis, text: &str) -> String {
    use std::fmt::Write;

    let payload = format!("{}|{}|{}|{}", audio_title, start.0, end.0, text.trim());
    let digest = Sha256::digest(payload.as_bytes());
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

/// One chunk prepared for upsert: vector plus flattened metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ChunkRecord {
    pub id: String,
    pub embedding: Vec<f32>,
    pub document: String,
    pub metadata: ChunkMetadata,
}

/// Flat metadata stored next to each vector. `segment_indices` is flattened
/// to a comma-joined string because list values are not portable across
/// vector stores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkMetadata {
    pub audio_title: String,
    /// Seconds.
    pub start: f64,
    /// Seconds.
    pub end: f64,
    pub timestamp_range: String,
    pub segment_indices: String,
    pub segments_in_chunk: usize,
}

impl ChunkMetadata {
    pub fn from_chunk(chunk: &Chunk) -> Self {
        Self {
            audio_title: chunk.audio_title.clone(),
            start: chunk.start.as_secs_f64(),
            end: chunk.end.as_secs_f64(),
            timestamp_range: chunk.timestamp_range.clone(),
            segment_indices: chunk
                .segment_indices
                .iter()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join(","),
            segments_in_chunk: chunk.segments_in_chunk(),
        }
    }
}

/// A retrieval hit returned by [`VectorIndex::query`].
#[derive(Debug, Clone)]
pub struct QueryHit {
    pub id: String,
    pub document: String,
    pub metadata: ChunkMetadata,
    pub distance: f32,
}

pub trait VectorIndex {
    /// Idempotent: repeating an upsert with the same ids overwrites.
    fn upsert(&self, records: &[ChunkRecord]) -> Result<(), IndexError>;

    fn query(
        &self,
        vector: &[f32],
        k: usize,
        audio_title: Option<&str>,
    ) -> Result<Vec<QueryHit>, IndexError>;
}

/// Chroma REST collection client.
#[derive(Debug, Clone)]
pub struct HttpChromaIndex {
    base_url: String,
    collection: String,
    client: reqwest::blocking::Client,
}

#[derive(Serialize)]
struct UpsertBody<'a> {
    ids: Vec<&'a str>,
    embeddings: Vec<&'a [f32]>,
    metadatas: Vec<&'a ChunkMetadata>,
    documents: Vec<&'a str>,
}

#[derive(Serialize)]
struct QueryBody<'a> {
    query_embeddings: Vec<&'a [f32]>,
    n_results: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    r#where: Option<serde_json::Value>,
    include: Vec<&'static str>,
}

#[derive(Deserialize)]
struct QueryResponse {
    ids: Vec<Vec<String>>,
    documents: Vec<Vec<String>>,
    metadatas: Vec<Vec<ChunkMetadata>>,
    distances: Vec<Vec<f32>>,
}

impl HttpChromaIndex {
    pub fn new(base_url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            collection: collection.into(),
            client: reqwest::blocking::Client::new(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn collection_url(&self, action: &str) -> String {
        format!(
            "{}/api/v1/collections/{}/{}",
            self.base_url, self.collection, action
        )
    }

    fn check(response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response, IndexError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status().as_u16();
            let body = response.text().unwrap_or_default();
            Err(IndexError::Api { status, body })
        }
    }
}

impl VectorIndex for HttpChromaIndex {
    fn upsert(&self, records: &[ChunkRecord]) -> Result<(), IndexError> {
        if records.is_empty() {
            return Ok(());
        }

        let start = Instant::now();
        let body = UpsertBody {
            ids: records.iter().map(|r| r.id.as_str()).collect(),
            embeddings: records.iter().map(|r| r.embedding.as_slice()).collect(),
            metadatas: records.iter().map(|r| &r.metadata).collect(),
            documents: records.iter().map(|r| r.document.as_str()).collect(),
        };

        let response = self
            .client
            .post(self.collection_url("upsert"))
            .json(&body)
            .send()?;
        Self::check(response)?;

        log::info!(
            "upserted {} record(s) into '{}' in {:?}",
            records.len(),
            self.collection,
            start.elapsed()
        );
        Ok(())
    }

    fn query(
        &self,
        vector: &[f32],
        k: usize,
        audio_title: Option<&str>,
    ) -> Result<Vec<QueryHit>, IndexError> {
        let body = QueryBody {
            query_embeddings: vec![vector],
            n_results: k,
            r#where: audio_title.map(|t| serde_json::json!({ "audio_title": t })),
            include: vec!["documents", "metadatas", "distances"],
        };

        let response = self
            .client
            .post(self.collection_url("query"))
            .json(&body)
            .send()?;
        let parsed: QueryResponse = Self::check(response)?
            .json()
            .map_err(|e| IndexError::Malformed(e.to_string()))?;

        let (Some(ids), Some(documents), Some(metadatas), Some(distances)) = (
            parsed.ids.into_iter().next(),
            parsed.documents.into_iter().next(),
            parsed.metadatas.into_iter().next(),
            parsed.distances.into_iter().next(),
        ) else {
            return Ok(Vec::new());
        };

        Ok(ids
            .into_iter()
            .zip(documents)
            .zip(metadatas.into_iter().zip(distances))
            .map(|((id, document), (metadata, distance))| QueryHit {
                id,
                document,
                metadata,
                distance,
            })
            .collect())
    }
}
