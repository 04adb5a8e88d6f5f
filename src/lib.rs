//! Batch transcription, segmentation and chunking for audio retrieval.
//!
//! The engine turns a long-form recording into overlapping, uniquely
//! identified text chunks ready for vector indexing: silence-aligned audio
//! splitting, word-to-segment grouping, offset-correct part merging,
//! optional semantic paragraphing and overlapping window chunking. Model
//! inference, embeddings and the vector store are injected collaborators.

pub mod asr;
pub mod audio;
pub mod chunking;
pub mod config;
pub mod embed;
pub mod error;
pub mod index;
pub mod pipeline;
pub mod transcript;

pub use config::PipelineConfig;
pub use error::PipelineError;
