//! Log RAG pipeline for taskai
//!
//! Offline: corpus -> chunker -> embedder -> vector index -> disk.
//! Online: question -> embed -> top-k retrieval -> context -> LLM gateway.

pub mod chunker;
pub mod embedder;
pub mod index;
pub mod ingest;
pub mod qa;

pub use chunker::{split_text, ChunkSpan, CHUNK_OVERLAP, CHUNK_SIZE};
pub use embedder::{Embedder, FastEmbedder, HashEmbedder};
pub use index::{SearchHit, SharedIndex, VectorIndex};
pub use ingest::Ingestor;
pub use qa::{QaChain, DEFAULT_TOP_K};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RagError {
    // ingestion was pointed at a corpus with nothing to index
    #[error("no .log files found under {0}")]
    NoLogFiles(PathBuf),

    #[error("embedding failed: {0}")]
    Embedding(String),

    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("index serialization failed: {0}")]
    Persist(#[from] serde_json::Error),
}
