// Vector index - flat dot-product nearest-neighbor search over log chunks,
// persisted as JSON and republished wholesale via an atomic Arc swap.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use taskai_core::LogChunk;
use tracing::info;

use crate::RagError;

#[derive(Debug, Serialize, Deserialize)]
pub struct VectorIndex {
    dim: usize,
    chunks: Vec<LogChunk>,
}

/// One retrieval result borrowed from the index snapshot.
#[derive(Debug)]
pub struct SearchHit<'a> {
    pub score: f32,
    pub chunk: &'a LogChunk,
}

impl VectorIndex {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            chunks: Vec::new(),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn push(&mut self, chunk: LogChunk) -> Result<(), RagError> {
        if chunk.embedding.len() != self.dim {
            return Err(RagError::DimensionMismatch {
                expected: self.dim,
                got: chunk.embedding.len(),
            });
        }
        self.chunks.push(chunk);
        Ok(())
    }

    /// Top-k by dot product (vectors are normalized, so this is cosine).
    /// Ranking is purely by similarity; a non-empty index always returns
    /// up to k hits, however unrelated the query is.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<SearchHit<'_>> {
        let mut hits: Vec<SearchHit> = self
            .chunks
            .iter()
            .map(|chunk| SearchHit {
                score: dot(query, &chunk.embedding),
                chunk,
            })
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);
        hits
    }

    /// Persist as JSON. Written to a temp file first and renamed over the
    /// target, so a crash mid-write never leaves a half-written index.
    pub fn save(&self, path: &Path) -> Result<(), RagError> {
        let tmp = path.with_extension("tmp");
        let file = File::create(&tmp)?;
        serde_json::to_writer(BufWriter::new(file), self)?;
        std::fs::rename(&tmp, path)?;
        info!(path = %path.display(), chunks = self.len(), "index persisted");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, RagError> {
        let file = File::open(path)?;
        let index: VectorIndex = serde_json::from_reader(BufReader::new(file))?;
        info!(path = %path.display(), chunks = index.len(), "index loaded");
        Ok(index)
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Shared handle over the live index. Ingestion builds a replacement off to
/// the side and publishes it in one swap; readers snapshot the Arc and keep
/// searching the version they started with. Queries therefore always see
/// either the old or the new index in full, never a partial rebuild.
pub struct SharedIndex {
    inner: RwLock<Arc<VectorIndex>>,
}

impl SharedIndex {
    pub fn new(index: VectorIndex) -> Self {
        Self {
            inner: RwLock::new(Arc::new(index)),
        }
    }

    pub fn empty(dim: usize) -> Self {
        Self::new(VectorIndex::new(dim))
    }

    pub fn snapshot(&self) -> Arc<VectorIndex> {
        self.inner.read().unwrap().clone()
    }

    pub fn publish(&self, index: VectorIndex) {
        *self.inner.write().unwrap() = Arc::new(index);
    }
}
