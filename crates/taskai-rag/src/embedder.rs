// Embedding backends
//
// FastEmbedder runs the MiniLM ONNX model on CPU. HashEmbedder is the
// deterministic token-hashing stand-in used by tests and benches, where
// pulling model weights is off the table.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use crate::RagError;

/// Produces fixed-dimension, L2-normalized vectors. Identical input text
/// always yields identical vectors, so re-ingesting an unchanged corpus
/// gives a stable retrieval ranking.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError>;
}

/// Scale a vector to unit length; cosine similarity then reduces to a dot
/// product. A zero vector is left as-is.
pub fn normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

// MiniLM-L6-v2 output dimension
const FASTEMBED_DIM: usize = 384;

/// Local CPU embedding via fastembed (AllMiniLML6V2, 384 dims).
pub struct FastEmbedder {
    model: Mutex<TextEmbedding>,
}

impl FastEmbedder {
    pub fn new() -> Result<Self, RagError> {
        let model = TextEmbedding::try_new(InitOptions::new(EmbeddingModel::AllMiniLML6V2))
            .map_err(|e| RagError::Embedding(e.to_string()))?;
        Ok(Self {
            model: Mutex::new(model),
        })
    }
}

impl Embedder for FastEmbedder {
    fn dim(&self) -> usize {
        FASTEMBED_DIM
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        let mut model = self.model.lock().unwrap();
        let mut vectors = model
            .embed(texts.to_vec(), None)
            .map_err(|e| RagError::Embedding(e.to_string()))?;
        for v in vectors.iter_mut() {
            normalize(v);
        }
        Ok(vectors)
    }
}

/// Deterministic bag-of-tokens hashing embedder. No model files, no
/// network; similarity is driven purely by token overlap, which is enough
/// for retrieval tests and benches.
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Embedder for HashEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        let vectors = texts
            .iter()
            .map(|text| {
                let mut v = vec![0.0f32; self.dim];
                for token in text.to_lowercase().split_whitespace() {
                    let mut hasher = DefaultHasher::new();
                    token.hash(&mut hasher);
                    let bucket = (hasher.finish() % self.dim as u64) as usize;
                    v[bucket] += 1.0;
                }
                normalize(&mut v);
                v
            })
            .collect();
        Ok(vectors)
    }
}
