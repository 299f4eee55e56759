// Log ingestion pipeline: enumerate .log files, chunk, embed, build a new
// index. The previous index is always replaced wholesale, never patched.

use std::path::Path;
use std::sync::Arc;

use taskai_core::LogChunk;
use tracing::info;
use uuid::Uuid;

use crate::chunker::{split_text, CHUNK_OVERLAP, CHUNK_SIZE};
use crate::embedder::Embedder;
use crate::index::{SharedIndex, VectorIndex};
use crate::RagError;

pub struct Ingestor {
    embedder: Arc<dyn Embedder>,
    chunk_size: usize,
    overlap: usize,
}

impl Ingestor {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            chunk_size: CHUNK_SIZE,
            overlap: CHUNK_OVERLAP,
        }
    }

    pub fn with_chunking(mut self, chunk_size: usize, overlap: usize) -> Self {
        self.chunk_size = chunk_size;
        self.overlap = overlap;
        self
    }

    /// Build a fresh index from every .log file directly under `dir`.
    pub fn ingest_dir(&self, dir: &Path) -> Result<VectorIndex, RagError> {
        let mut files: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.extension()
                    .map(|ext| ext.eq_ignore_ascii_case("log"))
                    .unwrap_or(false)
            })
            .collect();
        // stable file order keeps ingestion deterministic
        files.sort();

        if files.is_empty() {
            return Err(RagError::NoLogFiles(dir.to_path_buf()));
        }

        let mut sources: Vec<(String, usize, usize)> = Vec::new();
        let mut texts: Vec<String> = Vec::new();

        for path in &files {
            let content = std::fs::read_to_string(path)?;
            let source = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());

            let spans = split_text(&content, self.chunk_size, self.overlap);
            info!(source = %source, chunks = spans.len(), "file chunked");

            for span in spans {
                sources.push((source.clone(), span.start, span.end));
                texts.push(span.text);
            }
        }

        let embeddings = self.embedder.embed(&texts)?;

        let mut index = VectorIndex::new(self.embedder.dim());
        for (((source, start, end), text), embedding) in
            sources.into_iter().zip(texts).zip(embeddings)
        {
            index.push(LogChunk {
                id: Uuid::new_v4(),
                source,
                start,
                end,
                text,
                embedding,
            })?;
        }

        info!(files = files.len(), chunks = index.len(), "corpus ingested");
        Ok(index)
    }

    /// Full ingestion: build, persist, then publish over the live handle.
    /// Readers keep their snapshot until the swap; the partial index is
    /// never visible.
    pub fn ingest_and_publish(
        &self,
        dir: &Path,
        index_path: &Path,
        shared: &SharedIndex,
    ) -> Result<usize, RagError> {
        let index = self.ingest_dir(dir)?;
        index.save(index_path)?;
        let chunks = index.len();
        shared.publish(index);
        Ok(chunks)
    }
}
