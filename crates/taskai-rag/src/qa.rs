// Retrieval-augmented QA chain: embed the question, pull the k most
// similar chunks, and let the model answer from that context.

use std::sync::Arc;

use taskai_llm::LlmGateway;
use tracing::{debug, info};

use crate::embedder::Embedder;
use crate::index::SharedIndex;
use crate::RagError;

pub const DEFAULT_TOP_K: usize = 3;

pub struct QaChain {
    embedder: Arc<dyn Embedder>,
    index: Arc<SharedIndex>,
    gateway: LlmGateway,
    top_k: usize,
}

impl QaChain {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<SharedIndex>, gateway: LlmGateway) -> Self {
        Self {
            embedder,
            index,
            gateway,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Answer a question about the ingested logs. The model's raw output is
    /// returned as-is; there is no grounding verification and no abstention
    /// when retrieval surfaces nothing useful.
    pub async fn answer(&self, question: &str) -> Result<String, RagError> {
        let mut vectors = self.embedder.embed(&[question.to_string()])?;
        let query_vector = vectors
            .pop()
            .ok_or_else(|| RagError::Embedding("embedder returned no vector".to_string()))?;

        // snapshot: retrieval runs against one complete index version even
        // if an ingestion publishes a replacement mid-flight
        let snapshot = self.index.snapshot();
        let hits = snapshot.search(&query_vector, self.top_k);
        info!(
            question = %question,
            hits = hits.len(),
            top_score = hits.first().map(|h| h.score).unwrap_or(0.0),
            "retrieved context chunks"
        );

        let context = hits
            .iter()
            .map(|hit| hit.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        debug!(context_chars = context.len(), "context assembled");

        let prompt = build_prompt(question, &context);
        Ok(self.gateway.submit(&prompt, None).await)
    }
}

fn build_prompt(question: &str, context: &str) -> String {
    format!(
        "Use the following log excerpts to answer the question. Answer strictly \
         from the provided context; if the context does not contain the answer, \
         say that the logs do not show it.\n\n\
         Log excerpts:\n{context}\n\n\
         Question: {question}"
    )
}
