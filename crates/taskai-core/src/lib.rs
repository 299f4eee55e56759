//! Core types for the taskai assistant
//! this crate contains the shared data structures used across all components.

pub mod error;

pub use error::{is_error_text, AgentError};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

// QUERY CONTEXT //

/// Per-request context for one user query.
/// Built at the start of a request and discarded after dispatch.
#[derive(Debug, Clone)]
pub struct QueryContext {
    // the original user text, untouched
    pub query: String,

    // current date, injected so tests can pin it
    pub today: NaiveDate,

    // absolute date extracted from a relative phrase, if any
    pub resolved_date: Option<NaiveDate>,
}

impl QueryContext {
    pub fn new(query: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            query: query.into(),
            today,
            resolved_date: None,
        }
    }

    pub fn with_resolved_date(mut self, date: Option<NaiveDate>) -> Self {
        self.resolved_date = date;
        self
    }

    // Append the resolved date as a parenthetical so the model gets an
    // unambiguous date without re-deriving it from the phrase.
    pub fn annotated_query(&self) -> String {
        match self.resolved_date {
            Some(date) => format!(
                "{} (The resolved date: {})",
                self.query,
                date.format("%Y-%m-%d")
            ),
            None => self.query.clone(),
        }
    }
}

// RESOLVED INTENT //

/// Outcome of intent classification for one query.
/// Either a tool invocation with named arguments, or a direct
/// conversational answer with no tool involved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResolvedIntent {
    ToolInvocation {
        tool: String,
        args: Map<String, Value>,
    },
    DirectAnswer {
        query: String,
    },
}

// LOG CHUNK (for embeddings / vector index) //

/// A bounded slice of one log file plus its embedding vector.
/// `start`/`end` are byte offsets into the source file, so the chunk text
/// always equals `source_text[start..end]`.
/// All chunks in one index share embedding dimension and L2 normalization,
/// which makes cosine similarity a plain dot product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogChunk {
    pub id: Uuid,
    pub source: String,
    pub start: usize,
    pub end: usize,
    pub text: String,
    pub embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotated_query() {
        let today = NaiveDate::from_ymd_opt(2025, 8, 4).unwrap();
        let ctx = QueryContext::new("show events for tomorrow", today)
            .with_resolved_date(NaiveDate::from_ymd_opt(2025, 8, 5));

        assert_eq!(
            ctx.annotated_query(),
            "show events for tomorrow (The resolved date: 2025-08-05)"
        );
    }

    #[test]
    fn test_annotated_query_without_date() {
        let today = NaiveDate::from_ymd_opt(2025, 8, 4).unwrap();
        let ctx = QueryContext::new("what is 2+2", today);

        assert_eq!(ctx.annotated_query(), "what is 2+2");
    }
}
