//! LLM gateway for taskai
//!
//! One uniform `submit(prompt, system) -> text` call over interchangeable
//! backends: the hosted messages API or a local CLI subprocess. Callers are
//! backend-agnostic; swapping the backend never changes the caller contract.

pub mod api_client;
pub mod cli_client;
pub mod gateway;

pub use api_client::{ApiBackend, ApiReply, ToolDefinition, ToolUseCall};
pub use cli_client::CliBackend;
pub use gateway::LlmGateway;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("backend returned error: {0}")]
    Api(String),

    #[error("{0}")]
    Configuration(String),

    #[error("call timed out after {0} seconds")]
    Timeout(u64),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A language-model backend. Implementations hide how the prompt reaches
/// the model (HTTP, subprocess) behind one generate call.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, LlmError>;

    fn provider(&self) -> &str;

    fn model(&self) -> &str;
}
