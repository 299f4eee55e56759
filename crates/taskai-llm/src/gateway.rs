// LLM gateway - the single boundary where typed backend errors become
// in-band marker text, so every caller gets *some* text back.

use std::sync::Arc;

use tracing::error;

use crate::{LlmBackend, LlmError};

/// Uniform submit(prompt, system) -> text over any backend.
/// Failures never raise past this point; they come back as text carrying a
/// reserved marker prefix (see taskai_core::is_error_text).
#[derive(Clone)]
pub struct LlmGateway {
    backend: Arc<dyn LlmBackend>,
}

impl LlmGateway {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self { backend }
    }

    pub fn provider(&self) -> String {
        self.backend.provider().to_string()
    }

    pub fn model(&self) -> String {
        self.backend.model().to_string()
    }

    /// Submit a prompt; always returns text.
    pub async fn submit(&self, prompt: &str, system: Option<&str>) -> String {
        match self.backend.generate(prompt, system).await {
            Ok(text) => text,
            Err(LlmError::Configuration(msg)) => {
                error!(provider = %self.backend.provider(), "LLM backend misconfigured: {msg}");
                format!("Error: {msg}")
            }
            Err(LlmError::Timeout(secs)) => {
                error!(provider = %self.backend.provider(), "LLM call timed out after {secs}s");
                format!("Error: LLM call timed out after {secs} seconds")
            }
            Err(e) => {
                error!(provider = %self.backend.provider(), "LLM call failed: {e}");
                format!("Error calling LLM backend: {e}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use taskai_core::is_error_text;

    struct FailingBackend(LlmError);

    #[async_trait]
    impl LlmBackend for FailingBackend {
        async fn generate(&self, _prompt: &str, _system: Option<&str>) -> Result<String, LlmError> {
            Err(match &self.0 {
                LlmError::Configuration(m) => LlmError::Configuration(m.clone()),
                LlmError::Timeout(s) => LlmError::Timeout(*s),
                LlmError::Api(m) => LlmError::Api(m.clone()),
                _ => LlmError::Api("unexpected".to_string()),
            })
        }

        fn provider(&self) -> &str {
            "test"
        }

        fn model(&self) -> &str {
            "test-model"
        }
    }

    struct EchoBackend;

    #[async_trait]
    impl LlmBackend for EchoBackend {
        async fn generate(&self, prompt: &str, _system: Option<&str>) -> Result<String, LlmError> {
            Ok(prompt.to_string())
        }

        fn provider(&self) -> &str {
            "test"
        }

        fn model(&self) -> &str {
            "echo"
        }
    }

    #[tokio::test]
    async fn test_success_passes_text_through() {
        let gateway = LlmGateway::new(Arc::new(EchoBackend));
        assert_eq!(gateway.submit("hello", None).await, "hello");
    }

    #[tokio::test]
    async fn test_configuration_error_becomes_marker_text() {
        let gateway = LlmGateway::new(Arc::new(FailingBackend(LlmError::Configuration(
            "command 'claude' not found. Make sure it's installed and in PATH.".to_string(),
        ))));
        let reply = gateway.submit("hello", None).await;
        assert!(reply.starts_with("Error: command 'claude' not found"));
        assert!(is_error_text(&reply));
    }

    #[tokio::test]
    async fn test_timeout_becomes_marker_text() {
        let gateway = LlmGateway::new(Arc::new(FailingBackend(LlmError::Timeout(120))));
        let reply = gateway.submit("hello", None).await;
        assert_eq!(reply, "Error: LLM call timed out after 120 seconds");
    }

    #[tokio::test]
    async fn test_api_error_becomes_generic_marker_text() {
        let gateway = LlmGateway::new(Arc::new(FailingBackend(LlmError::Api(
            "overloaded".to_string(),
        ))));
        let reply = gateway.submit("hello", None).await;
        assert!(reply.starts_with("Error calling LLM backend:"));
        assert!(is_error_text(&reply));
    }
}
