//! Intent resolution and dispatch for taskai
//!
//! Pipeline: query -> date resolution -> intent resolver (one classification
//! call to the LLM gateway) -> dispatcher (run the capability, or answer
//! directly). At most one extra fallback LLM call per request.

pub mod agent;
pub mod dates;
pub mod dispatch;
pub mod intent;
pub mod tools;

pub use agent::Agent;
pub use dates::resolve_relative_dates;
pub use dispatch::Dispatcher;
pub use intent::IntentResolver;
pub use tools::{Capability, ToolContext, ToolOutput, ToolRegistry};

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use taskai_llm::{LlmBackend, LlmError, LlmGateway};

    /// Scripted backend: pops one canned reply per generate call and records
    /// the prompts it saw, so tests can assert on both directions.
    pub struct ScriptedBackend {
        replies: Mutex<VecDeque<String>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        pub fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().map(|s| s.to_string()).collect()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        pub fn gateway(self: &Arc<Self>) -> LlmGateway {
            LlmGateway::new(self.clone())
        }
    }

    #[async_trait]
    impl LlmBackend for ScriptedBackend {
        async fn generate(&self, prompt: &str, _system: Option<&str>) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| "no scripted reply left".to_string()))
        }

        fn provider(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }
}
