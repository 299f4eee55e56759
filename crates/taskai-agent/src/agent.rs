// Top-level agent pipeline: date resolution -> intent resolution ->
// dispatch, with the chat-mode fallback when structured parsing fails.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use taskai_core::{AgentError, QueryContext};
use taskai_llm::LlmGateway;
use tracing::{info, warn};

use crate::dates::resolve_relative_dates;
use crate::dispatch::Dispatcher;
use crate::intent::IntentResolver;
use crate::tools::{ToolContext, ToolRegistry};

pub struct Agent {
    gateway: LlmGateway,
    resolver: IntentResolver,
    dispatcher: Dispatcher,
}

impl Agent {
    pub fn new(gateway: LlmGateway) -> Self {
        Self::with_tool_context(gateway.clone(), ToolContext::new(gateway))
    }

    // split out so tests can redirect the weather endpoint etc.
    pub fn with_tool_context(gateway: LlmGateway, ctx: ToolContext) -> Self {
        let registry = Arc::new(ToolRegistry::new());
        let resolver = IntentResolver::new(gateway.clone(), registry.clone());
        let dispatcher = Dispatcher::new(registry, ctx);
        Self {
            gateway,
            resolver,
            dispatcher,
        }
    }

    /// Public entry point: one query in, always some text out.
    pub async fn process(&self, user_query: &str) -> String {
        self.process_at(user_query, Local::now().date_naive()).await
    }

    /// Same pipeline with a pinned "today", for deterministic tests.
    pub async fn process_at(&self, user_query: &str, today: NaiveDate) -> String {
        let resolved = resolve_relative_dates(user_query, today);
        if let Some(date) = resolved {
            info!(resolved = %date, "relative date resolved");
        }

        let ctx = QueryContext::new(user_query, today).with_resolved_date(resolved);

        match self.resolver.resolve(&ctx).await {
            Ok(intent) => self.dispatcher.dispatch(intent).await,
            Err(AgentError::Decode(detail)) => {
                // no retry of the structured call; one direct answer over
                // the original query, flagged as a fallback
                warn!(detail = %detail, "invalid structured output, falling back to chat mode");
                let answer = self.gateway.submit(&ctx.query, None).await;
                format!("Invalid JSON from model. Falling back to chat mode:\n{answer}")
            }
            Err(e) => e.user_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedBackend;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 4).unwrap()
    }

    #[tokio::test]
    async fn test_end_to_end_addition() {
        let backend =
            ScriptedBackend::new(&[r#"{"tool": "add_numbers", "args": {"numbers": [5, 7]}}"#]);
        let agent = Agent::new(backend.gateway());
        assert_eq!(agent.process_at("What is 5 + 7?", today()).await, "12");
    }

    #[tokio::test]
    async fn test_fallback_uses_original_query() {
        // first reply: unparseable classification; second: the fallback chat
        let backend = ScriptedBackend::new(&["sure thing!", "a direct answer"]);
        let agent = Agent::new(backend.gateway());

        let reply = agent
            .process_at("show my events for tomorrow", today())
            .await;
        assert_eq!(
            reply,
            "Invalid JSON from model. Falling back to chat mode:\na direct answer"
        );

        // the classification call saw the annotated query, the fallback must
        // see the original one
        let prompts = backend.prompts.lock().unwrap();
        assert!(prompts[0].contains("(The resolved date: 2025-08-05)"));
        assert_eq!(prompts[1], "show my events for tomorrow");
    }

    #[tokio::test]
    async fn test_backend_failure_passes_through_without_fallback() {
        // the gateway turns a timed-out backend into marker text; the
        // pipeline must hand that text through, not treat it as bad JSON
        // and burn a second call on a doomed fallback
        let backend = ScriptedBackend::new(&["Error: LLM call timed out after 120 seconds"]);
        let agent = Agent::new(backend.gateway());

        let reply = agent.process_at("What is 5 + 7?", today()).await;
        assert_eq!(reply, "Error: LLM call timed out after 120 seconds");
        assert_eq!(backend.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_tool_end_to_end() {
        let backend = ScriptedBackend::new(&[r#"{"tool": "launch_rocket", "args": {}}"#]);
        let agent = Agent::new(backend.gateway());
        assert_eq!(
            agent.process_at("fire the rocket", today()).await,
            "Error: Unknown tool: launch_rocket"
        );
    }

    #[tokio::test]
    async fn test_calendar_query_gets_resolved_date() {
        let backend = ScriptedBackend::new(
            &[r#"{"tool": "get_events_by_date", "args": {"date": "2025-08-08"}}"#],
        );
        let agent = Agent::new(backend.gateway());

        let reply = agent
            .process_at("Display meetings for next Friday", today())
            .await;
        let value: serde_json::Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(value["tool_name"], "get_calendar_events");
        assert_eq!(value["parameters"]["date"], "2025-08-08");

        // the annotation gave the model the absolute date to echo back
        let prompts = backend.prompts.lock().unwrap();
        assert!(prompts[0].contains("(The resolved date: 2025-08-08)"));
    }
}
