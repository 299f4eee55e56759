// Dispatcher - validates and executes a resolved intent against the
// registry, or answers directly through the gateway. Always returns text;
// failures come back with the reserved marker prefixes.

use std::sync::Arc;

use taskai_core::{AgentError, ResolvedIntent};
use tracing::{error, info, warn};

use crate::tools::{ToolContext, ToolRegistry};

pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    ctx: ToolContext,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>, ctx: ToolContext) -> Self {
        Self { registry, ctx }
    }

    pub async fn dispatch(&self, intent: ResolvedIntent) -> String {
        match intent {
            ResolvedIntent::ToolInvocation { tool, args } => {
                let Some(cap) = self.registry.get(&tool) else {
                    warn!(tool = %tool, "model selected a tool the registry does not know");
                    return AgentError::UnknownTool(tool).user_message();
                };

                match cap.execute(&self.ctx, &args).await {
                    Ok(output) => {
                        info!(tool = %tool, "tool executed");
                        output.render()
                    }
                    Err(e) => {
                        error!(tool = %tool, error = %e, "tool execution failed");
                        format!("Error while executing tool {tool}: {e}")
                    }
                }
            }
            ResolvedIntent::DirectAnswer { query } => {
                info!("no tool selected, answering directly");
                self.ctx.gateway.submit(&query, None).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedBackend;
    use serde_json::json;
    use taskai_core::is_error_text;

    fn dispatcher(backend: &std::sync::Arc<ScriptedBackend>) -> Dispatcher {
        Dispatcher::new(
            Arc::new(ToolRegistry::new()),
            ToolContext::new(backend.gateway()),
        )
    }

    fn invocation(tool: &str, args: serde_json::Value) -> ResolvedIntent {
        ResolvedIntent::ToolInvocation {
            tool: tool.to_string(),
            args: args.as_object().unwrap().clone(),
        }
    }

    #[tokio::test]
    async fn test_addition_scenario() {
        let backend = ScriptedBackend::new(&[]);
        let reply = dispatcher(&backend)
            .dispatch(invocation("add_numbers", json!({ "numbers": [5, 7] })))
            .await;
        assert_eq!(reply, "12");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_marker_text_not_panic() {
        let backend = ScriptedBackend::new(&[]);
        let reply = dispatcher(&backend)
            .dispatch(invocation("launch_rocket", json!({})))
            .await;
        assert_eq!(reply, "Error: Unknown tool: launch_rocket");
        assert!(is_error_text(&reply));
    }

    #[tokio::test]
    async fn test_argument_mismatch_is_caught() {
        let backend = ScriptedBackend::new(&[]);
        let reply = dispatcher(&backend)
            .dispatch(invocation("add_numbers", json!({ "values": [1, 2] })))
            .await;
        assert!(reply.starts_with("Error while executing tool add_numbers:"));
        assert!(is_error_text(&reply));
    }

    #[tokio::test]
    async fn test_direct_answer_goes_through_gateway_verbatim() {
        let backend = ScriptedBackend::new(&["Here is a joke."]);
        let reply = dispatcher(&backend)
            .dispatch(ResolvedIntent::DirectAnswer {
                query: "tell me a joke".to_string(),
            })
            .await;
        assert_eq!(reply, "Here is a joke.");

        let prompts = backend.prompts.lock().unwrap();
        assert_eq!(prompts[0], "tell me a joke");
    }

    #[tokio::test]
    async fn test_schedule_meeting_scenario() {
        let backend = ScriptedBackend::new(&[]);
        let reply = dispatcher(&backend)
            .dispatch(invocation(
                "schedule_meeting",
                json!({
                    "title": "Sync",
                    "start_time": "2025-08-10T10:00:00",
                    "end_time": "2025-08-10T11:00:00"
                }),
            ))
            .await;
        let value: serde_json::Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(value["tool_name"], "schedule_meeting");
        assert_eq!(value["parameters"]["title"], "Sync");
        assert_eq!(value["parameters"]["start_time"], "2025-08-10T10:00:00");
        assert_eq!(value["parameters"]["end_time"], "2025-08-10T11:00:00");
    }
}
