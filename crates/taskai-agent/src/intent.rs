// Intent resolver - one classification call to the gateway, structured
// output parsed into a ResolvedIntent.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{Map, Value};
use taskai_core::{is_error_text, AgentError, QueryContext, ResolvedIntent};
use taskai_llm::LlmGateway;
use tracing::debug;

use crate::tools::ToolRegistry;

pub struct IntentResolver {
    gateway: LlmGateway,
    registry: Arc<ToolRegistry>,
}

impl IntentResolver {
    pub fn new(gateway: LlmGateway, registry: Arc<ToolRegistry>) -> Self {
        Self { gateway, registry }
    }

    /// Classify one query. A Decode error means the model did not return
    /// usable JSON; the caller decides the fallback (direct answer over the
    /// original query).
    pub async fn resolve(&self, ctx: &QueryContext) -> Result<ResolvedIntent, AgentError> {
        let query = ctx.annotated_query();
        let system = self.system_prompt(ctx.today);

        let output = self.gateway.submit(&query, Some(&system)).await;
        debug!(output = %output, "classification output");

        // a backend failure comes back as marker text, not model output;
        // hand it through instead of trying to parse it as a classification
        if is_error_text(&output) {
            return Err(AgentError::Gateway(output));
        }

        let cleaned = strip_code_fence(&output);
        let parsed: Value = serde_json::from_str(&cleaned)
            .map_err(|e| AgentError::Decode(format!("{e}: {cleaned}")))?;

        let tool = parsed
            .get("tool")
            .ok_or_else(|| AgentError::Decode("output has no 'tool' key".to_string()))?;

        let args: Map<String, Value> = match parsed.get("args") {
            Some(Value::Object(map)) => map.clone(),
            Some(Value::Null) | None => Map::new(),
            Some(other) => {
                return Err(AgentError::Decode(format!(
                    "'args' is not an object: {other}"
                )))
            }
        };

        match tool {
            Value::Null => {
                // no capability applies; answer the query directly
                let query = args
                    .get("query")
                    .and_then(Value::as_str)
                    .unwrap_or(&ctx.query)
                    .to_string();
                Ok(ResolvedIntent::DirectAnswer { query })
            }
            Value::String(name) => Ok(ResolvedIntent::ToolInvocation {
                tool: name.clone(),
                args,
            }),
            other => Err(AgentError::Decode(format!(
                "'tool' is neither a string nor null: {other}"
            ))),
        }
    }

    /// The classification instruction: role, every tool with its textual
    /// parameter schema and examples, and the exact required output shape.
    pub fn system_prompt(&self, today: NaiveDate) -> String {
        let mut prompt = String::from(
            "You are an AI tool-calling assistant. Read the user's query and return a single \
             JSON object in the format: {\"tool\": tool_name, \"args\": arguments}.\n",
        );
        prompt.push_str(&format!(
            "Today is {}. Interpret 'today', 'tomorrow' and all other dates relative to it. \
             Date parameters use YYYY-MM-DD format.\n",
            today.format("%Y-%m-%d")
        ));
        prompt.push_str("Available tools are:\n");
        for cap in self.registry.iter() {
            prompt.push(' ');
            prompt.push_str(cap.prompt_spec());
            prompt.push('\n');
        }
        prompt.push_str(
            "If there is no available tool for the user input, return \
             { \"tool\": null, \"args\": { \"query\": \"...\" } }\n\
             ONLY return a valid JSON object. No explanation, no markdown.",
        );
        prompt
    }
}

/// Remove one leading/trailing fenced-code-block wrapper if present.
/// Models frequently wrap JSON in ``` fences despite instructions not to;
/// this normalization stays out of the JSON parsing itself.
pub fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }

    let mut lines: Vec<&str> = trimmed.lines().collect();
    if let Some(first) = lines.first() {
        if first.starts_with("```") {
            lines.remove(0);
        }
    }
    if let Some(last) = lines.last() {
        if last.trim() == "```" {
            lines.pop();
        }
    }
    lines.join("\n").trim().to_string()
}
