// Hosted messages-API backend
// HTTP client for an Anthropic-style /v1/messages endpoint

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{LlmBackend, LlmError};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Clone)]
pub struct ApiBackend {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message<'a>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolDefinition]>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

/// Tool definition in the wire format the messages API expects.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,

    #[serde(default)]
    stop_reason: Option<String>,
}

// content blocks come back as either plain text or a tool-use directive
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    #[serde(other)]
    Other,
}

/// A tool call the model asked for instead of answering in text.
#[derive(Debug, Clone)]
pub struct ToolUseCall {
    pub id: String,
    pub name: String,
    pub input: Value,
}

/// What a messages-API call produced: free text, or tool-use directives
/// (when the stop reason says the model wants a tool).
#[derive(Debug, Clone)]
pub enum ApiReply {
    Text(String),
    ToolUse(Vec<ToolUseCall>),
}

impl ApiBackend {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Create from env ANTHROPIC_API_KEY
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
            LlmError::Configuration("ANTHROPIC_API_KEY is not set".to_string())
        })?;
        Ok(Self::new(api_key, DEFAULT_MODEL))
    }

    // override the endpoint (used against local test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// One messages-API call, optionally with tool definitions attached.
    pub async fn send(
        &self,
        prompt: &str,
        system: Option<&str>,
        tools: Option<&[ToolDefinition]>,
    ) -> Result<ApiReply, LlmError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            system,
            tools,
        };

        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(error_text));
        }

        let result: MessagesResponse = response.json().await?;
        debug!(stop_reason = ?result.stop_reason, "messages API reply");

        // the stop reason decides whether this is a tool call or free text
        if result.stop_reason.as_deref() == Some("tool_use") {
            let calls: Vec<ToolUseCall> = result
                .content
                .into_iter()
                .filter_map(|block| match block {
                    ContentBlock::ToolUse { id, name, input } => {
                        Some(ToolUseCall { id, name, input })
                    }
                    _ => None,
                })
                .collect();
            return Ok(ApiReply::ToolUse(calls));
        }

        let text: String = result
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");

        Ok(ApiReply::Text(text))
    }
}

#[async_trait]
impl LlmBackend for ApiBackend {
    async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, LlmError> {
        match self.send(prompt, system, None).await? {
            ApiReply::Text(text) => Ok(text),
            // without tool definitions the model cannot legitimately stop on
            // tool_use; treat it as a protocol error rather than guessing
            ApiReply::ToolUse(_) => Err(LlmError::Api(
                "unexpected tool_use reply without tool definitions".to_string(),
            )),
        }
    }

    fn provider(&self) -> &str {
        "api"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ApiBackend::new("test-key", "claude-3-5-sonnet-20241022");
        assert_eq!(client.model(), "claude-3-5-sonnet-20241022");
        assert_eq!(client.provider(), "api");
    }

    #[test]
    fn test_content_block_parsing() {
        let raw = r#"{
            "content": [
                {"type": "text", "text": "Hello "},
                {"type": "text", "text": "world"}
            ],
            "stop_reason": "end_turn"
        }"#;
        let parsed: MessagesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.content.len(), 2);
        assert_eq!(parsed.stop_reason.as_deref(), Some("end_turn"));
    }

    #[test]
    fn test_tool_use_block_parsing() {
        let raw = r#"{
            "content": [
                {"type": "tool_use", "id": "tu_1", "name": "get_weather", "input": {"city": "Paris"}}
            ],
            "stop_reason": "tool_use"
        }"#;
        let parsed: MessagesResponse = serde_json::from_str(raw).unwrap();
        match &parsed.content[0] {
            ContentBlock::ToolUse { name, input, .. } => {
                assert_eq!(name, "get_weather");
                assert_eq!(input["city"], "Paris");
            }
            other => panic!("expected tool_use block, got {other:?}"),
        }
    }
}
