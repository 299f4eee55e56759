//! Error taxonomy for the agent pipeline.
//!
//! Internal code branches on these kinds; the conversion to the legacy
//! "always return text" contract happens only at the outward-facing
//! boundaries (LLM gateway and agent entry point), via `user_message`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    // backend unavailable or misconfigured
    #[error("{0}")]
    Configuration(String),

    // the gateway already rendered a backend failure as marker text;
    // carried verbatim, never re-wrapped or re-parsed
    #[error("{0}")]
    Gateway(String),

    // structured model output not parseable
    #[error("could not decode model output: {0}")]
    Decode(String),

    // model selected a tool name the registry does not know
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    // supplied args do not match the capability's expected parameters
    #[error("tool '{tool}': {detail}")]
    ArgumentMismatch { tool: String, detail: String },

    // capability-level network/file failure
    #[error("{0}")]
    ExternalIo(String),

    // LLM call exceeded its deadline
    #[error("call timed out after {0} seconds")]
    Timeout(u64),
}

impl AgentError {
    /// Render the reserved marker text for the legacy text contract.
    /// Callers that must keep the "always text" interface use this at the
    /// single outward boundary instead of string-formatting ad hoc.
    pub fn user_message(&self) -> String {
        match self {
            // already marker text, exactly as the gateway produced it
            AgentError::Gateway(text) => text.clone(),
            AgentError::UnknownTool(name) => format!("Error: Unknown tool: {name}"),
            AgentError::Timeout(secs) => {
                format!("Error: LLM call timed out after {secs} seconds")
            }
            other => format!("Error: {other}"),
        }
    }
}

/// Reserved-marker check: any gateway or dispatcher response starting with
/// one of these fixed prefixes is a failure signal, because the return type
/// alone does not distinguish success from failure.
pub fn is_error_text(text: &str) -> bool {
    text.starts_with("Error calling") || text.starts_with("Error:") || text.starts_with("Error while executing tool")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_tool_marker() {
        let err = AgentError::UnknownTool("launch_rocket".to_string());
        assert_eq!(err.user_message(), "Error: Unknown tool: launch_rocket");
        assert!(is_error_text(&err.user_message()));
    }

    #[test]
    fn test_timeout_marker() {
        let err = AgentError::Timeout(120);
        assert_eq!(
            err.user_message(),
            "Error: LLM call timed out after 120 seconds"
        );
    }

    #[test]
    fn test_gateway_marker_passes_through_unchanged() {
        let err = AgentError::Gateway("Error calling LLM backend: overloaded".to_string());
        assert_eq!(err.user_message(), "Error calling LLM backend: overloaded");
        assert!(is_error_text(&err.user_message()));
    }

    #[test]
    fn test_plain_text_is_not_error() {
        assert!(!is_error_text("The weather in Paris is sunny"));
        assert!(!is_error_text("12"));
        assert!(is_error_text("Error calling LLM backend: boom"));
    }
}
