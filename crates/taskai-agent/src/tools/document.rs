// Document summarization - reads a local plain-text file and asks the
// model for a summary. Other formats would come from an extraction
// collaborator; only .txt is handled locally.

use std::path::Path;

use serde_json::{Map, Value};
use taskai_core::AgentError;
use tokio::fs;
use tracing::info;

use super::{require_str, ToolContext, ToolOutput};

// keep the excerpt comfortably inside the model's context budget
const MAX_DOCUMENT_CHARS: usize = 4000;

pub(super) async fn analyze_document(
    ctx: &ToolContext,
    tool: &str,
    args: &Map<String, Value>,
) -> Result<ToolOutput, AgentError> {
    let path_arg = require_str(args, tool, "path")?;
    let path = Path::new(path_arg);

    if !path.exists() {
        return Ok(ToolOutput::Text(format!("File not found: {path_arg}")));
    }

    let is_txt = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("txt"))
        .unwrap_or(false);
    if !is_txt {
        return Ok(ToolOutput::Text(
            "Unsupported file type. Only .txt documents are supported.".to_string(),
        ));
    }

    let text = fs::read_to_string(path)
        .await
        .map_err(|e| AgentError::ExternalIo(format!("could not read '{path_arg}': {e}")))?;

    let excerpt: String = text.chars().take(MAX_DOCUMENT_CHARS).collect();
    info!(path = %path_arg, chars = excerpt.chars().count(), "sending document for summarization");

    let prompt = format!(
        "Please summarize or analyze the following document content:\n{excerpt}"
    );
    let response = ctx.gateway.submit(&prompt, None).await;
    Ok(ToolOutput::Text(response.trim().to_string()))
}
