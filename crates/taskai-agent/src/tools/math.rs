// Arithmetic capabilities

use serde_json::{Map, Value};
use taskai_core::AgentError;

use super::{require_f64, require_numbers, ToolOutput};

pub(super) fn add_numbers(
    tool: &str,
    args: &Map<String, Value>,
) -> Result<ToolOutput, AgentError> {
    let numbers = require_numbers(args, tool, "numbers")?;
    Ok(ToolOutput::Number(numbers.iter().sum()))
}

pub(super) fn subtract(tool: &str, args: &Map<String, Value>) -> Result<ToolOutput, AgentError> {
    let a = require_f64(args, tool, "a")?;
    let b = require_f64(args, tool, "b")?;
    Ok(ToolOutput::Number(a - b))
}

pub(super) fn multiply(tool: &str, args: &Map<String, Value>) -> Result<ToolOutput, AgentError> {
    let numbers = require_numbers(args, tool, "numbers")?;
    Ok(ToolOutput::Number(numbers.iter().product()))
}

pub(super) fn divide(tool: &str, args: &Map<String, Value>) -> Result<ToolOutput, AgentError> {
    let a = require_f64(args, tool, "a")?;
    let b = require_f64(args, tool, "b")?;
    if b == 0.0 {
        // in-band result, matching the legacy behavior; not a dispatch failure
        return Ok(ToolOutput::Text("Error: Division by zero".to_string()));
    }
    Ok(ToolOutput::Number(a / b))
}
