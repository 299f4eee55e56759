// Email and calendar capabilities
//
// The mail/calendar provider protocols live outside this core; these
// capabilities honor the registry's parameter contract and hand back the
// provider request as structured JSON for the hosting service to execute.

use regex::Regex;
use serde_json::{json, Map, Value};
use taskai_core::AgentError;
use tracing::info;

use super::{optional_bool, optional_str_list, require_bool, require_str, ToolOutput};

pub(super) fn summarize_email(
    tool: &str,
    args: &Map<String, Value>,
) -> Result<ToolOutput, AgentError> {
    let subject = require_str(args, tool, "subject")?;
    Ok(ToolOutput::Json(json!({
        "tool_name": "summarize_email",
        "parameters": { "subject": subject }
    })))
}

pub(super) fn email_agent(tool: &str, args: &Map<String, Value>) -> Result<ToolOutput, AgentError> {
    let query = require_str(args, tool, "query")?;

    // non-greedy recipient so "subject" isn't swallowed into the address
    let pattern =
        Regex::new(r"(?i)^send email to (?P<to>.+?) subject (?P<subject>.+) body (?P<body>.+)$")
            .unwrap();
    let Some(caps) = pattern.captures(query.trim()) else {
        return Ok(ToolOutput::Text(
            "Could not parse the email format. Use: send email to [recipient] subject [subject] body [message].".to_string(),
        ));
    };

    let to = caps["to"].trim();
    let subject = caps["subject"].trim();
    let body = caps["body"].trim();
    info!(to = %to, subject = %subject, "email request parsed");

    Ok(ToolOutput::Json(json!({
        "tool_name": "send_email",
        "parameters": { "to": to, "subject": subject, "body": body }
    })))
}

pub(super) fn mark_email(tool: &str, args: &Map<String, Value>) -> Result<ToolOutput, AgentError> {
    let mail_sub = require_str(args, tool, "mail_sub")?;
    let mark_as_read = require_bool(args, tool, "mark_as_read")?;
    Ok(ToolOutput::Json(json!({
        "tool_name": "mark_email",
        "parameters": { "mail_sub": mail_sub, "mark_as_read": mark_as_read }
    })))
}

pub(super) fn get_events_by_date(
    tool: &str,
    args: &Map<String, Value>,
) -> Result<ToolOutput, AgentError> {
    let date = require_str(args, tool, "date")?;
    Ok(ToolOutput::Json(json!({
        "tool_name": "get_calendar_events",
        "parameters": { "date": date }
    })))
}

pub(super) fn schedule_meeting(
    tool: &str,
    args: &Map<String, Value>,
) -> Result<ToolOutput, AgentError> {
    let title = require_str(args, tool, "title")?;
    let start_time = require_str(args, tool, "start_time")?;
    let end_time = require_str(args, tool, "end_time")?;
    let attendees = optional_str_list(args, "attendees");
    let gmeet = optional_bool(args, "gmeet");

    info!(title = %title, start = %start_time, end = %end_time, "meeting request built");

    Ok(ToolOutput::Json(json!({
        "tool_name": "schedule_meeting",
        "parameters": {
            "title": title,
            "start_time": start_time,
            "end_time": end_time,
            "attendees": attendees,
            "create_meet_link": gmeet
        }
    })))
}
