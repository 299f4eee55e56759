// Tool registry and capabilities
//
// The capability set is a closed enum instead of the usual name -> function
// map of dynamic registries, so a capability without a parameter list or a
// prompt description cannot compile. The registry is still an explicit map
// built once at startup and looked up by the name the model returns.

mod document;
mod math;
mod office;
mod weather;

use std::collections::HashMap;

use serde_json::{Map, Value};
use taskai_core::AgentError;
use taskai_llm::LlmGateway;

pub const DEFAULT_WEATHER_BASE_URL: &str = "https://wttr.in";

/// Shared handles a capability may need while executing.
pub struct ToolContext {
    pub gateway: LlmGateway,
    pub http: reqwest::Client,
    pub weather_base_url: String,
}

impl ToolContext {
    pub fn new(gateway: LlmGateway) -> Self {
        Self {
            gateway,
            http: reqwest::Client::new(),
            weather_base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
        }
    }

    pub fn with_weather_base_url(mut self, url: impl Into<String>) -> Self {
        self.weather_base_url = url.into();
        self
    }
}

/// What a capability produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    Text(String),
    Number(f64),
    Json(Value),
}

impl ToolOutput {
    /// Render for the user-facing text contract.
    pub fn render(&self) -> String {
        match self {
            ToolOutput::Text(text) => text.clone(),
            ToolOutput::Number(n) => {
                // whole results print as integers: 5 + 7 -> "12", not "12.0"
                if n.fract() == 0.0 && n.is_finite() {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
            ToolOutput::Json(value) => value.to_string(),
        }
    }
}

/// The closed set of locally callable capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    AddNumbers,
    Subtract,
    Multiply,
    Divide,
    GetWeather,
    AnalyzeDocument,
    SummarizeEmail,
    EmailAgent,
    MarkEmail,
    GetEventsByDate,
    ScheduleMeeting,
}

impl Capability {
    pub const ALL: [Capability; 11] = [
        Capability::AddNumbers,
        Capability::Subtract,
        Capability::Multiply,
        Capability::Divide,
        Capability::GetWeather,
        Capability::AnalyzeDocument,
        Capability::SummarizeEmail,
        Capability::EmailAgent,
        Capability::MarkEmail,
        Capability::GetEventsByDate,
        Capability::ScheduleMeeting,
    ];

    /// Tool name as the model must spell it.
    pub fn name(&self) -> &'static str {
        match self {
            Capability::AddNumbers => "add_numbers",
            Capability::Subtract => "subtract",
            Capability::Multiply => "multiply",
            Capability::Divide => "divide",
            Capability::GetWeather => "get_weather",
            Capability::AnalyzeDocument => "analyze_document",
            Capability::SummarizeEmail => "summarize_email",
            Capability::EmailAgent => "email_agent",
            Capability::MarkEmail => "mark_email",
            Capability::GetEventsByDate => "get_events_by_date",
            Capability::ScheduleMeeting => "schedule_meeting",
        }
    }

    /// Ordered required parameter names. This list is what the prompt
    /// schema is rendered from; it is the only schema there is.
    pub fn params(&self) -> &'static [&'static str] {
        match self {
            Capability::AddNumbers | Capability::Multiply => &["numbers"],
            Capability::Subtract | Capability::Divide => &["a", "b"],
            Capability::GetWeather => &["city"],
            Capability::AnalyzeDocument => &["path"],
            Capability::SummarizeEmail => &["subject"],
            Capability::EmailAgent => &["query"],
            Capability::MarkEmail => &["mail_sub", "mark_as_read"],
            Capability::GetEventsByDate => &["date"],
            Capability::ScheduleMeeting => &["title", "start_time", "end_time"],
        }
    }

    /// One prompt line per tool: signature, behavior, usage examples.
    /// This text *is* the argument schema the model sees.
    pub fn prompt_spec(&self) -> &'static str {
        match self {
            Capability::AddNumbers => {
                "add_numbers(numbers: list of numbers) : returns the result of addition. \
                 Example - 'What is 5 + 7?' means numbers = [5, 7]."
            }
            Capability::Subtract => {
                "subtract(a: number, b: number) : returns the result of subtraction."
            }
            Capability::Multiply => {
                "multiply(numbers: list of numbers) : returns the result of multiplication."
            }
            Capability::Divide => {
                "divide(a: number, b: number) : returns the result of division."
            }
            Capability::GetWeather => {
                "get_weather(city: string) : returns the current weather of the city passed as a parameter."
            }
            Capability::AnalyzeDocument => {
                "analyze_document(path: string) : analyzes or summarizes a text document from the specified file path."
            }
            Capability::SummarizeEmail => {
                "summarize_email(subject: string) : summarizes the email with a particular subject. \
                 Call this only when the user asks for an email summary, e.g. \
                 \"Summarize the email with subject 'quarterly report'\"."
            }
            Capability::EmailAgent => {
                "email_agent(query: string) : sends an email to the mentioned recipient with subject and body. \
                 The query must look like: send email to [recipient] subject [subject] body [message]."
            }
            Capability::MarkEmail => {
                "mark_email(mail_sub: string, mark_as_read: boolean) : marks the email with that subject \
                 as read or unread. Example - \"Mark the email with subject 'company highlights' as read\"."
            }
            Capability::GetEventsByDate => {
                "get_events_by_date(date: string) : returns the calendar events for a date. \
                 The date parameter must be in YYYY-MM-DD format. If a resolved date is mentioned in \
                 parentheses like (The resolved date: 2025-08-09), use it as the 'date' parameter. \
                 Example - 'Show the events for August 10', 'list the events for today', \
                 'Display meetings for next Friday'."
            }
            Capability::ScheduleMeeting => {
                "schedule_meeting(title: string, start_time: string, end_time: string, \
                 attendees: list of strings (optional), gmeet: boolean (optional)) : schedules a meeting. \
                 start_time and end_time must be ISO timestamps. \
                 Example 1 - 'Set up a meeting called Project Update on 10 July from 10 AM to 11 AM' means \
                 title = \"Project Update\", start_time = \"2025-07-10T10:00:00\", end_time = \"2025-07-10T11:00:00\". \
                 Example 2 - 'Schedule a meeting called team sync on August 31st from 3 PM to 4 PM with \
                 attendees alice@example.com and bob@example.com including Meeting link' means \
                 title = \"team sync\", start_time = \"2025-08-31T15:00:00\", end_time = \"2025-08-31T16:00:00\", \
                 attendees = [\"alice@example.com\", \"bob@example.com\"], gmeet = true."
            }
        }
    }

    /// Run the capability with the model-supplied args.
    /// Extra keys are ignored; missing or wrongly-typed required keys
    /// surface as ArgumentMismatch.
    pub async fn execute(
        &self,
        ctx: &ToolContext,
        args: &Map<String, Value>,
    ) -> Result<ToolOutput, AgentError> {
        match self {
            Capability::AddNumbers => math::add_numbers(self.name(), args),
            Capability::Subtract => math::subtract(self.name(), args),
            Capability::Multiply => math::multiply(self.name(), args),
            Capability::Divide => math::divide(self.name(), args),
            Capability::GetWeather => weather::get_weather(ctx, self.name(), args).await,
            Capability::AnalyzeDocument => document::analyze_document(ctx, self.name(), args).await,
            Capability::SummarizeEmail => office::summarize_email(self.name(), args),
            Capability::EmailAgent => office::email_agent(self.name(), args),
            Capability::MarkEmail => office::mark_email(self.name(), args),
            Capability::GetEventsByDate => office::get_events_by_date(self.name(), args),
            Capability::ScheduleMeeting => office::schedule_meeting(self.name(), args),
        }
    }
}

/// Static name -> capability mapping, built once at startup and shared
/// read-only across requests.
#[derive(Debug)]
pub struct ToolRegistry {
    tools: HashMap<&'static str, Capability>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        let tools = Capability::ALL
            .iter()
            .map(|cap| (cap.name(), *cap))
            .collect();
        Self { tools }
    }

    pub fn get(&self, name: &str) -> Option<Capability> {
        self.tools.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.iter().copied()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// argument extraction helpers, shared by all capabilities

pub(crate) fn require_str<'a>(
    args: &'a Map<String, Value>,
    tool: &str,
    key: &str,
) -> Result<&'a str, AgentError> {
    args.get(key).and_then(Value::as_str).ok_or_else(|| {
        AgentError::ArgumentMismatch {
            tool: tool.to_string(),
            detail: format!("missing or non-string argument '{key}'"),
        }
    })
}

pub(crate) fn require_f64(
    args: &Map<String, Value>,
    tool: &str,
    key: &str,
) -> Result<f64, AgentError> {
    args.get(key).and_then(Value::as_f64).ok_or_else(|| {
        AgentError::ArgumentMismatch {
            tool: tool.to_string(),
            detail: format!("missing or non-numeric argument '{key}'"),
        }
    })
}

pub(crate) fn require_bool(
    args: &Map<String, Value>,
    tool: &str,
    key: &str,
) -> Result<bool, AgentError> {
    args.get(key).and_then(Value::as_bool).ok_or_else(|| {
        AgentError::ArgumentMismatch {
            tool: tool.to_string(),
            detail: format!("missing or non-boolean argument '{key}'"),
        }
    })
}

pub(crate) fn require_numbers(
    args: &Map<String, Value>,
    tool: &str,
    key: &str,
) -> Result<Vec<f64>, AgentError> {
    let list = args.get(key).and_then(Value::as_array).ok_or_else(|| {
        AgentError::ArgumentMismatch {
            tool: tool.to_string(),
            detail: format!("missing or non-list argument '{key}'"),
        }
    })?;
    list.iter()
        .map(|v| {
            v.as_f64().ok_or_else(|| AgentError::ArgumentMismatch {
                tool: tool.to_string(),
                detail: format!("argument '{key}' contains a non-numeric element"),
            })
        })
        .collect()
}

pub(crate) fn optional_str_list(args: &Map<String, Value>, key: &str) -> Vec<String> {
    args.get(key)
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(Value::as_str)
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn optional_bool(args: &Map<String, Value>, key: &str) -> bool {
    args.get(key).and_then(Value::as_bool).unwrap_or(false)
}
