// Weather lookup via the free wttr.in JSON endpoint (no API key needed)

use std::time::Duration;

use serde_json::{Map, Value};
use taskai_core::AgentError;
use tracing::info;

use super::{require_str, ToolContext, ToolOutput};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// wttr.in recommends a curl-ish user agent for scripted access
const USER_AGENT: &str = "curl/7.68.0";

pub(super) async fn get_weather(
    ctx: &ToolContext,
    tool: &str,
    args: &Map<String, Value>,
) -> Result<ToolOutput, AgentError> {
    let city = require_str(args, tool, "city")?;
    info!(city = %city, "weather lookup");

    let url = format!("{}/{}", ctx.weather_base_url, city);
    let response = ctx
        .http
        .get(&url)
        .query(&[("format", "j1")])
        .header("User-Agent", USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .send()
        .await
        .map_err(|e| AgentError::ExternalIo(format!("weather service unreachable: {e}")))?;

    if response.status().as_u16() == 404 {
        return Ok(ToolOutput::Text(format!(
            "City '{city}' not found. Please check the spelling."
        )));
    }
    if !response.status().is_success() {
        return Ok(ToolOutput::Text(format!(
            "Weather service error (Status: {})",
            response.status().as_u16()
        )));
    }

    let data: Value = response
        .json()
        .await
        .map_err(|e| AgentError::ExternalIo(format!("weather response not parseable: {e}")))?;

    match format_report(&data) {
        Some(report) => Ok(ToolOutput::Text(report)),
        None => Ok(ToolOutput::Text(format!(
            "City '{city}' not found or weather data unavailable."
        ))),
    }
}

// Pull the fields we render out of the j1 payload; any missing field means
// the service answered with something other than a weather report.
fn format_report(data: &Value) -> Option<String> {
    let current = data.get("current_condition")?.get(0)?;
    let location = data.get("nearest_area")?.get(0)?;

    let area_name = location.get("areaName")?.get(0)?.get("value")?.as_str()?;
    let country = location.get("country")?.get(0)?.get("value")?.as_str()?;

    let str_field = |key: &str| -> Option<&str> { current.get(key)?.as_str() };
    let temp_c = str_field("temp_C")?;
    let feels_like_c = str_field("FeelsLikeC")?;
    let humidity = str_field("humidity")?;
    let description = current
        .get("weatherDesc")?
        .get(0)?
        .get("value")?
        .as_str()?;
    let wind_speed = str_field("windspeedKmph")?;
    let wind_dir = str_field("winddir16Point")?;
    let pressure = str_field("pressure")?;
    let visibility = str_field("visibility")?;

    Some(format!(
        "Weather in {area_name}, {country}:\n\
         \x20 Temperature: {temp_c}\u{b0}C (feels like {feels_like_c}\u{b0}C)\n\
         \x20 Condition: {description}\n\
         \x20 Humidity: {humidity}%\n\
         \x20 Wind: {wind_speed} km/h {wind_dir}\n\
         \x20 Pressure: {pressure} mb\n\
         \x20 Visibility: {visibility} km"
    ))
}
