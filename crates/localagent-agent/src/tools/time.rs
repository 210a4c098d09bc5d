//! Time lookup tool backed by the IANA timezone database (`chrono-tz`).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use super::base::{require_string, ParamSpec, ParamType, Tool, ToolArgs};

const INPUTS: &[ParamSpec] = &[ParamSpec::required(
    "timezone",
    ParamType::String,
    "A string representing a valid timezone (e.g., 'America/New_York').",
)];

/// Render `now` in the named zone.
fn local_time_in(timezone: &str, now: DateTime<Utc>) -> anyhow::Result<String> {
    let tz: Tz = timezone
        .trim()
        .parse()
        .map_err(|e| anyhow::anyhow!("Error fetching time for timezone '{timezone}': {e}"))?;
    let local = now.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S");
    Ok(format!("The current local time in {timezone} is: {local}"))
}

pub struct CurrentTimeTool;

#[async_trait]
impl Tool for CurrentTimeTool {
    fn name(&self) -> &str {
        "get_current_time_in_timezone"
    }

    fn description(&self) -> &str {
        "A tool that fetches the current local time in a specified timezone."
    }

    fn inputs(&self) -> &[ParamSpec] {
        INPUTS
    }

    async fn execute(&self, args: &ToolArgs) -> anyhow::Result<String> {
        let timezone = require_string(args, "timezone")?;
        local_time_in(timezone, Utc::now())
    }
}
