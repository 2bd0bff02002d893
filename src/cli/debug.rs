use std::fmt::Write;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    insights::{
        client::{HttpInsightsSource, InsightsSource},
        entities::InsightsData,
        error::FetchError,
    },
    utils::clock::Clock,
};

use super::SourceArgs;

/// Longest printed sample, in characters.
const SAMPLE_LIMIT: usize = 2500;

#[derive(Debug, Parser)]
pub struct DebugCommand {
    #[command(flatten)]
    pub source: SourceArgs,
    #[arg(long, default_value_t = 3, help = "Number of day entries to print")]
    pub samples: usize,
}

/// Makes exactly one request and prints where the interesting values live. Useful when a new
/// account returns its totals under yet another field.
pub async fn process_debug_command(
    DebugCommand { source, samples }: DebugCommand,
    clock: impl Clock,
) -> Result<()> {
    let range = source.range(clock.time());
    let client = HttpInsightsSource::new(source.fetch_config()?)?;

    let response = match client.get_days(&range).await {
        Ok(response) => response,
        Err(FetchError::Status { status, body }) => {
            println!("HTTP ERROR: {status}");
            println!("{body}");
            anyhow::bail!("Request for range '{range}' failed with status {status}");
        }
        Err(e) => return Err(e).context(format!("Request for range '{range}' failed")),
    };

    print!("{}", describe(&response.data, samples)?);
    Ok(())
}

fn display_opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "None".to_string(), |v| v.to_string())
}

/// Human readable summary of a response, followed by the first `samples` day entries.
pub fn describe(data: &InsightsData, samples: usize) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "range: {}", display_opt(data.range.as_ref()))?;
    writeln!(out, "start: {}", display_opt(data.start.as_deref()))?;
    writeln!(out, "end: {}", display_opt(data.end.as_deref()))?;
    writeln!(out, "is_up_to_date: {}", display_opt(data.is_up_to_date))?;
    writeln!(out, "days_count: {}", data.days.len())?;

    for (i, day) in data.days.iter().take(samples).enumerate() {
        let pretty = serde_json::to_string_pretty(day)?;
        writeln!(out, "\n--- day sample {} ---", i + 1)?;
        writeln!(out, "{}", pretty.chars().take(SAMPLE_LIMIT).collect::<String>())?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::insights::entities::InsightsData;

    use super::describe;

    #[test]
    fn describes_payload() -> anyhow::Result<()> {
        let data = InsightsData {
            days: vec![
                json!({"date": "2024-01-01", "total": 1}),
                json!({"date": "2024-01-02", "total": 2}),
            ],
            is_up_to_date: Some(true),
            range: Some(json!("last_year")),
            ..Default::default()
        };

        let text = describe(&data, 1)?;

        assert!(text.contains("range: \"last_year\""));
        assert!(text.contains("start: None"));
        assert!(text.contains("is_up_to_date: true"));
        assert!(text.contains("days_count: 2"));
        assert!(text.contains("--- day sample 1 ---"));
        assert!(!text.contains("--- day sample 2 ---"));
        assert!(text.contains("\"2024-01-01\""));
        Ok(())
    }
}
