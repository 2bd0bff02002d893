use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing::{info, warn};

use crate::{
    insights::{
        client::HttpInsightsSource,
        entities::InsightsData,
        fetcher::{Fetcher, RetryPolicy, DEFAULT_MAX_TRIES, DEFAULT_RETRY_DELAY},
        parser::{parse_days, ActivitySeries},
    },
    level::{LevelStrategy, Leveler},
    render::{grid::CalendarGrid, svg::Heatmap, write_heatmap},
    utils::{clock::Clock, time::parse_day},
};

use super::SourceArgs;

#[derive(Debug, Parser)]
pub struct RenderCommand {
    #[command(flatten)]
    pub source: SourceArgs,
    #[arg(
        long,
        env = "OUT_PATH",
        help = "Output SVG file. Defaults to assets/waka-heatmap-<range>.svg"
    )]
    pub out: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = LevelStrategy::Log, help = "How seconds are mapped onto intensity levels")]
    pub strategy: LevelStrategy,
    #[arg(long = "max-tries", default_value_t = DEFAULT_MAX_TRIES, help = "Attempts while the server reports stale data or fails transiently")]
    pub max_tries: u32,
    #[arg(long = "retry-delay", default_value_t = DEFAULT_RETRY_DELAY.as_secs(), help = "Seconds to wait between attempts")]
    pub retry_delay: u64,
}

/// Command to process `render`. Fetches the insights for a range, waits for the server to
/// finish aggregating them and writes the heatmap.
pub async fn process_render_command(
    RenderCommand {
        source,
        out,
        strategy,
        max_tries,
        retry_delay,
    }: RenderCommand,
    clock: impl Clock,
) -> Result<()> {
    let config = source.fetch_config()?;
    let range = source.range(clock.time());
    let out = out.unwrap_or_else(|| default_out_path(&range));

    let fetcher = Fetcher::new(
        HttpInsightsSource::new(config)?,
        RetryPolicy {
            max_tries,
            delay: Duration::from_secs(retry_delay),
        },
        Box::new(clock),
    );
    let data = fetcher.fetch(&range).await?.into_data(&range)?;

    render_insights(&data, &range, strategy, &out).await?;
    println!("Generated: {}", out.display());
    Ok(())
}

pub fn default_out_path(range: &str) -> PathBuf {
    PathBuf::from(format!("assets/waka-heatmap-{range}.svg"))
}

/// Everything after the fetch: parse, level, lay out and write.
pub async fn render_insights(
    data: &InsightsData,
    range: &str,
    strategy: LevelStrategy,
    out: &Path,
) -> Result<()> {
    let series = parse_days(data);
    info!(
        "Received {} day entries, parsed {} dates, {} with activity",
        data.days.len(),
        series.len(),
        series.nonzero_count()
    );
    if series.is_empty() {
        bail!(
            "No day data found in insights response for range '{range}'. Check the API key scope \
             (read_summaries) and endpoint access"
        );
    }

    let (start, end) = resolve_window(range, data, &series)?;
    let grid = CalendarGrid::new(start, end)?;
    info!(
        "Rendering {start} to {end} over {} weeks",
        grid.week_count()
    );

    let leveler = Leveler::from_series(strategy, &series);
    let heatmap = Heatmap::build(
        &series,
        &grid,
        &leveler,
        format!("WakaTime {range} - Time Spent Heatmap"),
        format!("Daily totals from WakaTime insights/days, {start} to {end}, {strategy} scale"),
    );
    write_heatmap(&heatmap, out).await
}

/// Picks the rendered window: a whole calendar year for `YYYY` ranges, otherwise the bounds
/// reported by the server, otherwise the bounds of the data itself.
pub fn resolve_window(
    range: &str,
    data: &InsightsData,
    series: &ActivitySeries,
) -> Result<(NaiveDate, NaiveDate)> {
    if let Some(year) = parse_year(range) {
        if let (Some(start), Some(end)) = (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year, 12, 31),
        ) {
            return Ok((start, end));
        }
    }

    let reported = (
        data.start.as_deref().and_then(parse_day),
        data.end.as_deref().and_then(parse_day),
    );
    if let (Some(start), Some(end)) = reported {
        return Ok((start, end));
    }
    if reported.0.is_some() || reported.1.is_some() {
        warn!("Response bounds are incomplete, falling back to the data range");
    }

    match (series.first_date(), series.last_date()) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => bail!("Can't determine the date window of range '{range}'"),
    }
}

fn parse_year(range: &str) -> Option<i32> {
    if range.len() == 4 && range.bytes().all(|b| b.is_ascii_digit()) {
        range.parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;
    use tempfile::tempdir;

    use crate::{
        insights::{entities::InsightsData, parser::parse_days},
        level::LevelStrategy,
        utils::logging::TEST_LOGGING,
    };

    use super::{default_out_path, render_insights, resolve_window};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn data(days: serde_json::Value) -> InsightsData {
        InsightsData {
            days: serde_json::from_value(days).unwrap(),
            ..Default::default()
        }
    }

    #[test]
    fn year_ranges_cover_the_calendar_year() {
        let data = data(json!([{"date": "2024-03-01", "total": 1}]));
        let series = parse_days(&data);
        assert_eq!(
            resolve_window("2024", &data, &series).unwrap(),
            (day(2024, 1, 1), day(2024, 12, 31))
        );
    }

    #[test]
    fn named_ranges_use_reported_bounds() {
        let mut data = data(json!([{"date": "2024-03-01", "total": 1}]));
        data.start = Some("2023-10-19T00:00:00Z".into());
        data.end = Some("2024-10-18T23:59:59Z".into());
        let series = parse_days(&data);
        assert_eq!(
            resolve_window("last_year", &data, &series).unwrap(),
            (day(2023, 10, 19), day(2024, 10, 18))
        );
    }

    #[test]
    fn falls_back_to_series_bounds() {
        let data = data(json!([
            {"date": "2024-03-05", "total": 1},
            {"date": "2024-02-01", "total": 1},
        ]));
        let series = parse_days(&data);
        assert_eq!(
            resolve_window("last_6_months", &data, &series).unwrap(),
            (day(2024, 2, 1), day(2024, 3, 5))
        );
        assert!(resolve_window("all_time", &InsightsData::default(), &parse_days(&InsightsData::default())).is_err());
    }

    #[test]
    fn out_path_names_the_range() {
        assert_eq!(
            default_out_path("2024").to_str(),
            Some("assets/waka-heatmap-2024.svg")
        );
    }

    #[tokio::test]
    async fn renders_end_to_end() -> anyhow::Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let out = dir.path().join("out/heatmap.svg");
        let mut data = data(json!([
            {"date": "2024-06-01", "total": 7200},
            {"date": "2024-06-02", "total": 0},
            {"total": 100},
        ]));
        data.start = Some("2024-06-01".into());
        data.end = Some("2024-06-02".into());

        render_insights(&data, "last_7_days", LevelStrategy::Quantile, &out).await?;

        let svg = std::fs::read_to_string(&out)?;
        assert_eq!(svg.matches("data-level=").count(), 2);
        assert!(svg.contains(r#"data-date="2024-06-01" data-level="1""#));
        assert!(svg.contains(r#"data-date="2024-06-02" data-level="0""#));
        assert!(svg.contains("WakaTime last_7_days - Time Spent Heatmap"));
        Ok(())
    }

    #[tokio::test]
    async fn empty_response_produces_no_image() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("heatmap.svg");

        let error = render_insights(&InsightsData::default(), "2024", LevelStrategy::Log, &out)
            .await
            .unwrap_err();

        assert!(error.to_string().contains("'2024'"));
        assert!(!out.exists());
    }
}
