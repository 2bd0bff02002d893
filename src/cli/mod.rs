pub mod debug;
pub mod render;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Result};
use chrono::{DateTime, Datelike, Utc};
use clap::{Parser, Subcommand};
use reqwest::Url;
use debug::{process_debug_command, DebugCommand};
use render::{process_render_command, RenderCommand};
use tracing::level_filters::LevelFilter;

use crate::{
    insights::client::{FetchConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT},
    utils::{clock::DefaultClock, logging::enable_logging},
};

#[derive(Parser, Debug)]
#[command(name = "waka-heatmap", version, long_about = None)]
#[command(about = "Renders WakaTime daily activity as a calendar heatmap", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, global = true, help = "Enable trace logging")]
    log: bool,
    #[arg(long = "log-filter", global = true, help = "Log level, overrides RUST_LOG")]
    log_filter: Option<LevelFilter>,
    #[arg(
        long = "log-dir",
        global = true,
        help = "Additionally write logs into daily rotated files in this directory"
    )]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Fetch daily insights and render them into an SVG heatmap")]
    Render {
        #[command(flatten)]
        command: RenderCommand,
    },
    #[command(about = "Make a single request and print the raw shape of the day entries")]
    Debug {
        #[command(flatten)]
        command: DebugCommand,
    },
}

/// Where and how to reach the insights resource. Shared by every subcommand.
#[derive(Debug, Clone, clap::Args)]
pub struct SourceArgs {
    #[arg(long, env = "WAKATIME_API_KEY", hide_env_values = true, help = "WakaTime API key")]
    api_key: String,
    #[arg(
        long,
        env = "RANGE",
        help = "Insights range, either a year like 2024 or a named range like last_year. Defaults to the current year"
    )]
    range: Option<String>,
    #[arg(
        long = "base-url",
        env = "WAKATIME_BASE_URL",
        default_value = DEFAULT_BASE_URL,
        help = "Scheme and host of the API, optionally with a path prefix"
    )]
    base_url: Url,
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs(), help = "Timeout of a single request in seconds")]
    timeout: u64,
}

impl SourceArgs {
    pub fn fetch_config(&self) -> Result<FetchConfig> {
        let api_key = self.api_key.trim();
        if api_key.is_empty() {
            bail!("WAKATIME_API_KEY is empty");
        }
        Ok(FetchConfig {
            api_key: api_key.to_string(),
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout),
        })
    }

    pub fn range(&self, now: DateTime<Utc>) -> String {
        match self.range.as_deref().map(str::trim) {
            Some(range) if !range.is_empty() => range.to_string(),
            _ => now.year().to_string(),
        }
    }
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        args.log_filter
    };
    enable_logging(args.log_dir.as_deref(), logging_level)?;

    match args.commands {
        Commands::Render { command } => process_render_command(command, DefaultClock).await,
        Commands::Debug { command } => process_debug_command(command, DefaultClock).await,
    }
}
