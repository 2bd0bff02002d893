use std::{path::Path, sync::LazyLock};

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};

pub const LOG_PREFIX: &str = "waka-heatmap";

/// Daily rolling file writer inside `log_dir`, or a sink when no directory was given.
pub fn file_writer(log_dir: Option<&Path>) -> Result<BoxMakeWriter> {
    let Some(dir) = log_dir else {
        return Ok(BoxMakeWriter::new(std::io::sink));
    };

    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(5)
        .filename_prefix(LOG_PREFIX)
        .build(dir)?;
    Ok(BoxMakeWriter::new(appender))
}

/// Progress is always written to stdout. When `log_dir` is given the same events are also
/// appended to a daily rolling file there.
pub fn enable_logging(log_dir: Option<&Path>, log_level: Option<LevelFilter>) -> Result<()> {
    let files = file_writer(log_dir)?;

    let level = log_level
        .map(|v| v.to_string())
        .unwrap_or_else(|| std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()));

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(format!(
            "{}={level}",
            env!("CARGO_PKG_NAME").replace("-", "_"),
        )))
        .with_target(false)
        .with_writer(std::io::stdout.and(files))
        .compact()
        .init();
    Ok(())
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .pretty()
        .init()
});
