//! Lays out an [ActivitySeries](crate::insights::parser::ActivitySeries) as a calendar heatmap
//! and writes it as a standalone SVG document.

pub mod grid;
pub mod svg;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::utils::dir::create_parent_dirs;

use svg::Heatmap;

/// Writes the whole document at once, creating parent directories as needed.
pub async fn write_heatmap(heatmap: &Heatmap, path: &Path) -> Result<()> {
    create_parent_dirs(path)
        .with_context(|| format!("Failed to create parent directories of {path:?}"))?;
    let document = heatmap.to_string();
    debug!("Writing {} bytes to {path:?}", document.len());
    tokio::fs::write(path, document)
        .await
        .with_context(|| format!("Failed to write heatmap to {path:?}"))?;
    info!("Wrote {} cells to {path:?}", heatmap.cells.len());
    Ok(())
}
