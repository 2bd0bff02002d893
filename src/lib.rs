//! Fetches daily coding activity from the WakaTime insights API and renders it as a
//! GitHub-style calendar heatmap.
//!
//! The pipeline is strictly sequential: [insights] fetches and parses the per-day totals,
//! [level] buckets them into intensity levels and [render] lays out and writes the SVG.
//!

pub mod cli;
pub mod insights;
pub mod level;
pub mod render;
pub mod utils;
