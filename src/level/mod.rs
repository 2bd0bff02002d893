//! Maps raw seconds per day onto the five intensity levels of the heatmap.

pub mod quantile;

use std::fmt::Display;

use clap::ValueEnum;
use quantile::IntensityThresholds;

use crate::insights::parser::ActivitySeries;

/// Ordinal bucket of a day, 0 (no activity) to 4 (most active).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(u8);

impl Level {
    pub const ZERO: Level = Level(0);
    pub const MAX: Level = Level(4);
    pub const COUNT: usize = 5;

    /// Values above [Level::MAX] are clamped.
    pub fn new(value: u8) -> Self {
        Level(value.min(Self::MAX.0))
    }

    pub fn all() -> impl Iterator<Item = Level> {
        (0..Self::COUNT as u8).map(Level)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum LevelStrategy {
    /// Fixed logarithmic scale relative to the busiest day
    #[default]
    Log,
    /// Quartiles of the non-zero days
    Quantile,
}

impl Display for LevelStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelStrategy::Log => write!(f, "log"),
            LevelStrategy::Quantile => write!(f, "quantile"),
        }
    }
}

/// Computed once from the whole series, then used for every cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Leveler {
    Log { max_seconds: f64 },
    Quantile(IntensityThresholds),
}

/// Stays below 4 so the busiest day lands on level 4 and not 5.
const LOG_SPREAD: f64 = 3.999;

impl Leveler {
    pub fn from_series(strategy: LevelStrategy, series: &ActivitySeries) -> Self {
        match strategy {
            LevelStrategy::Log => Leveler::Log {
                max_seconds: series.values().fold(0., f64::max),
            },
            LevelStrategy::Quantile => {
                Leveler::Quantile(IntensityThresholds::from_values(series.values()))
            }
        }
    }

    pub fn level(&self, seconds: f64) -> Level {
        match self {
            Leveler::Log { max_seconds } => log_level(seconds, *max_seconds),
            Leveler::Quantile(thresholds) => thresholds.level(seconds),
        }
    }
}

/// Log scaling compresses heavy tailed activity so a few very long days don't push everything
/// else into level 1.
fn log_level(seconds: f64, max_seconds: f64) -> Level {
    if seconds <= 0. || max_seconds <= 0. || seconds.is_nan() {
        return Level::ZERO;
    }
    let x = seconds.ln_1p() / max_seconds.ln_1p();
    let bucket = (LOG_SPREAD * x).floor().clamp(0., 3.);
    Level::new(1 + bucket as u8)
}
