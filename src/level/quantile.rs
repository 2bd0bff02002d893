use super::Level;

/// Cut points between levels 1..4, taken from the quartiles of the non-zero days.
/// Always `q25 <= q50 <= q75`. Without any non-zero day all of them are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IntensityThresholds {
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
}

impl IntensityThresholds {
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let mut positive = values
            .into_iter()
            .filter(|v| *v > 0.)
            .collect::<Vec<_>>();
        positive.sort_by(f64::total_cmp);

        Self {
            q25: percentile(&positive, 0.25),
            q50: percentile(&positive, 0.50),
            q75: percentile(&positive, 0.75),
        }
    }

    pub fn level(&self, seconds: f64) -> Level {
        if seconds <= 0. || seconds.is_nan() || self.q75 <= 0. {
            Level::ZERO
        } else if seconds <= self.q25 {
            Level::new(1)
        } else if seconds <= self.q50 {
            Level::new(2)
        } else if seconds <= self.q75 {
            Level::new(3)
        } else {
            Level::MAX
        }
    }
}

/// Linear interpolation between the closest order statistics of an already sorted slice.
/// `p` is clamped to [0, 1]. An empty slice yields zero.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    let Some(last) = sorted.len().checked_sub(1) else {
        return 0.;
    };
    let position = p.clamp(0., 1.) * last as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let weight = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

#[cfg(test)]
mod tests {
    use super::{percentile, IntensityThresholds};
    use crate::level::Level;

    #[test]
    fn percentile_of_single_value() {
        for p in [0., 0.1, 0.25, 0.5, 0.99, 1.] {
            assert_eq!(percentile(&[10.], p), 10.);
        }
    }

    #[test]
    fn percentile_interpolates() {
        assert_eq!(percentile(&[10., 20., 30.], 0.5), 20.);
        assert_eq!(percentile(&[10., 20., 30.], 0.25), 15.);
        assert_eq!(percentile(&[10., 20., 30., 40.], 0.5), 25.);
        assert_eq!(percentile(&[10., 20., 30.], 1.), 30.);
        assert_eq!(percentile(&[], 0.5), 0.);
    }

    #[test]
    fn thresholds_ignore_zero_days() {
        let thresholds = IntensityThresholds::from_values([0., 40., 0., 10., 30., 20., 50.]);
        assert_eq!(
            thresholds,
            IntensityThresholds {
                q25: 20.,
                q50: 30.,
                q75: 40.,
            }
        );
        assert!(thresholds.q25 <= thresholds.q50 && thresholds.q50 <= thresholds.q75);
    }

    #[test]
    fn levels_follow_quartiles() {
        let thresholds = IntensityThresholds::from_values([10., 20., 30., 40., 50.]);
        assert_eq!(thresholds.level(0.), Level::ZERO);
        assert_eq!(thresholds.level(5.), Level::new(1));
        assert_eq!(thresholds.level(20.), Level::new(1));
        assert_eq!(thresholds.level(25.), Level::new(2));
        assert_eq!(thresholds.level(40.), Level::new(3));
        assert_eq!(thresholds.level(41.), Level::MAX);
    }

    #[test]
    fn single_value_series() {
        let thresholds = IntensityThresholds::from_values([3600.]);
        assert_eq!(thresholds.level(3600.), Level::new(1));
        assert_eq!(thresholds.level(7200.), Level::MAX);
    }

    #[test]
    fn degenerate_thresholds_are_zero() {
        let thresholds = IntensityThresholds::from_values([0., 0.]);
        assert_eq!(thresholds, IntensityThresholds::default());
        assert_eq!(thresholds.level(100.), Level::ZERO);
    }
}
